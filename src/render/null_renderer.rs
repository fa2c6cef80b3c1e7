use crate::error::ChartResult;
use crate::interaction::CursorStyle;
use crate::render::{DrawCommand, RenderFrame, Renderer};

/// No-op renderer used by tests and headless engine usage.
///
/// It still validates frame content so tests can catch invalid geometry
/// without a real backend.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_rendered: u64,
    pub last_command_count: usize,
    pub last_text_count: usize,
    pub last_shape_count: usize,
    pub last_frame: Option<RenderFrame>,
    pub cursor: CursorStyle,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.frames_rendered += 1;
        self.last_command_count = frame.commands.len();
        self.last_text_count = frame
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text(_)))
            .count();
        self.last_shape_count = frame
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Shape(_)))
            .count();
        self.last_frame = Some(frame.clone());
        Ok(())
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        self.cursor = cursor;
    }
}
