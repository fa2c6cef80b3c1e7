use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{
    CirclePrimitive, ClipRect, Color, DrawingSurface, LinePrimitive, PathPrimitive, Point,
    RectPrimitive, ShapePrimitive, TextHAlign, TextPrimitive,
};

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line(LinePrimitive),
    Path(PathPrimitive),
    Shape(ShapePrimitive),
    Circle(CirclePrimitive),
    Text(TextPrimitive),
    Rect(RectPrimitive),
    PushClip(ClipRect),
    PopClip,
}

impl DrawCommand {
    fn translated(&self, dx: f64, dy: f64) -> Self {
        let shift = |points: &[Point]| -> Vec<Point> {
            points.iter().map(|p| p.translated(dx, dy)).collect()
        };
        match self {
            Self::Line(line) => Self::Line(LinePrimitive {
                from: line.from.translated(dx, dy),
                to: line.to.translated(dx, dy),
                ..*line
            }),
            Self::Path(path) => Self::Path(PathPrimitive {
                points: shift(&path.points),
                ..path.clone()
            }),
            Self::Shape(shape) => Self::Shape(ShapePrimitive {
                points: shift(&shape.points),
                color: shape.color,
            }),
            Self::Circle(circle) => Self::Circle(CirclePrimitive {
                center: circle.center.translated(dx, dy),
                ..*circle
            }),
            Self::Text(text) => Self::Text(TextPrimitive {
                at: text.at.translated(dx, dy),
                ..text.clone()
            }),
            Self::Rect(rect) => Self::Rect(RectPrimitive {
                x: rect.x + dx,
                y: rect.y + dy,
                ..*rect
            }),
            Self::PushClip(clip) => Self::PushClip(ClipRect {
                x: clip.x + dx,
                y: clip.y + dy,
                ..*clip
            }),
            Self::PopClip => Self::PopClip,
        }
    }

    fn validate(&self) -> ChartResult<()> {
        match self {
            Self::Line(line) => line.validate(),
            Self::Path(path) => path.validate(),
            Self::Shape(shape) => shape.validate(),
            Self::Circle(circle) => circle.validate(),
            Self::Text(text) => text.validate(),
            Self::Rect(rect) => rect.validate(),
            Self::PushClip(_) | Self::PopClip => Ok(()),
        }
    }
}

/// Backend-agnostic recorded scene.
///
/// Used both as the per-frame scene handed to a [`crate::render::Renderer`]
/// and as the off-screen buffer the minimap blits every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub commands: Vec<DrawCommand>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.viewport.validate()?;

        let mut clip_depth = 0usize;
        for command in &self.commands {
            command.validate()?;
            match command {
                DrawCommand::PushClip(_) => clip_depth += 1,
                DrawCommand::PopClip => {
                    clip_depth = clip_depth.checked_sub(1).ok_or_else(|| {
                        ChartError::InvalidData("clip restored without save".to_owned())
                    })?;
                }
                _ => {}
            }
        }
        if clip_depth != 0 {
            return Err(ChartError::InvalidData(
                "unbalanced clip save/restore".to_owned(),
            ));
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    #[must_use]
    pub fn texts(&self) -> Vec<&TextPrimitive> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn shapes(&self) -> Vec<&ShapePrimitive> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Shape(shape) => Some(shape),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<&LinePrimitive> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn paths(&self) -> Vec<&PathPrimitive> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Path(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn circles(&self) -> Vec<&CirclePrimitive> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Circle(circle) => Some(circle),
                _ => None,
            })
            .collect()
    }
}

impl DrawingSurface for RenderFrame {
    fn width(&self) -> f64 {
        f64::from(self.viewport.width)
    }

    fn height(&self) -> f64 {
        f64::from(self.viewport.height)
    }

    fn line(&mut self, from: Point, to: Point, color: Color, width: f64) {
        self.commands.push(DrawCommand::Line(LinePrimitive {
            from,
            to,
            stroke_width: width,
            color,
        }));
    }

    fn path(&mut self, points: &[Point], color: Color, width: f64) {
        if points.len() < 2 {
            return;
        }
        self.commands.push(DrawCommand::Path(PathPrimitive {
            points: points.to_vec(),
            stroke_width: width,
            color,
        }));
    }

    fn filled_shape(&mut self, points: &[Point], color: Color) {
        if points.len() < 2 {
            return;
        }
        self.commands.push(DrawCommand::Shape(ShapePrimitive {
            points: points.to_vec(),
            color,
        }));
    }

    fn circle(
        &mut self,
        center: Point,
        radius: f64,
        stroke: Option<Color>,
        fill: Option<Color>,
        border_width: f64,
    ) {
        self.commands.push(DrawCommand::Circle(CirclePrimitive {
            center,
            radius,
            stroke,
            fill,
            border_width,
        }));
    }

    fn text(&mut self, text: &str, at: Point, color: Color, font_size_px: f64, align: TextHAlign) {
        if text.is_empty() {
            return;
        }
        self.commands.push(DrawCommand::Text(TextPrimitive {
            text: text.to_owned(),
            at,
            font_size_px,
            color,
            h_align: align,
        }));
    }

    fn rect(&mut self, rect: RectPrimitive) {
        self.commands.push(DrawCommand::Rect(rect));
    }

    fn save_clip(&mut self, clip: ClipRect) {
        self.commands.push(DrawCommand::PushClip(clip));
    }

    fn restore_clip(&mut self) {
        self.commands.push(DrawCommand::PopClip);
    }

    fn blit(&mut self, source: &RenderFrame, dx: f64, dy: f64) {
        self.commands.extend(
            source
                .commands
                .iter()
                .map(|command| command.translated(dx, dy)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{DrawCommand, RenderFrame};
    use crate::core::Viewport;
    use crate::render::{ClipRect, Color, DrawingSurface, Point};

    #[test]
    fn blit_translates_recorded_commands() {
        let mut buffer = RenderFrame::new(Viewport::new(100, 38));
        buffer.line(Point::new(0.0, 0.0), Point::new(10.0, 5.0), Color::rgb(0.0, 0.0, 0.0), 1.0);

        let mut frame = RenderFrame::new(Viewport::new(100, 400));
        frame.blit(&buffer, 0.0, 362.0);

        match &frame.commands[0] {
            DrawCommand::Line(line) => {
                assert_eq!(line.from, Point::new(0.0, 362.0));
                assert_eq!(line.to, Point::new(10.0, 367.0));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unbalanced_clip_fails_validation() {
        let mut frame = RenderFrame::new(Viewport::new(10, 10));
        frame.save_clip(ClipRect::new(0.0, 0.0, 10.0, 10.0));
        assert!(frame.validate().is_err());
        frame.restore_clip();
        assert!(frame.validate().is_ok());
        frame.restore_clip();
        assert!(frame.validate().is_err());
    }

    #[test]
    fn degenerate_paths_are_not_recorded() {
        let mut frame = RenderFrame::new(Viewport::new(10, 10));
        frame.path(&[Point::new(1.0, 1.0)], Color::rgb(0.0, 0.0, 0.0), 1.0);
        assert!(frame.is_empty());
    }
}
