use serde::{Deserialize, Serialize};

/// Pointer cursor requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    /// Over a range-selector gripper.
    EwResize,
    /// Over the range-selector body.
    Move,
}

/// Which part of the range selector a drag moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeDragMode {
    /// Left edge only.
    From,
    /// Right edge only.
    To,
    /// Whole selection, preserving its span.
    All,
}

impl RangeDragMode {
    #[must_use]
    pub fn cursor(self) -> CursorStyle {
        match self {
            Self::From | Self::To => CursorStyle::EwResize,
            Self::All => CursorStyle::Move,
        }
    }
}

/// Pointer position in surface-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// In-progress range-selector drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeDrag {
    pub mode: RangeDragMode,
    pub start: PointerPosition,
    pub start_from: f64,
    pub start_to: f64,
}

/// Pointer state machine for the range selector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionState {
    hover: Option<RangeDragMode>,
    drag: Option<RangeDrag>,
    last_position: Option<PointerPosition>,
}

impl InteractionState {
    #[must_use]
    pub fn drag(self) -> Option<RangeDrag> {
        self.drag
    }

    #[must_use]
    pub fn is_dragging(self) -> bool {
        self.drag.is_some()
    }

    #[must_use]
    pub fn cursor(self) -> CursorStyle {
        self.drag
            .map(|drag| drag.mode)
            .or(self.hover)
            .map_or(CursorStyle::Default, RangeDragMode::cursor)
    }

    pub fn on_pointer_move(&mut self, position: PointerPosition, hover: Option<RangeDragMode>) {
        self.last_position = Some(position);
        if self.drag.is_none() {
            self.hover = hover;
        }
    }

    /// Starts a drag when the pointer is over the selector.
    pub fn on_pointer_down(&mut self, from: f64, to: f64) -> bool {
        match (self.hover, self.last_position) {
            (Some(mode), Some(start)) => {
                self.drag = Some(RangeDrag {
                    mode,
                    start,
                    start_from: from,
                    start_to: to,
                });
                true
            }
            _ => false,
        }
    }

    pub fn on_pointer_up(&mut self) {
        self.drag = None;
    }
}
