use serde::{Deserialize, Serialize};
use tracing::trace;

/// Why a redraw was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedrawReason {
    Data,
    Visibility,
    Range,
    Cursor,
    Animation,
    Layout,
    Style,
}

impl RedrawReason {
    const fn bit(self) -> u8 {
        match self {
            Self::Data => 1 << 0,
            Self::Visibility => 1 << 1,
            Self::Range => 1 << 2,
            Self::Cursor => 1 << 3,
            Self::Animation => 1 << 4,
            Self::Layout => 1 << 5,
            Self::Style => 1 << 6,
        }
    }
}

/// Coalesced set of pending redraw reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RedrawReasons {
    bits: u8,
}

impl RedrawReasons {
    #[must_use]
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    #[must_use]
    pub const fn with(self, reason: RedrawReason) -> Self {
        Self {
            bits: self.bits | reason.bit(),
        }
    }

    #[must_use]
    pub const fn contains(self, reason: RedrawReason) -> bool {
        self.bits & reason.bit() != 0
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.bits == 0
    }
}

/// At-most-one-frame-per-tick redraw gate.
///
/// Requests between two frames coalesce into one. A frame that reports a
/// running animation re-arms the gate for the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameScheduler {
    pending: RedrawReasons,
    in_frame: bool,
    rendered_frames: u64,
    skipped_frames: u64,
}

impl FrameScheduler {
    pub fn request_redraw(&mut self, reason: RedrawReason) {
        self.pending = self.pending.with(reason);
    }

    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        !self.pending.is_none()
    }

    #[must_use]
    pub fn pending(&self) -> RedrawReasons {
        self.pending
    }

    /// Consumes pending requests; `false` means nothing to draw this tick.
    pub fn begin_frame(&mut self) -> bool {
        if self.pending.is_none() {
            self.skipped_frames += 1;
            trace!(skipped = self.skipped_frames, "frame skipped");
            return false;
        }
        self.pending = RedrawReasons::none();
        self.in_frame = true;
        true
    }

    pub fn end_frame(&mut self, still_animating: bool) {
        if !self.in_frame {
            return;
        }
        self.in_frame = false;
        self.rendered_frames += 1;
        if still_animating {
            self.request_redraw(RedrawReason::Animation);
        }
    }

    #[must_use]
    pub fn rendered_frames(&self) -> u64 {
        self.rendered_frames
    }

    #[must_use]
    pub fn skipped_frames(&self) -> u64 {
        self.skipped_frames
    }
}
