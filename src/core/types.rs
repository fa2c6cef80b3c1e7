use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Canvas size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn validate(self) -> ChartResult<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(ChartError::InvalidViewport {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// One sample of a series: `x` is a unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

impl DataPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Inclusive time window `[from, to]` in value-space units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: f64,
    pub to: f64,
}

impl TimeWindow {
    /// Builds a window, swapping reversed bounds.
    #[must_use]
    pub fn new(from: f64, to: f64) -> Self {
        if from <= to {
            Self { from, to }
        } else {
            Self { from: to, to: from }
        }
    }
}

/// Fractional selection `[from, to]` within `[0, 1]` of the minimap extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeFraction {
    pub from: f64,
    pub to: f64,
}

impl RangeFraction {
    #[must_use]
    pub const fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.from.is_finite()
            || !self.to.is_finite()
            || self.from < 0.0
            || self.to > 1.0
            || self.from >= self.to
        {
            return Err(ChartError::InvalidData(
                "range must satisfy 0 <= from < to <= 1".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Projects the fraction onto an absolute `[min, max]` extent.
    #[must_use]
    pub fn project(self, min: f64, max: f64) -> TimeWindow {
        let span = max - min;
        TimeWindow::new(min + span * self.from, min + span * self.to)
    }
}

impl Default for RangeFraction {
    fn default() -> Self {
        Self::new(0.8, 1.0)
    }
}
