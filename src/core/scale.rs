use serde::{Deserialize, Serialize};

use crate::core::borders::Extent;
use crate::core::types::Viewport;
use crate::error::{Axis, ChartError, ChartResult};

/// Pixel box the plot is drawn into: full width, height minus paddings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotArea {
    pub width: f64,
    pub height: f64,
    pub top_padding: f64,
    pub bottom_padding: f64,
}

impl PlotArea {
    #[must_use]
    pub fn new(viewport: Viewport, top_padding: f64, bottom_padding: f64) -> Self {
        Self {
            width: f64::from(viewport.width),
            height: f64::from(viewport.height),
            top_padding,
            bottom_padding,
        }
    }

    #[must_use]
    pub fn plot_height(self) -> f64 {
        self.height - self.top_padding - self.bottom_padding
    }

    /// Y of the plot's bottom edge in canvas pixels.
    #[must_use]
    pub fn plot_bottom(self) -> f64 {
        self.height - self.bottom_padding
    }
}

/// Value-space to canvas-space transform for one draw pass.
///
/// Construction rejects zero-width or zero-height extents so callers can
/// skip a frame instead of emitting NaN geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    extent: Extent,
    area: PlotArea,
}

impl CoordinateMapper {
    pub fn new(extent: Extent, area: PlotArea) -> ChartResult<Self> {
        validate_span(extent.min_x, extent.max_x, Axis::X)?;
        validate_span(extent.min_y, extent.max_y, Axis::Y)?;
        if !area.width.is_finite() || area.width <= 0.0 || area.plot_height() <= 0.0 {
            return Err(ChartError::InvalidData(
                "plot area must have a positive size".to_owned(),
            ));
        }
        Ok(Self { extent, area })
    }

    /// Same transform with an explicit `[min, max]` Y override.
    pub fn with_y_bounds(self, min_y: f64, max_y: f64) -> ChartResult<Self> {
        validate_span(min_y, max_y, Axis::Y)?;
        Ok(Self {
            extent: Extent {
                min_y,
                max_y,
                ..self.extent
            },
            area: self.area,
        })
    }

    #[must_use]
    pub fn extent(self) -> Extent {
        self.extent
    }

    #[must_use]
    pub fn area(self) -> PlotArea {
        self.area
    }

    #[must_use]
    pub fn to_canvas_x(self, value: f64) -> f64 {
        (value - self.extent.min_x) / self.extent.x_span() * self.area.width
    }

    #[must_use]
    pub fn to_canvas_y(self, value: f64) -> f64 {
        let plot_height = self.area.plot_height();
        plot_height - (value - self.extent.min_y) / self.extent.y_span() * plot_height
            + self.area.top_padding
    }

    #[must_use]
    pub fn from_canvas_x(self, pixel: f64) -> f64 {
        pixel / self.area.width * self.extent.x_span() + self.extent.min_x
    }

    #[must_use]
    pub fn from_canvas_y(self, pixel: f64) -> f64 {
        let plot_height = self.area.plot_height();
        (self.area.top_padding + plot_height - pixel) / plot_height * self.extent.y_span()
            + self.extent.min_y
    }
}

fn validate_span(min: f64, max: f64, axis: Axis) -> ChartResult<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(ChartError::InvalidData(format!(
            "{axis} extent must be finite"
        )));
    }
    if max <= min {
        return Err(ChartError::DegenerateExtent { axis });
    }
    Ok(())
}
