use serde::{Deserialize, Serialize};

use crate::core::{Millis, PlotArea, RangeFraction, Viewport, YFloor};
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Chart variant, selected once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    Line,
    /// Stacked areas; `bars` switches to flat-topped columns.
    Stacked { bars: bool },
    StackedPercent,
    /// Two series, each on its own Y axis, sharing X.
    DualAxis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Resolved colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub axis_line: Color,
    pub axis_text: Color,
    pub cursor_line: Color,
    pub dual_axis_line: Color,
    pub range_background: Color,
    pub range_fill: Color,
    pub shadow: Color,
}

const fn hex(red: u8, green: u8, blue: u8, alpha: u8) -> Color {
    Color::rgba(
        red as f64 / 255.0,
        green as f64 / 255.0,
        blue as f64 / 255.0,
        alpha as f64 / 255.0,
    )
}

const LIGHT: Palette = Palette {
    background: hex(0xff, 0xff, 0xff, 0xff),
    axis_line: hex(0xec, 0xf0, 0xf3, 0xff),
    axis_text: hex(0x96, 0xa2, 0xaa, 0xff),
    cursor_line: hex(0xdf, 0xe6, 0xeb, 0xff),
    dual_axis_line: hex(0xea, 0xeb, 0xed, 0xff),
    range_background: hex(0xc0, 0xd1, 0xe1, 0xff),
    range_fill: hex(0xff, 0xff, 0xff, 0xff),
    shadow: hex(0xe7, 0xf3, 0xfb, 0x99),
};

const DARK: Palette = Palette {
    background: hex(0x24, 0x2f, 0x3e, 0xff),
    axis_line: hex(0x29, 0x35, 0x44, 0xff),
    axis_text: hex(0x54, 0x67, 0x78, 0xff),
    cursor_line: hex(0x3b, 0x4a, 0x5a, 0xff),
    dual_axis_line: hex(0x3b, 0x44, 0x53, 0xff),
    range_background: hex(0x40, 0x56, 0x6b, 0xff),
    range_fill: hex(0x24, 0x2f, 0x3e, 0xff),
    shadow: hex(0x1f, 0x2a, 0x38, 0xcc),
};

impl Theme {
    #[must_use]
    pub const fn palette(self) -> Palette {
        match self {
            Self::Light => LIGHT,
            Self::Dark => DARK,
        }
    }
}

/// Public engine bootstrap configuration.
///
/// Serializable so hosts can persist chart setup; every field falls back
/// to its default when omitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub viewport: Viewport,
    pub theme: Theme,
    /// Pixels reserved above the display plot.
    pub top_padding: f64,
    /// Pixels reserved under the display plot for date labels.
    pub axis_bottom_padding: f64,
    pub minimap_height: f64,
    pub x_border_duration_ms: Millis,
    /// Y rescale duration after range or visibility changes.
    pub range_border_duration_ms: Millis,
    pub fade_duration_ms: Millis,
    pub selector_duration_ms: Millis,
    pub min_range_span: f64,
    pub initial_range: RangeFraction,
    pub display_line_width: f64,
    pub minimap_line_width: f64,
    pub y_floor: YFloor,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(480, 360),
            theme: Theme::Light,
            top_padding: 30.0,
            axis_bottom_padding: 40.0,
            minimap_height: 38.0,
            x_border_duration_ms: 100.0,
            range_border_duration_ms: 200.0,
            fade_duration_ms: 200.0,
            selector_duration_ms: 50.0,
            min_range_span: 0.05,
            initial_range: RangeFraction::default(),
            display_line_width: 2.0,
            minimap_line_width: 1.0,
            y_floor: YFloor::Zero,
        }
    }
}

impl ChartConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        self.viewport.validate()?;
        for (name, value) in [
            ("top_padding", self.top_padding),
            ("axis_bottom_padding", self.axis_bottom_padding),
            ("minimap_height", self.minimap_height),
            ("x_border_duration_ms", self.x_border_duration_ms),
            ("range_border_duration_ms", self.range_border_duration_ms),
            ("fade_duration_ms", self.fade_duration_ms),
            ("selector_duration_ms", self.selector_duration_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "`{name}` must be finite and >= 0"
                )));
            }
        }
        if !(self.min_range_span > 0.0 && self.min_range_span <= 1.0) {
            return Err(ChartError::InvalidData(
                "`min_range_span` must be in (0, 1]".to_owned(),
            ));
        }
        for (name, value) in [
            ("display_line_width", self.display_line_width),
            ("minimap_line_width", self.minimap_line_width),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "`{name}` must be finite and > 0"
                )));
            }
        }
        let display = self.display_area();
        if display.plot_height() <= 0.0 {
            return Err(ChartError::InvalidData(
                "viewport is too short for the paddings and minimap".to_owned(),
            ));
        }
        let initial = self.initial_range.validate()?;
        if initial.to - initial.from < self.min_range_span {
            return Err(ChartError::InvalidData(
                "`initial_range` is narrower than `min_range_span`".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Plot box of the primary display.
    #[must_use]
    pub fn display_area(&self) -> PlotArea {
        PlotArea::new(
            self.viewport,
            self.top_padding,
            self.axis_bottom_padding + self.minimap_height,
        )
    }

    /// Plot box of the minimap's off-screen buffer.
    #[must_use]
    pub fn minimap_area(&self) -> PlotArea {
        PlotArea {
            width: f64::from(self.viewport.width),
            height: self.minimap_height,
            top_padding: 0.0,
            bottom_padding: 0.0,
        }
    }

    /// Canvas y where the minimap starts.
    #[must_use]
    pub fn minimap_top(&self) -> f64 {
        f64::from(self.viewport.height) - self.minimap_height
    }
}
