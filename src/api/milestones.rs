use chrono::Datelike;
use tracing::{debug, warn};

use crate::api::label_format::LabelFormatter;
use crate::core::primitives::{DAY_MILLIS, unix_millis_to_datetime};
use crate::core::CoordinateMapper;
use crate::render::{Color, DrawingSurface, Point, TextHAlign};

/// Nominal width of one date label.
pub const DATE_LABEL_WIDTH_PX: f64 = 75.0;
/// Milestones this far outside the canvas still count as visible.
pub const MILESTONE_MARGIN_PX: f64 = 50.0;
/// Half-stride labels fainter than this are not drawn.
pub const LABEL_OPACITY_CUTOFF: f64 = 0.15;
pub const MILESTONE_FONT_SIZE_PX: f64 = 11.0;
const MAX_MILESTONES: usize = 20_000;

/// Short month names, formatted once per month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthLabelCache {
    months: [Option<String>; 12],
}

impl MonthLabelCache {
    /// Month label for `month0` (0 = January), formatting `timestamp_ms` on
    /// the first request.
    pub fn get(&mut self, month0: usize, timestamp_ms: f64, formatter: &dyn LabelFormatter) -> &str {
        let slot = &mut self.months[month0 % 12];
        slot.get_or_insert_with(|| formatter.format_date(timestamp_ms, "M"))
    }
}

/// One date label candidate at a day boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Milestone {
    pub x: f64,
    label: Option<String>,
}

impl Milestone {
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// Day-spaced X-axis date labels with density-based thinning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Milestones {
    items: Vec<Milestone>,
    extent: Option<(f64, f64)>,
    months: MonthLabelCache,
}

impl Milestones {
    #[must_use]
    pub fn items(&self) -> &[Milestone] {
        &self.items
    }

    /// Rebuilds the candidates when the full data extent changed.
    ///
    /// Candidates start at `min_x` and repeat every day up to, but not
    /// including, `max_x`. Returns whether anything was rebuilt.
    pub fn regenerate(&mut self, min_x: f64, max_x: f64) -> bool {
        if self.extent == Some((min_x, max_x)) {
            return false;
        }
        self.extent = Some((min_x, max_x));
        self.items.clear();
        if !min_x.is_finite() || !max_x.is_finite() {
            return true;
        }

        let mut x = min_x;
        while x < max_x {
            if self.items.len() == MAX_MILESTONES {
                warn!(min_x, max_x, "milestone count capped");
                break;
            }
            self.items.push(Milestone { x, label: None });
            x += DAY_MILLIS;
        }
        debug!(count = self.items.len(), "milestones regenerated");
        true
    }

    /// Draws the labels that are on screen and dense enough to show.
    ///
    /// `top` is the label baseline in canvas pixels.
    pub fn draw(
        &mut self,
        surface: &mut dyn DrawingSurface,
        mapper: CoordinateMapper,
        top: f64,
        color: Color,
        formatter: &dyn LabelFormatter,
    ) {
        let width = mapper.area().width;
        let visible: Vec<(usize, f64)> = self
            .items
            .iter()
            .enumerate()
            .map(|(index, milestone)| (index, mapper.to_canvas_x(milestone.x)))
            .filter(|&(_, x)| x > -MILESTONE_MARGIN_PX && x < width + MILESTONE_MARGIN_PX)
            .collect();
        let count = visible.len();

        for (index, x) in visible {
            let opacity = milestone_opacity(index, count, width);
            if opacity < LABEL_OPACITY_CUTOFF {
                continue;
            }
            let Some(label) = self.label_for(index, formatter) else {
                continue;
            };
            surface.text(
                &label,
                Point::new(x, top),
                color.with_opacity(opacity),
                MILESTONE_FONT_SIZE_PX,
                TextHAlign::Center,
            );
        }
    }

    fn label_for(&mut self, index: usize, formatter: &dyn LabelFormatter) -> Option<String> {
        let milestone = self.items.get(index)?;
        if let Some(label) = &milestone.label {
            return Some(label.clone());
        }
        let x = milestone.x;
        let time = unix_millis_to_datetime(x).ok()?;
        let month = self.months.get(time.month0() as usize, x, formatter);
        let label = format!("{month} {}", time.day());
        self.items[index].label = Some(label.clone());
        Some(label)
    }
}

/// Power-of-two label stride for `visible_count` milestones on a canvas
/// `canvas_width` pixels wide.
#[must_use]
pub fn milestone_stride(visible_count: usize, canvas_width: f64) -> usize {
    let slots = canvas_width / DATE_LABEL_WIDTH_PX;
    if visible_count == 0 || slots <= 0.0 {
        return 1;
    }
    let ratio = visible_count as f64 / slots;
    let exponent = ratio.log2().round();
    if !exponent.is_finite() || exponent <= 0.0 {
        return 1;
    }
    1usize << (exponent as u32).min(usize::BITS - 1)
}

/// Opacity of the label at global milestone `index`.
///
/// Labels on the stride are opaque. Labels on the half stride fade in as
/// the visible density approaches one stride step; everything else is
/// hidden.
#[must_use]
pub fn milestone_opacity(index: usize, visible_count: usize, canvas_width: f64) -> f64 {
    let odd = milestone_stride(visible_count, canvas_width);
    if index % odd == 0 {
        return 1.0;
    }
    let half = odd / 2;
    if half == 0 || index % half != 0 {
        return 0.0;
    }
    let per_stride = visible_count as f64 / odd as f64;
    let density = canvas_width / (per_stride + per_stride / 2.0) / DATE_LABEL_WIDTH_PX;
    density.min(1.0).powi(4)
}
