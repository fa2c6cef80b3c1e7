use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::api::engine_config::{ChartConfig, ChartKind};
use crate::api::label_format::LabelFormatter;
use crate::api::strategy::{DrawingStrategy, FrameContext, StrategyRole};
use crate::core::{Millis, SeriesSet};
use crate::interaction::PointerPosition;
use crate::render::DrawingSurface;

/// One line of the cursor tooltip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipRow {
    pub id: String,
    pub name: String,
    pub color_hex: String,
    pub value: f64,
    pub value_label: String,
    /// Share of the visible total, in percent mode only.
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipContent {
    pub title: String,
    pub timestamp: f64,
    /// Canvas x of the cursor line.
    pub x: f64,
    pub rows: Vec<TooltipRow>,
}

/// Host-side tooltip widget.
pub trait TooltipHost {
    fn show(&mut self, content: &TooltipContent);
    fn hide(&mut self);
}

/// Tooltip host that drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTooltip;

impl TooltipHost for NoTooltip {
    fn show(&mut self, _content: &TooltipContent) {}
    fn hide(&mut self) {}
}

/// Tooltip host that keeps the last content shown; handy for headless hosts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingTooltip {
    pub current: Option<TooltipContent>,
    pub shows: usize,
    pub hides: usize,
}

impl TooltipHost for RecordingTooltip {
    fn show(&mut self, content: &TooltipContent) {
        self.current = Some(content.clone());
        self.shows += 1;
    }

    fn hide(&mut self) {
        self.current = None;
        self.hides += 1;
    }
}

/// Primary chart surface: windowed series, guides, milestones, cursor.
#[derive(Debug, Clone)]
pub struct DisplaySurface {
    strategy: DrawingStrategy,
    /// Pointer events below this y belong to the minimap.
    hit_height: f64,
}

impl DisplaySurface {
    #[must_use]
    pub fn new(kind: ChartKind, config: &ChartConfig) -> Self {
        Self {
            strategy: DrawingStrategy::new(kind, StrategyRole::Display, config, config.display_area()),
            hit_height: config.minimap_top(),
        }
    }

    #[must_use]
    pub fn strategy(&self) -> &DrawingStrategy {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut DrawingStrategy {
        &mut self.strategy
    }

    pub fn resize(&mut self, config: &ChartConfig, now: Millis) {
        self.hit_height = config.minimap_top();
        self.strategy.set_area(config.display_area(), now);
    }

    /// Snaps every series' cursor to the sample under `position`.
    ///
    /// Ignored while the X borders animate and outside the plot. Returns
    /// whether any current point changed.
    pub fn pointer_move(&mut self, position: PointerPosition, set: &mut SeriesSet, now: Millis) -> bool {
        let primary = self.strategy.primary();
        if primary.is_x_animating(now) {
            trace!("pointer ignored while X borders animate");
            return false;
        }
        let width = primary.area().width;
        if position.x < 0.0 || position.x >= width || position.y < 0.0 || position.y >= self.hit_height {
            return false;
        }
        let Some(mapper) = primary.live_mapper(now) else {
            return false;
        };
        let value = mapper.from_canvas_x(position.x - self.strategy.hit_offset(set, mapper));
        set.values_mut()
            .fold(false, |changed, series| series.set_current_x(Some(value)) || changed)
    }

    /// Clears every series' cursor point.
    pub fn clear_cursor(&mut self, set: &mut SeriesSet) -> bool {
        set.values_mut()
            .fold(false, |changed, series| series.set_current_x(None) || changed)
    }

    pub fn draw(&mut self, surface: &mut dyn DrawingSurface, set: &SeriesSet, ctx: &FrameContext<'_>) -> bool {
        self.strategy.draw_all(surface, set, ctx)
    }

    /// Tooltip for the current cursor point, or `None` when there is none
    /// or it lies outside the canvas.
    #[must_use]
    pub fn tooltip(&self, set: &SeriesSet, ctx: &FrameContext<'_>) -> Option<TooltipContent> {
        let primary = self.strategy.primary();
        let mapper = primary.live_mapper(ctx.now)?;
        let timestamp = set
            .values()
            .filter(|series| series.is_visible())
            .find_map(|series| series.current_point())?
            .x;
        let x = mapper.to_canvas_x(timestamp);
        if !(0.0..=mapper.area().width).contains(&x) {
            return None;
        }

        let values: Vec<_> = set
            .values()
            .filter(|series| series.is_visible())
            .filter_map(|series| {
                let point = series.current_point()?;
                Some((series, point.y))
            })
            .collect();
        if values.is_empty() {
            return None;
        }
        let total: f64 = values.iter().map(|(_, value)| value).sum();
        let percent = self.strategy.is_percent();

        let rows = values
            .into_iter()
            .map(|(series, value)| TooltipRow {
                id: series.id().to_owned(),
                name: series.name().to_owned(),
                color_hex: series.color_hex().to_owned(),
                value,
                value_label: ctx.formatter.format_number(value),
                percentage: (percent && total > 0.0).then(|| (value / total * 100.0).round()),
            })
            .collect();

        Some(TooltipContent {
            title: ctx.formatter.format_date(timestamp, "D, j M"),
            timestamp,
            x,
            rows,
        })
    }

    /// `"j F Y - j F Y"` text for the visible window.
    #[must_use]
    pub fn range_label(&self, formatter: &dyn LabelFormatter) -> Option<String> {
        let target = self.strategy.primary().borders()?.target();
        Some(format!(
            "{} - {}",
            formatter.format_date(target.min_x, "j F Y"),
            formatter.format_date(target.max_x, "j F Y"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::DisplaySurface;
    use crate::api::engine_config::{ChartConfig, ChartKind, Theme};
    use crate::api::label_format::DefaultLabelFormatter;
    use crate::api::strategy::FrameContext;
    use crate::core::primitives::DAY_MILLIS;
    use crate::core::{DataPoint, Series, SeriesSet, Viewport};
    use crate::interaction::PointerPosition;

    // 2019-03-05T00:00:00Z
    const START: f64 = 1_551_744_000_000.0;

    fn setup(kind: ChartKind) -> (DisplaySurface, SeriesSet) {
        let config = ChartConfig::new(Viewport::new(400, 300));
        let mut set = SeriesSet::new();
        for (id, values) in [("a", [30.0, 10.0, 20.0]), ("b", [70.0, 90.0, 80.0])] {
            let points = values
                .iter()
                .enumerate()
                .map(|(i, &y)| DataPoint::new(START + i as f64 * DAY_MILLIS, y))
                .collect();
            set.insert(id.to_owned(), Series::new(id, id, "#3cc23f", points).expect("series"));
        }
        let mut display = DisplaySurface::new(kind, &config);
        for id in ["a", "b"] {
            display.strategy_mut().add_series(id, &set, 0.0);
        }
        (display, set)
    }

    #[test]
    fn pointer_snaps_every_series_and_builds_tooltip() {
        let (mut display, mut set) = setup(ChartKind::StackedPercent);
        assert!(display.pointer_move(PointerPosition::new(1.0, 100.0), &mut set, 0.0));
        assert!(!display.pointer_move(PointerPosition::new(2.0, 100.0), &mut set, 0.0));

        let palette = Theme::Light.palette();
        let ctx = FrameContext {
            now: 0.0,
            palette: &palette,
            formatter: &DefaultLabelFormatter,
        };
        let tooltip = display.tooltip(&set, &ctx).expect("tooltip");
        assert_eq!(tooltip.title, "Tue, 5 Mar");
        assert_eq!(tooltip.rows.len(), 2);
        assert_eq!(tooltip.rows[0].percentage, Some(30.0));
        assert_eq!(tooltip.rows[1].percentage, Some(70.0));
    }

    #[test]
    fn pointer_over_minimap_is_ignored() {
        let (mut display, mut set) = setup(ChartKind::Line);
        assert!(!display.pointer_move(PointerPosition::new(10.0, 290.0), &mut set, 0.0));
        assert!(set.values().all(|s| s.current_point().is_none()));
    }

    #[test]
    fn range_label_spans_the_window() {
        let (display, _) = setup(ChartKind::Line);
        assert_eq!(
            display.range_label(&DefaultLabelFormatter).as_deref(),
            Some("5 March 2019 - 7 March 2019")
        );
    }
}
