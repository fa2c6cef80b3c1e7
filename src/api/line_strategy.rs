use tracing::trace;

use crate::api::strategy::{FrameContext, StrategyCore};
use crate::core::{CoordinateMapper, Millis, Series, SeriesSet, drawn_range};
use crate::render::{ClipRect, DrawingSurface, Point, TextHAlign};

/// One polyline per series on a shared Y axis.
#[derive(Debug, Clone)]
pub struct LineStrategy {
    core: StrategyCore,
}

impl LineStrategy {
    #[must_use]
    pub fn new(core: StrategyCore) -> Self {
        Self { core }
    }

    #[must_use]
    pub fn core(&self) -> &StrategyCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut StrategyCore {
        &mut self.core
    }

    pub fn draw(
        &mut self,
        surface: &mut dyn DrawingSurface,
        set: &SeriesSet,
        ctx: &FrameContext<'_>,
    ) -> bool {
        let now = ctx.now;
        self.core.prune_guides(now);
        let animating = self.core.is_animating(set, now);
        let Some(mapper) = self.core.live_mapper(now) else {
            return animating;
        };
        let decorated = self.core.options().decorated();
        let line_width = self.core.options().line_width;
        let windowed = self.core.options().in_window();

        if decorated {
            self.core
                .guides()
                .draw_lines(surface, mapper, ctx.palette.axis_line, now);
            self.core.draw_milestones(surface, mapper, ctx);
            self.core.draw_current_line(surface, set, mapper, ctx);
        }

        surface.save_clip(series_clip(mapper));
        for series in self.core.series(set) {
            draw_line_series(surface, series, mapper, line_width, windowed, now);
        }
        surface.restore_clip();

        if decorated {
            self.core.guides().draw_labels(
                surface,
                mapper,
                ctx.palette.axis_text,
                TextHAlign::Left,
                now,
            );
            self.core.draw_current_points(surface, set, mapper, ctx);
        }
        animating
    }
}

/// Clip box for series geometry: full width, down to just under the plot.
pub(crate) fn series_clip(mapper: CoordinateMapper) -> ClipRect {
    let area = mapper.area();
    ClipRect::new(0.0, 0.0, area.width, area.plot_bottom() + 30.0)
}

/// Strokes the part of `series` that covers the canvas at its live opacity.
///
/// Fully transparent series are skipped, as are windowed series without
/// in-window points.
pub(crate) fn draw_line_series(
    surface: &mut dyn DrawingSurface,
    series: &Series,
    mapper: CoordinateMapper,
    line_width: f64,
    windowed: bool,
    now: Millis,
) {
    let opacity = series.opacity().value(now);
    if opacity <= 0.0 {
        return;
    }
    let Some(range) = drawn_range(series, mapper, windowed) else {
        trace!(id = series.id(), "no points in window");
        return;
    };
    let points: Vec<Point> = series.points()[range]
        .iter()
        .map(|p| Point::new(mapper.to_canvas_x(p.x), mapper.to_canvas_y(p.y)))
        .collect();
    surface.path(&points, series.color().with_opacity(opacity), line_width);
}

#[cfg(test)]
mod tests {
    use crate::api::engine_config::{ChartConfig, ChartKind, Theme};
    use crate::api::label_format::DefaultLabelFormatter;
    use crate::api::strategy::{DrawingStrategy, FrameContext, StrategyRole};
    use crate::core::{DataPoint, Series, SeriesSet, Viewport};
    use crate::render::{DrawingSurface, RenderFrame};

    fn set() -> SeriesSet {
        let mut set = SeriesSet::new();
        for (id, scale) in [("a", 1.0), ("b", 2.0)] {
            let points = (0..10)
                .map(|i| DataPoint::new(f64::from(i) * 1_000.0, f64::from(i) * scale))
                .collect();
            set.insert(id.to_owned(), Series::new(id, id, "#3cc23f", points).expect("series"));
        }
        set
    }

    #[test]
    fn overview_line_draws_one_path_per_visible_series() {
        let config = ChartConfig::new(Viewport::new(400, 300));
        let series = set();
        let mut strategy = DrawingStrategy::new(
            ChartKind::Line,
            StrategyRole::Overview,
            &config,
            config.minimap_area(),
        );
        strategy.add_series("a", &series, 0.0);
        strategy.add_series("b", &series, 0.0);

        let palette = Theme::Light.palette();
        let ctx = FrameContext {
            now: 0.0,
            palette: &palette,
            formatter: &DefaultLabelFormatter,
        };
        let mut frame = RenderFrame::new(Viewport::new(400, 38));
        let animating = strategy.draw_all(&mut frame, &series, &ctx);

        assert!(!animating);
        assert_eq!(frame.paths().len(), 2);
        assert!(frame.texts().is_empty());
        let first = &frame.paths()[0].points;
        assert_eq!(first.first().map(|p| p.x), Some(0.0));
        assert_eq!(first.last().map(|p| p.x), Some(frame.width()));
    }
}
