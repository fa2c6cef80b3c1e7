use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use tracing::trace;

use crate::api::strategy::{FrameContext, StrategyCore};
use crate::core::{CoordinateMapper, DataPoint, Millis, SeriesSet, drawn_range, in_display_range};
use crate::render::{DrawingSurface, Point, TextHAlign};

/// Minimum slice height, in pixels, of a fully visible sample.
pub const MIN_SLICE_HEIGHT_PX: f64 = 2.0;
/// Alpha of columns other than the highlighted one in bar layout.
const DIMMED_COLUMN_ALPHA: f64 = 0.5;

/// Accumulated pixel height per timestamp, shared by the bands of one
/// frame so each band starts where the previous one ended.
pub type StackBaseline = BTreeMap<OrderedFloat<f64>, f64>;

/// One sample of a band in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackSlice {
    pub timestamp: f64,
    pub x: f64,
    pub top: f64,
    pub height: f64,
}

/// Geometry of one series stacked on top of the previous ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackBand {
    pub slices: Vec<StackSlice>,
}

impl StackBand {
    /// Interpolated tops followed by the baseline walked backwards.
    #[must_use]
    pub fn area_polygon(&self) -> Vec<Point> {
        let tops = self.slices.iter().map(|s| Point::new(s.x, s.top));
        let bottoms = self
            .slices
            .iter()
            .rev()
            .map(|s| Point::new(s.x, s.top + s.height));
        tops.chain(bottoms).collect()
    }

    /// Flat-topped columns, each spanning to the next sample.
    #[must_use]
    pub fn bar_polygon(&self) -> Vec<Point> {
        let mut tops = Vec::with_capacity(self.slices.len() * 2);
        let mut bottoms = Vec::with_capacity(self.slices.len() * 2);
        for index in 0..self.slices.len() {
            let (left, right) = self.column_edges(index);
            let slice = self.slices[index];
            tops.push(Point::new(left, slice.top));
            tops.push(Point::new(right, slice.top));
            bottoms.push(Point::new(right, slice.top + slice.height));
            bottoms.push(Point::new(left, slice.top + slice.height));
        }
        bottoms.reverse();
        tops.extend(bottoms);
        tops
    }

    /// Rectangle of the column sampled at `timestamp`.
    #[must_use]
    pub fn column_at(&self, timestamp: f64) -> Option<[Point; 4]> {
        let index = self.slices.iter().position(|s| s.timestamp == timestamp)?;
        let (left, right) = self.column_edges(index);
        let slice = self.slices[index];
        let bottom = slice.top + slice.height;
        Some([
            Point::new(left, slice.top),
            Point::new(right, slice.top),
            Point::new(right, bottom),
            Point::new(left, bottom),
        ])
    }

    /// The last column repeats the previous step width.
    fn column_edges(&self, index: usize) -> (f64, f64) {
        let left = self.slices[index].x;
        let right = match self.slices.get(index + 1) {
            Some(next) => next.x,
            None => match index.checked_sub(1).and_then(|i| self.slices.get(i)) {
                Some(previous) => left + (left - previous.x),
                None => left,
            },
        };
        (left, right)
    }
}

/// Stacks `points` onto `baseline` and advances it.
///
/// Opacity below 1 shrinks each slice proportionally; at full opacity every
/// slice is at least [`MIN_SLICE_HEIGHT_PX`] tall.
pub fn stack_band(
    points: &[DataPoint],
    mapper: CoordinateMapper,
    opacity: f64,
    baseline: &mut StackBaseline,
) -> StackBand {
    let zero = mapper.to_canvas_y(0.0);
    let slices = points
        .iter()
        .map(|point| {
            let mut height = zero - mapper.to_canvas_y(point.y);
            if opacity < 1.0 {
                height *= opacity;
            }
            let below = baseline.entry(OrderedFloat(point.x)).or_insert(0.0);
            let top = zero - height - *below;
            if opacity >= 1.0 && height < MIN_SLICE_HEIGHT_PX {
                height = MIN_SLICE_HEIGHT_PX;
            }
            *below += height;
            StackSlice {
                timestamp: point.x,
                x: mapper.to_canvas_x(point.x),
                top,
                height,
            }
        })
        .collect();
    StackBand { slices }
}

/// Converts each column to its share of the per-timestamp total.
///
/// The total weights every value by its column's opacity, so a fading
/// column gives up its share gradually. Samples whose total is not
/// positive are dropped.
#[must_use]
pub fn normalize_percentages(columns: &[(&[DataPoint], f64)]) -> Vec<Vec<DataPoint>> {
    let mut totals: BTreeMap<OrderedFloat<f64>, f64> = BTreeMap::new();
    for (points, opacity) in columns {
        for point in *points {
            *totals.entry(OrderedFloat(point.x)).or_insert(0.0) += point.y * opacity;
        }
    }
    columns
        .iter()
        .map(|(points, _)| {
            points
                .iter()
                .filter_map(|point| {
                    let total = totals.get(&OrderedFloat(point.x)).copied()?;
                    (total.is_finite() && total > 0.0)
                        .then(|| DataPoint::new(point.x, point.y / total * 100.0))
                })
                .collect()
        })
        .collect()
}

/// Stacked areas or columns, in absolute values or as percentages.
#[derive(Debug, Clone)]
pub struct StackedStrategy {
    core: StrategyCore,
    percent: bool,
    bars: bool,
}

impl StackedStrategy {
    #[must_use]
    pub fn new(core: StrategyCore, percent: bool, bars: bool) -> Self {
        Self {
            core,
            percent,
            bars,
        }
    }

    #[must_use]
    pub fn core(&self) -> &StrategyCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut StrategyCore {
        &mut self.core
    }

    /// Half a drawn column in bar layout, so the pointer selects the column
    /// under it.
    #[must_use]
    pub fn hit_offset(&self, set: &SeriesSet, mapper: CoordinateMapper) -> f64 {
        if !self.bars {
            return 0.0;
        }
        let columns = self
            .core
            .series(set)
            .filter_map(|series| in_display_range(series, mapper))
            .map(|range| range.len())
            .max()
            .unwrap_or(0);
        if columns == 0 {
            return 0.0;
        }
        self.core.area().width / columns as f64 / 2.0
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
        let Some(live) = self.core.live_mapper(now) else {
            return animating;
        };
        let max_y = if self.percent {
            100.0
        } else {
            live.extent().max_y
        };
        let Ok(mapper) = live.with_y_bounds(0.0, max_y) else {
            trace!(max_y, "skipping stacked draw for empty Y range");
            return animating;
        };
        let decorated = self.core.options().decorated();

        if decorated {
            self.core.draw_milestones(surface, mapper, ctx);
        }
        self.draw_bands(surface, set, mapper, now);
        if decorated {
            let guides = self.core.guides();
            guides.draw_lines(surface, mapper, ctx.palette.axis_line, now);
            guides.draw_labels(
                surface,
                mapper,
                ctx.palette.axis_text,
                TextHAlign::Left,
                now,
            );
            if self.percent {
                self.core.draw_current_line(surface, set, mapper, ctx);
            }
        }
        animating
    }

    fn draw_bands(
        &self,
        surface: &mut dyn DrawingSurface,
        set: &SeriesSet,
        mapper: CoordinateMapper,
        now: Millis,
    ) {
        let windowed = self.core.options().in_window();
        let mut visible = Vec::new();
        for series in self.core.series(set) {
            let opacity = series.opacity().value(now);
            if opacity <= 0.0 {
                continue;
            }
            let Some(range) = drawn_range(series, mapper, windowed) else {
                trace!(id = series.id(), "no points in window");
                continue;
            };
            visible.push((series, &series.points()[range], opacity));
        }

        let normalized = self.percent.then(|| {
            let columns: Vec<(&[DataPoint], f64)> =
                visible.iter().map(|(_, points, opacity)| (*points, *opacity)).collect();
            normalize_percentages(&columns)
        });

        let highlight = if self.bars && self.core.options().decorated() {
            self.core
                .series(set)
                .filter(|series| series.is_visible())
                .find_map(|series| series.current_point())
                .map(|point| point.x)
        } else {
            None
        };

        let mut baseline = StackBaseline::new();
        for (index, (series, points, opacity)) in visible.iter().enumerate() {
            let points = match &normalized {
                Some(normalized) => normalized[index].as_slice(),
                None => *points,
            };
            let band = stack_band(points, mapper, *opacity, &mut baseline);
            let color = series.color();
            let outline = if self.bars {
                band.bar_polygon()
            } else {
                band.area_polygon()
            };
            match highlight {
                Some(timestamp) => {
                    surface.filled_shape(&outline, color.with_opacity(DIMMED_COLUMN_ALPHA));
                    if let Some(column) = band.column_at(timestamp) {
                        surface.filled_shape(&column, color);
                    }
                }
                None => surface.filled_shape(&outline, color),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{StackBaseline, normalize_percentages, stack_band};
    use crate::api::engine_config::{ChartConfig, ChartKind};
    use crate::api::strategy::{DrawingStrategy, StrategyRole};
    use crate::core::{
        CoordinateMapper, DataPoint, Extent, PlotArea, Series, SeriesSet, TimeWindow, Viewport,
    };

    fn mapper(max_y: f64) -> CoordinateMapper {
        CoordinateMapper::new(
            Extent::new(0.0, 2.0, 0.0, max_y),
            PlotArea {
                width: 200.0,
                height: 100.0,
                top_padding: 0.0,
                bottom_padding: 0.0,
            },
        )
        .expect("mapper")
    }

    #[test]
    fn second_band_starts_on_the_first() {
        let mapper = mapper(100.0);
        let mut baseline = StackBaseline::new();
        let lower = stack_band(&[DataPoint::new(0.0, 30.0)], mapper, 1.0, &mut baseline);
        let upper = stack_band(&[DataPoint::new(0.0, 70.0)], mapper, 1.0, &mut baseline);

        assert_relative_eq!(lower.slices[0].top, 70.0);
        assert_relative_eq!(lower.slices[0].height, 30.0);
        assert_relative_eq!(upper.slices[0].top, 0.0);
        assert_relative_eq!(upper.slices[0].top + upper.slices[0].height, lower.slices[0].top);
    }

    #[test]
    fn fading_band_shrinks_and_visible_band_keeps_min_height() {
        let mapper = mapper(100.0);
        let mut baseline = StackBaseline::new();
        let tiny = stack_band(&[DataPoint::new(0.0, 0.5)], mapper, 1.0, &mut baseline);
        assert_relative_eq!(tiny.slices[0].height, 2.0);

        let mut baseline = StackBaseline::new();
        let fading = stack_band(&[DataPoint::new(0.0, 40.0)], mapper, 0.25, &mut baseline);
        assert_relative_eq!(fading.slices[0].height, 10.0);
    }

    #[test]
    fn percentages_follow_opacity_weighted_totals() {
        let a = [DataPoint::new(0.0, 10.0), DataPoint::new(1.0, 30.0)];
        let b = [DataPoint::new(0.0, 90.0), DataPoint::new(1.0, 70.0)];
        let normalized = normalize_percentages(&[(&a[..], 1.0), (&b[..], 1.0)]);
        assert_relative_eq!(normalized[0][0].y, 10.0);
        assert_relative_eq!(normalized[1][1].y, 70.0);

        let fading = normalize_percentages(&[(&a[..], 1.0), (&b[..], 0.5)]);
        let total = fading[0][0].y + fading[1][0].y * 0.5;
        assert_relative_eq!(total, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_total_samples_are_dropped() {
        let a = [DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 5.0)];
        let normalized = normalize_percentages(&[(&a[..], 1.0)]);
        assert_eq!(normalized[0], vec![DataPoint::new(1.0, 100.0)]);
    }

    #[test]
    fn bar_columns_reuse_the_previous_step_for_the_last_sample() {
        let mapper = mapper(100.0);
        let mut baseline = StackBaseline::new();
        let band = stack_band(
            &[DataPoint::new(0.0, 10.0), DataPoint::new(1.0, 10.0)],
            mapper,
            1.0,
            &mut baseline,
        );
        let last = band.column_at(1.0).expect("column");
        assert_relative_eq!(last[0].x, 100.0);
        assert_relative_eq!(last[1].x, 200.0);
        assert_eq!(band.bar_polygon().len(), 8);
    }

    #[test]
    fn bar_hit_offset_uses_the_drawn_column_count() {
        let config = ChartConfig::new(Viewport::new(400, 300));
        let points = (0..10).map(|i| DataPoint::new(f64::from(i), 5.0)).collect();
        let mut series = Series::new("a", "a", "#3cc23f", points).expect("series");
        series.set_window(Some(TimeWindow::new(3.5, 6.5)));
        let mut set = SeriesSet::new();
        set.insert("a".to_owned(), series);

        let area = config.display_area();
        let mapper =
            CoordinateMapper::new(Extent::new(3.5, 6.5, 0.0, 5.0), area).expect("mapper");
        let mut bars = DrawingStrategy::new(
            ChartKind::Stacked { bars: true },
            StrategyRole::Display,
            &config,
            area,
        );
        bars.add_series("a", &set, 0.0);
        // Three points lie in the window; five are drawn once extended past the edges.
        assert_relative_eq!(bars.hit_offset(&set, mapper), area.width / 5.0 / 2.0);

        let mut areas = DrawingStrategy::new(
            ChartKind::Stacked { bars: false },
            StrategyRole::Display,
            &config,
            area,
        );
        areas.add_series("a", &set, 0.0);
        assert_relative_eq!(areas.hit_offset(&set, mapper), 0.0);
    }
}
