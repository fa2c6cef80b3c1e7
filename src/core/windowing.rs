use std::ops::Range;

use crate::core::scale::CoordinateMapper;
use crate::core::series::Series;

/// Index range of `series` needed to cover the canvas.
///
/// Starts from the points inside the series' active window (every point when
/// none is set) and extends one point at a time to the left while the
/// leftmost mapped x is still right of the canvas edge, and to the right while
/// the rightmost mapped x is still left of the canvas width. Extension stops
/// at the data boundaries, so the drawn geometry runs at least one sample past
/// each visible edge.
///
/// Returns `None` when the window holds no points; that series is skipped for
/// the frame.
#[must_use]
pub fn in_display_range(series: &Series, mapper: CoordinateMapper) -> Option<Range<usize>> {
    let points = series.points();
    let Range { mut start, mut end } = series.window_range();
    if start >= end {
        return None;
    }

    let width = mapper.area().width;
    while start > 0 && mapper.to_canvas_x(points[start].x) > 0.0 {
        start -= 1;
    }
    while end < points.len() && mapper.to_canvas_x(points[end - 1].x) < width {
        end += 1;
    }

    Some(start..end)
}

/// Index range a strategy strokes for `series`.
///
/// Windowed strategies use [`in_display_range`]; the minimap ignores the
/// series window and always draws every point.
#[must_use]
pub fn drawn_range(
    series: &Series,
    mapper: CoordinateMapper,
    windowed: bool,
) -> Option<Range<usize>> {
    if windowed {
        return in_display_range(series, mapper);
    }
    let len = series.points().len();
    (len > 0).then_some(0..len)
}

#[cfg(test)]
mod tests {
    use super::{drawn_range, in_display_range};
    use crate::core::{CoordinateMapper, DataPoint, Extent, PlotArea, Series, TimeWindow, Viewport};

    fn series_with_window(window: Option<TimeWindow>) -> Series {
        let points = (0..10).map(|i| DataPoint::new(f64::from(i), 1.0)).collect();
        let mut series = Series::new("a", "a", "#ffffff", points).expect("valid series");
        series.set_window(window);
        series
    }

    fn mapper(min_x: f64, max_x: f64) -> CoordinateMapper {
        CoordinateMapper::new(
            Extent::new(min_x, max_x, 0.0, 1.0),
            PlotArea::new(Viewport::new(100, 100), 0.0, 0.0),
        )
        .expect("mapper")
    }

    #[test]
    fn extends_one_point_past_each_edge() {
        let series = series_with_window(Some(TimeWindow::new(3.5, 6.5)));
        let range = in_display_range(&series, mapper(3.5, 6.5)).expect("range");
        assert_eq!(range, 3..8);
    }

    #[test]
    fn stops_at_data_boundaries() {
        let series = series_with_window(None);
        let range = in_display_range(&series, mapper(-5.0, 20.0)).expect("range");
        assert_eq!(range, 0..10);
    }

    #[test]
    fn points_on_the_edges_need_no_extension() {
        let series = series_with_window(Some(TimeWindow::new(2.0, 5.0)));
        let range = in_display_range(&series, mapper(2.0, 5.0)).expect("range");
        assert_eq!(range, 2..6);
    }

    #[test]
    fn empty_window_skips_series() {
        let series = series_with_window(Some(TimeWindow::new(3.2, 3.8)));
        assert!(in_display_range(&series, mapper(3.2, 3.8)).is_none());
    }

    #[test]
    fn unwindowed_range_ignores_an_empty_window() {
        let series = series_with_window(Some(TimeWindow::new(3.2, 3.8)));
        assert_eq!(drawn_range(&series, mapper(0.0, 9.0), false), Some(0..10));
        assert!(drawn_range(&series, mapper(3.2, 3.8), true).is_none());
    }
}
