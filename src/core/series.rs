use std::ops::Range;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use tracing::debug;

use crate::core::animation::{AnimatedScalar, Millis};
use crate::core::types::{DataPoint, TimeWindow};
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Series registry in registration order; stacking follows this order.
pub type SeriesSet = IndexMap<String, Series>;

/// One named, colored time-value sequence.
///
/// Points are validated once on construction (finite, strictly increasing
/// timestamps) and never mutated afterwards. Visibility, the fade opacity,
/// the cursor point and the active time window are the only mutable state.
#[derive(Debug, Clone)]
pub struct Series {
    id: String,
    name: String,
    color_hex: String,
    color: Color,
    points: Vec<DataPoint>,
    visible: bool,
    opacity: AnimatedScalar,
    current: Option<DataPoint>,
    window: Option<TimeWindow>,
}

impl Series {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        color_hex: impl Into<String>,
        points: Vec<DataPoint>,
    ) -> ChartResult<Self> {
        let id = id.into();
        let color_hex = color_hex.into();
        let color = Color::from_hex(&color_hex)?;
        validate_points(&id, &points)?;

        Ok(Self {
            id,
            name: name.into(),
            color_hex,
            color,
            points,
            visible: true,
            opacity: AnimatedScalar::settled(1.0),
            current: None,
            window: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    #[must_use]
    pub fn color_hex(&self) -> &str {
        &self.color_hex
    }

    #[must_use]
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn opacity(&self) -> &AnimatedScalar {
        &self.opacity
    }

    /// Toggles visibility and starts a fade from the live opacity.
    ///
    /// Returns `false` when the series already had the requested visibility.
    pub fn set_visible(&mut self, visible: bool, now: Millis, duration: Millis) -> bool {
        if self.visible == visible {
            return false;
        }
        self.visible = visible;
        let target = if visible { 1.0 } else { 0.0 };
        self.opacity = self.opacity.retarget(target, now, duration);
        debug!(id = %self.id, visible, from = self.opacity.from(), "series visibility");
        true
    }

    #[must_use]
    pub fn window(&self) -> Option<TimeWindow> {
        self.window
    }

    pub fn set_window(&mut self, window: Option<TimeWindow>) {
        self.window = window;
    }

    /// Index range of points inside the active window, or every point when
    /// no window is set.
    #[must_use]
    pub fn window_range(&self) -> Range<usize> {
        match self.window {
            Some(window) => {
                let start = self.points.partition_point(|p| p.x < window.from);
                let end = self.points.partition_point(|p| p.x <= window.to);
                start..end.max(start)
            }
            None => 0..self.points.len(),
        }
    }

    #[must_use]
    pub fn window_points(&self) -> &[DataPoint] {
        &self.points[self.window_range()]
    }

    fn scoped_points(&self, in_window: bool) -> &[DataPoint] {
        if in_window {
            self.window_points()
        } else {
            &self.points
        }
    }

    /// First and last timestamp, restricted to the window when requested.
    #[must_use]
    pub fn x_extent(&self, in_window: bool) -> Option<(f64, f64)> {
        let points = self.scoped_points(in_window);
        Some((points.first()?.x, points.last()?.x))
    }

    #[must_use]
    pub fn y_extent(&self, in_window: bool) -> Option<(f64, f64)> {
        let points = self.scoped_points(in_window);
        let min = points.iter().map(|p| OrderedFloat(p.y)).min()?;
        let max = points.iter().map(|p| OrderedFloat(p.y)).max()?;
        Some((min.0, max.0))
    }

    /// Value sampled exactly at `x`, if the series has a point there.
    #[must_use]
    pub fn value_at(&self, x: f64) -> Option<f64> {
        self.points
            .binary_search_by(|p| p.x.total_cmp(&x))
            .ok()
            .map(|index| self.points[index].y)
    }

    #[must_use]
    pub fn current_point(&self) -> Option<DataPoint> {
        self.current
    }

    /// Snaps the cursor point to the in-window sample nearest to `x`.
    ///
    /// Returns whether the current point changed.
    pub fn set_current_x(&mut self, x: Option<f64>) -> bool {
        let next = x.and_then(|x| nearest_point(self.window_points(), x));
        let changed = next != self.current;
        self.current = next;
        changed
    }
}

fn nearest_point(points: &[DataPoint], x: f64) -> Option<DataPoint> {
    if points.is_empty() || !x.is_finite() {
        return None;
    }
    let index = points.partition_point(|p| p.x < x);
    let candidates = [index.checked_sub(1), Some(index)];
    candidates
        .into_iter()
        .flatten()
        .filter_map(|i| points.get(i))
        .min_by(|a, b| (a.x - x).abs().total_cmp(&(b.x - x).abs()))
        .copied()
}

fn validate_points(id: &str, points: &[DataPoint]) -> ChartResult<()> {
    for point in points {
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(ChartError::InvalidData(format!(
                "series `{id}` contains a non-finite point"
            )));
        }
    }
    if points.windows(2).any(|pair| pair[1].x <= pair[0].x) {
        return Err(ChartError::InvalidData(format!(
            "series `{id}` timestamps must be strictly increasing"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Series;
    use crate::core::{DataPoint, TimeWindow};

    fn sample() -> Series {
        Series::new(
            "y0",
            "Joined",
            "#3cc23f",
            vec![
                DataPoint::new(0.0, 10.0),
                DataPoint::new(10.0, 20.0),
                DataPoint::new(20.0, 15.0),
                DataPoint::new(30.0, 5.0),
            ],
        )
        .expect("valid series")
    }

    #[test]
    fn rejects_unsorted_or_duplicate_timestamps() {
        let duplicate = vec![DataPoint::new(1.0, 1.0), DataPoint::new(1.0, 2.0)];
        assert!(Series::new("a", "a", "#000000", duplicate).is_err());
    }

    #[test]
    fn rejects_malformed_color() {
        assert!(Series::new("a", "a", "green", Vec::new()).is_err());
    }

    #[test]
    fn window_range_is_inclusive() {
        let mut series = sample();
        series.set_window(Some(TimeWindow::new(10.0, 20.0)));
        assert_eq!(series.window_range(), 1..3);
        assert_eq!(series.x_extent(true), Some((10.0, 20.0)));
        assert_eq!(series.y_extent(true), Some((15.0, 20.0)));
        assert_eq!(series.x_extent(false), Some((0.0, 30.0)));
    }

    #[test]
    fn empty_window_has_no_extent() {
        let mut series = sample();
        series.set_window(Some(TimeWindow::new(11.0, 19.0)));
        assert!(series.window_range().is_empty());
        assert_eq!(series.x_extent(true), None);
    }

    #[test]
    fn current_point_snaps_to_nearest_sample() {
        let mut series = sample();
        assert!(series.set_current_x(Some(14.0)));
        assert_eq!(series.current_point(), Some(DataPoint::new(10.0, 20.0)));
        assert!(!series.set_current_x(Some(12.0)));
        assert!(series.set_current_x(Some(16.0)));
        assert_eq!(series.current_point(), Some(DataPoint::new(20.0, 15.0)));
        assert!(series.set_current_x(None));
        assert_eq!(series.current_point(), None);
    }

    #[test]
    fn toggling_twice_keeps_fade_continuous() {
        let mut series = sample();
        assert!(series.set_visible(false, 0.0, 200.0));
        let live = series.opacity().value(100.0);
        assert!(series.set_visible(true, 100.0, 200.0));
        assert_eq!(series.opacity().from(), live);
        assert!(live > 0.0 && live < 1.0);
        assert!(!series.set_visible(true, 120.0, 200.0));
    }
}
