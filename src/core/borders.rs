use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::animation::{AnimatedScalar, Millis};
use crate::core::series::Series;

/// Value-space rectangle mapped onto the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Extent {
    /// Builds an extent, raising each max to at least its min.
    #[must_use]
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x: max_x.max(min_x),
            min_y,
            max_y: max_y.max(min_y),
        }
    }

    #[must_use]
    pub fn x_span(self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn y_span(self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn with_x(self, min_x: f64, max_x: f64) -> Self {
        Self::new(min_x, max_x, self.min_y, self.max_y)
    }
}

/// Lower Y bound policy for line strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum YFloor {
    /// Axis starts at zero.
    #[default]
    Zero,
    /// Axis starts at the smallest visible value, allowing negatives.
    DataMinimum,
}

/// How a strategy derives its Y bounds from the visible series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtentRule {
    /// Per-series min/max.
    Line { y_floor: YFloor },
    /// Maximum over time of the summed values.
    Stacked,
    /// Fixed `0..100`.
    StackedPercent,
}

/// Target extent across the visible series, restricted to each series'
/// window when `in_window` is set.
///
/// Returns `None` when no visible series has points in scope, in which case
/// callers keep the previous borders.
#[must_use]
pub fn compute_extent<'a, I>(series: I, rule: ExtentRule, in_window: bool) -> Option<Extent>
where
    I: IntoIterator<Item = &'a Series>,
{
    let visible: Vec<&Series> = series.into_iter().filter(|s| s.is_visible()).collect();

    let (min_x, max_x) = visible
        .iter()
        .filter_map(|s| s.x_extent(in_window))
        .fold(None, |acc: Option<(f64, f64)>, (lo, hi)| match acc {
            Some((min, max)) => Some((min.min(lo), max.max(hi))),
            None => Some((lo, hi)),
        })?;

    let (min_y, max_y) = match rule {
        ExtentRule::Line { y_floor } => {
            let (data_min, data_max) = visible
                .iter()
                .filter_map(|s| s.y_extent(in_window))
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), (lo, hi)| {
                    (min.min(lo), max.max(hi))
                });
            match y_floor {
                YFloor::Zero => (0.0, data_max),
                YFloor::DataMinimum => (data_min, data_max),
            }
        }
        ExtentRule::Stacked => (0.0, max_stacked_sum(&visible, in_window)),
        ExtentRule::StackedPercent => (0.0, 100.0),
    };

    Some(Extent::new(min_x, max_x, min_y, max_y))
}

/// Largest per-timestamp sum of the given series' values.
fn max_stacked_sum(series: &[&Series], in_window: bool) -> f64 {
    let mut sums: BTreeMap<OrderedFloat<f64>, f64> = BTreeMap::new();
    for s in series {
        let points = if in_window {
            s.window_points()
        } else {
            s.points()
        };
        for point in points {
            *sums.entry(OrderedFloat(point.x)).or_insert(0.0) += point.y;
        }
    }
    sums.values().copied().fold(0.0, f64::max)
}

/// Four animated bounds: the single source of truth for the rendered
/// value-space extent.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderSet {
    pub min_x: AnimatedScalar,
    pub max_x: AnimatedScalar,
    pub min_y: AnimatedScalar,
    pub max_y: AnimatedScalar,
}

impl BorderSet {
    #[must_use]
    pub fn settled(extent: Extent) -> Self {
        Self {
            min_x: AnimatedScalar::settled(extent.min_x),
            max_x: AnimatedScalar::settled(extent.max_x),
            min_y: AnimatedScalar::settled(extent.min_y),
            max_y: AnimatedScalar::settled(extent.max_y),
        }
    }

    /// Replacement border set heading to `extent`.
    ///
    /// Animates from the live values of `previous`; snaps when there is no
    /// previous set or `y_duration` is zero.
    #[must_use]
    pub fn transition(
        previous: Option<&Self>,
        extent: Extent,
        now: Millis,
        x_duration: Millis,
        y_duration: Millis,
    ) -> Self {
        match previous {
            Some(previous) if y_duration > 0.0 => Self {
                min_x: previous.min_x.retarget(extent.min_x, now, x_duration),
                max_x: previous.max_x.retarget(extent.max_x, now, x_duration),
                min_y: previous.min_y.retarget(extent.min_y, now, y_duration),
                max_y: previous.max_y.retarget(extent.max_y, now, y_duration),
            },
            _ => Self::settled(extent),
        }
    }

    /// Live extent sampled at `now`.
    #[must_use]
    pub fn current(&self, now: Millis) -> Extent {
        Extent {
            min_x: self.min_x.value(now),
            max_x: self.max_x.value(now),
            min_y: self.min_y.value(now),
            max_y: self.max_y.value(now),
        }
    }

    /// Extent the animation is heading to.
    #[must_use]
    pub fn target(&self) -> Extent {
        Extent {
            min_x: self.min_x.target(),
            max_x: self.max_x.target(),
            min_y: self.min_y.target(),
            max_y: self.max_y.target(),
        }
    }

    #[must_use]
    pub fn is_x_finished(&self, now: Millis) -> bool {
        self.min_x.is_finished(now) && self.max_x.is_finished(now)
    }

    #[must_use]
    pub fn is_y_finished(&self, now: Millis) -> bool {
        self.min_y.is_finished(now) && self.max_y.is_finished(now)
    }

    #[must_use]
    pub fn is_finished(&self, now: Millis) -> bool {
        self.is_x_finished(now) && self.is_y_finished(now)
    }
}

#[cfg(test)]
mod tests {
    use super::{BorderSet, Extent, ExtentRule, YFloor, compute_extent};
    use crate::core::{DataPoint, Series, TimeWindow};

    fn series(id: &str, values: &[(f64, f64)]) -> Series {
        let points = values.iter().map(|&(x, y)| DataPoint::new(x, y)).collect();
        Series::new(id, id, "#112233", points).expect("valid series")
    }

    #[test]
    fn line_extent_starts_at_zero_by_default() {
        let s = series("a", &[(0.0, 10.0), (1.0, 20.0), (2.0, 15.0)]);
        let extent = compute_extent([&s], ExtentRule::Line { y_floor: YFloor::Zero }, true)
            .expect("extent");
        assert_eq!(extent, Extent::new(0.0, 2.0, 0.0, 20.0));
    }

    #[test]
    fn data_minimum_floor_allows_negative_values() {
        let s = series("a", &[(0.0, -4.0), (1.0, 6.0)]);
        let rule = ExtentRule::Line {
            y_floor: YFloor::DataMinimum,
        };
        let extent = compute_extent([&s], rule, false).expect("extent");
        assert_eq!(extent.min_y, -4.0);
    }

    #[test]
    fn stacked_extent_uses_max_sum_over_time() {
        let a = series("a", &[(0.0, 10.0), (1.0, 1.0)]);
        let b = series("b", &[(0.0, 1.0), (1.0, 30.0)]);
        let extent = compute_extent([&a, &b], ExtentRule::Stacked, false).expect("extent");
        assert_eq!(extent.max_y, 31.0);
    }

    #[test]
    fn hidden_series_leave_no_extent() {
        let mut s = series("a", &[(0.0, 1.0)]);
        s.set_visible(false, 0.0, 0.0);
        assert!(compute_extent([&s], ExtentRule::Stacked, false).is_none());
    }

    #[test]
    fn window_restricts_to_in_window_samples() {
        let mut s = series("a", &[(0.0, 50.0), (1.0, 2.0), (2.0, 4.0), (3.0, 60.0)]);
        s.set_window(Some(TimeWindow::new(0.5, 2.5)));
        let extent = compute_extent([&s], ExtentRule::Line { y_floor: YFloor::Zero }, true)
            .expect("extent");
        assert_eq!(extent, Extent::new(1.0, 2.0, 0.0, 4.0));
    }

    #[test]
    fn transition_without_previous_snaps() {
        let extent = Extent::new(0.0, 10.0, 0.0, 5.0);
        let borders = BorderSet::transition(None, extent, 0.0, 100.0, 200.0);
        assert!(borders.is_finished(0.0));
        assert_eq!(borders.current(0.0), extent);
    }

    #[test]
    fn transition_animates_from_previous_live_values() {
        let first = BorderSet::settled(Extent::new(0.0, 10.0, 0.0, 100.0));
        let next = BorderSet::transition(
            Some(&first),
            Extent::new(5.0, 10.0, 0.0, 200.0),
            1_000.0,
            100.0,
            200.0,
        );
        assert_eq!(next.current(1_000.0).max_y, 100.0);
        assert!(next.is_x_finished(1_100.0));
        assert!(!next.is_y_finished(1_100.0));
        assert_eq!(next.current(1_200.0), next.target());
    }
}
