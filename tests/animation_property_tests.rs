use overview_chart::core::{AnimatedScalar, DataPoint, Series};
use proptest::prelude::*;

fn series() -> Series {
    Series::new(
        "y0",
        "Joined",
        "#3cc23f",
        vec![DataPoint::new(0.0, 1.0), DataPoint::new(1.0, 2.0)],
    )
    .expect("valid series")
}

#[test]
fn toggle_before_fade_settles_continues_from_live_opacity() {
    let mut series = series();
    assert!(series.set_visible(false, 1_000.0, 200.0));
    let live = series.opacity().value(1_080.0);
    assert!(live > 0.0 && live < 1.0);

    assert!(series.set_visible(true, 1_080.0, 200.0));
    assert_eq!(series.opacity().from(), live);
    assert_eq!(series.opacity().value(1_080.0), live);
    assert_eq!(series.opacity().target(), 1.0);
    assert_eq!(series.opacity().value(1_280.0), 1.0);
}

#[test]
fn finished_latches_once_progress_reaches_one() {
    let scalar = AnimatedScalar::new(10.0, 20.0, 0.0, 100.0);
    assert!(!scalar.is_finished(99.0));
    assert!(scalar.is_finished(100.0));
    assert!(scalar.is_finished(0.0));
}

proptest! {
    #[test]
    fn endpoints_match_from_and_to(
        from in -1.0e6f64..1.0e6,
        to in -1.0e6f64..1.0e6,
        start in 0.0f64..1.0e6,
        duration in 1.0f64..5_000.0
    ) {
        let scalar = AnimatedScalar::new(from, to, start, duration);
        prop_assert_eq!(scalar.value(start), from);
        prop_assert_eq!(scalar.value(start + duration + 1.0), to);
        prop_assert!(scalar.is_finished(start + duration + 1.0));
    }

    #[test]
    fn value_moves_monotonically_toward_target(
        from in -1.0e6f64..1.0e6,
        to in -1.0e6f64..1.0e6,
        duration in 1.0f64..5_000.0,
        steps in 2usize..64
    ) {
        let scalar = AnimatedScalar::new(from, to, 0.0, duration);
        let direction = (to - from).signum();
        let mut previous = scalar.value(0.0);
        for step in 1..=steps {
            let now = duration * step as f64 / steps as f64;
            let value = scalar.value(now);
            prop_assert!((value - previous) * direction >= -1e-9);
            previous = value;
        }
        prop_assert!((previous - to).abs() <= 1e-6 * (1.0 + to.abs()));
    }

    #[test]
    fn retarget_is_continuous(
        target in -1.0e3f64..1.0e3,
        interrupt in 0.0f64..1.0,
        duration in 1.0f64..1_000.0
    ) {
        let scalar = AnimatedScalar::new(0.0, 1.0, 0.0, duration);
        let now = interrupt * duration;
        let live = scalar.value(now);
        let next = scalar.retarget(target, now, duration);
        prop_assert_eq!(next.from(), live);
        prop_assert_eq!(next.value(now), live);
    }
}
