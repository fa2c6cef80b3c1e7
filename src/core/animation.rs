use std::cell::Cell;

/// Milliseconds on the host's monotonic animation clock.
pub type Millis = f64;

/// Scalar that eases from `from` to `to` over `duration` milliseconds.
///
/// Instances are never retargeted in place: [`AnimatedScalar::retarget`]
/// builds a new scalar seeded with the live value, so an interrupted
/// animation continues from wherever it visually was.
///
/// Easing is ease-out quadratic, `p * (2 - p)` with
/// `p = clamp((now - start) / duration, 0, 1)`. Once a sample reaches
/// `p == 1` the scalar latches as settled and later reads skip time math.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedScalar {
    from: f64,
    to: f64,
    start: Millis,
    duration: Millis,
    settled: Cell<bool>,
}

impl AnimatedScalar {
    /// Scalar already resting at `target`.
    #[must_use]
    pub fn settled(target: f64) -> Self {
        Self {
            from: target,
            to: target,
            start: 0.0,
            duration: 0.0,
            settled: Cell::new(true),
        }
    }

    /// Scalar animating from `from` to `to`, starting at `now`.
    ///
    /// Non-positive or non-finite durations produce a settled scalar.
    #[must_use]
    pub fn new(from: f64, to: f64, now: Millis, duration: Millis) -> Self {
        let animating = duration.is_finite() && duration > 0.0;
        Self {
            from,
            to,
            start: now,
            duration: if animating { duration } else { 0.0 },
            settled: Cell::new(!animating),
        }
    }

    /// Replacement scalar heading to `to`, starting from the live value at `now`.
    #[must_use]
    pub fn retarget(&self, to: f64, now: Millis, duration: Millis) -> Self {
        Self::new(self.value(now), to, now, duration)
    }

    #[must_use]
    pub fn from(&self) -> f64 {
        self.from
    }

    #[must_use]
    pub fn target(&self) -> f64 {
        self.to
    }

    #[must_use]
    pub fn duration(&self) -> Millis {
        self.duration
    }

    /// Linear progress in `[0, 1]`; negative elapsed time clamps to 0.
    #[must_use]
    pub fn progress(&self, now: Millis) -> f64 {
        if self.settled.get() {
            return 1.0;
        }
        let elapsed = now - self.start;
        if !elapsed.is_finite() {
            return 0.0;
        }
        (elapsed / self.duration).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn value(&self, now: Millis) -> f64 {
        if self.settled.get() {
            return self.to;
        }
        let p = self.progress(now);
        if p >= 1.0 {
            self.settled.set(true);
            return self.to;
        }
        if p <= 0.0 {
            return self.from;
        }
        self.from + (self.to - self.from) * (p * (2.0 - p))
    }

    /// Samples the clock and reports whether the animation has completed.
    #[must_use]
    pub fn is_finished(&self, now: Millis) -> bool {
        let _ = self.value(now);
        self.settled.get()
    }

    /// Settled flag as last latched, without sampling the clock.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled.get()
    }
}

#[cfg(test)]
mod tests {
    use super::AnimatedScalar;

    #[test]
    fn settled_scalar_reports_target_immediately() {
        let scalar = AnimatedScalar::settled(42.0);
        assert!(scalar.is_settled());
        assert_eq!(scalar.value(-10.0), 42.0);
    }

    #[test]
    fn zero_duration_is_settled() {
        let scalar = AnimatedScalar::new(0.0, 5.0, 100.0, 0.0);
        assert!(scalar.is_settled());
        assert_eq!(scalar.value(100.0), 5.0);
    }

    #[test]
    fn eases_out_quadratically() {
        let scalar = AnimatedScalar::new(0.0, 100.0, 0.0, 100.0);
        assert_eq!(scalar.value(0.0), 0.0);
        assert_eq!(scalar.value(50.0), 75.0);
        assert!(!scalar.is_settled());
        assert_eq!(scalar.value(100.0), 100.0);
        assert!(scalar.is_settled());
    }

    #[test]
    fn clock_skew_clamps_to_from() {
        let scalar = AnimatedScalar::new(3.0, 9.0, 1_000.0, 200.0);
        assert_eq!(scalar.value(500.0), 3.0);
        assert!(!scalar.is_finished(500.0));
    }

    #[test]
    fn settling_latches_even_if_clock_goes_back() {
        let scalar = AnimatedScalar::new(0.0, 1.0, 0.0, 10.0);
        assert!(scalar.is_finished(20.0));
        assert_eq!(scalar.value(5.0), 1.0);
    }

    #[test]
    fn retarget_starts_from_live_value() {
        let fading_out = AnimatedScalar::new(1.0, 0.0, 0.0, 100.0);
        let live = fading_out.value(50.0);
        let fading_in = fading_out.retarget(1.0, 50.0, 100.0);
        assert_eq!(fading_in.from(), live);
        assert_eq!(fading_in.value(50.0), live);
        assert_eq!(fading_in.target(), 1.0);
    }
}
