//=========================================================================
// Tween
//=========================================================================
//
// Time-driven interpolation between two points.
//
// Progress is elapsed / duration clamped to [0, 1] and shaped by an
// easing curve. The tween reports `finished` on exactly one advance (the
// first to reach 100%) and from then on holds the target value.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use kurbo::Point;

//=== Easing ==============================================================

/// Easing curve mapping linear progress onto eased progress.
///
/// Every curve maps 0 to 0 and 1 to 1 exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    EaseOutCubic,
    EaseInCubic,
    EaseInOutCubic,
    EaseOutQuad,
}

impl Easing {
    /// Applies the curve to `t` (clamped to `[0, 1]`).
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInCubic => t.powi(3),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t.powi(3)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::EaseOutQuad => 1.0 - (1.0 - t).powi(2),
        }
    }
}

//=== TweenStep ===========================================================

/// Output of a single [`Tween::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenStep {
    pub value: Point,

    /// True only on the advance that completed the tween.
    pub finished: bool,
}

//=== Tween ===============================================================

#[derive(Debug, Clone)]
pub struct Tween {
    from: Point,
    to: Point,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
    completed: bool,
}

impl Tween {
    pub fn new(from: Point, to: Point, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            easing,
            completed: false,
        }
    }

    /// Advances by `dt` and returns the interpolated value.
    pub fn advance(&mut self, dt: Duration) -> TweenStep {
        if self.completed {
            return TweenStep {
                value: self.to,
                finished: false,
            };
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        let progress = self.ratio();

        if progress >= 1.0 {
            self.completed = true;
            return TweenStep {
                value: self.to,
                finished: true,
            };
        }

        TweenStep {
            value: self.from.lerp(self.to, self.easing.apply(progress)),
            finished: false,
        }
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.completed {
            1.0
        } else if self.duration.is_zero() {
            0.0
        } else {
            self.ratio()
        }
    }

    fn ratio(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn start(&self) -> Point {
        self.from
    }

    pub fn target(&self) -> Point {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::EaseOutCubic,
        Easing::EaseInCubic,
        Easing::EaseInOutCubic,
        Easing::EaseOutQuad,
    ];

    //=====================================================================
    // Easing
    //=====================================================================

    #[test]
    fn easing_endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{:?}", easing);
            assert_eq!(easing.apply(1.0), 1.0, "{:?}", easing);
        }
    }

    #[test]
    fn easing_is_monotonic() {
        for easing in ALL {
            let mut last = 0.0;
            for i in 1..=100 {
                let v = easing.apply(f64::from(i) / 100.0);
                assert!(v >= last, "{:?} decreased at step {}", easing, i);
                last = v;
            }
        }
    }

    #[test]
    fn ease_out_cubic_front_loads_motion() {
        assert_abs_diff_eq!(Easing::EaseOutCubic.apply(0.5), 0.875, epsilon = 1e-12);
    }

    //=====================================================================
    // Tween
    //=====================================================================

    #[test]
    fn finishes_exactly_once_at_target() {
        let from = Point::new(-800.0, 0.0);
        let to = Point::new(0.0, 0.0);
        let mut tween = Tween::new(from, to, Duration::from_millis(100), Easing::EaseOutCubic);

        let mut finished = 0;
        let mut last = from;
        for _ in 0..20 {
            let step = tween.advance(Duration::from_millis(16));
            if step.finished {
                finished += 1;
            }
            last = step.value;
        }

        assert_eq!(finished, 1);
        assert_eq!(last, to);
        assert!(tween.is_complete());
    }

    #[test]
    fn intermediate_values_move_toward_target() {
        let mut tween = Tween::new(
            Point::ZERO,
            Point::new(10.0, 0.0),
            Duration::from_millis(100),
            Easing::Linear,
        );

        let step = tween.advance(Duration::from_millis(25));
        assert!(!step.finished);
        assert_abs_diff_eq!(step.value.x, 2.5, epsilon = 1e-9);
    }

    #[test]
    fn zero_duration_finishes_on_first_advance() {
        let mut tween = Tween::new(Point::ZERO, Point::new(1.0, 1.0), Duration::ZERO, Easing::Linear);
        assert_eq!(tween.progress(), 0.0);

        let step = tween.advance(Duration::ZERO);
        assert!(step.finished);
        assert_eq!(step.value, Point::new(1.0, 1.0));
    }

    #[test]
    fn deterministic_for_same_dt_sequence() {
        let run = || {
            let mut tween = Tween::new(
                Point::new(-5.0, 3.0),
                Point::new(7.0, -1.0),
                Duration::from_millis(500),
                Easing::EaseInOutCubic,
            );
            (0..40)
                .map(|_| tween.advance(Duration::from_micros(16_600)).value)
                .collect::<Vec<_>>()
        };

        assert_eq!(run(), run());
    }
}
