//! Critically-damped smoothing
//!
//! Every camera and indicator movement relaxes toward its goal through a damped
//! spring instead of snapping, so targets can jump without visible pops.

use glam::Vec3;

/// Smallest smooth time accepted; anything lower is clamped up to it
const MIN_SMOOTH_TIME: f32 = 0.0001;

/// Smooths a value to a goal using a critically-damped spring.
pub trait SmoothDamp: Sized {
    /// `smooth_time` is roughly the time needed to reach the goal.
    ///
    /// Returns the smoothed value and the new velocity. The result never
    /// overshoots the goal.
    fn smooth_damp(from: Self, to: Self, velocity: Self, smooth_time: f32, delta_time: f32)
        -> (Self, Self);
}

/// Spring coefficients from Game Programming Gems 4, chapter 1.10
fn spring(smooth_time: f32, delta_time: f32) -> (f32, f32) {
    let omega = 2.0 / smooth_time.max(MIN_SMOOTH_TIME);
    let x = omega * delta_time;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    (omega, exp)
}

impl SmoothDamp for f32 {
    fn smooth_damp(from: f32, to: f32, velocity: f32, smooth_time: f32, delta_time: f32) -> (f32, f32) {
        let (omega, exp) = spring(smooth_time, delta_time);

        let change = from - to;
        let temp = (velocity + omega * change) * delta_time;
        let mut output = to + (change + temp) * exp;
        let mut velocity = (velocity - omega * temp) * exp;

        // Overshoot
        if (to - from > 0.0) == (output > to) {
            output = to;
            velocity = 0.0;
        }

        (output, velocity)
    }
}

impl SmoothDamp for Vec3 {
    fn smooth_damp(from: Vec3, to: Vec3, velocity: Vec3, smooth_time: f32, delta_time: f32) -> (Vec3, Vec3) {
        let (omega, exp) = spring(smooth_time, delta_time);

        let change = from - to;
        let temp = (velocity + omega * change) * delta_time;
        let mut output = to + (change + temp) * exp;
        let mut velocity = (velocity - omega * temp) * exp;

        // Overshoot
        if (to - from).dot(output - to) > 0.0 {
            output = to;
            velocity = Vec3::ZERO;
        }

        (output, velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_converges() {
        let mut value = 0.0;
        let mut velocity = 0.0;
        for _ in 0..600 {
            (value, velocity) = f32::smooth_damp(value, 10.0, velocity, 0.4, 1.0 / 60.0);
            assert!(value <= 10.0);
        }
        assert!((value - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_vector_converges_without_overshoot() {
        let goal = Vec3::new(3.0, -2.0, 8.0);
        let mut value = Vec3::ZERO;
        let mut velocity = Vec3::ZERO;
        for _ in 0..600 {
            (value, velocity) = Vec3::smooth_damp(value, goal, velocity, 0.2, 1.0 / 60.0);
            assert!(goal.dot(value - goal) <= 1e-4);
        }
        assert!(value.distance(goal) < 1e-3);
    }

    #[test]
    fn test_zero_delta_time_holds_value() {
        let (value, _) = Vec3::smooth_damp(Vec3::ONE, Vec3::ZERO, Vec3::ZERO, 0.4, 0.0);
        assert_eq!(value, Vec3::ONE);
    }
}
