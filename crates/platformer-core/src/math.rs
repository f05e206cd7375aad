//! Scalar and vector helpers used by the controllers

use glam::Vec3;

/// Spans shorter than this are treated as degenerate
pub const SPAN_EPSILON: f32 = 1e-5;

/// Clamp a value into [0, 1]
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Linear interpolation with `t` clamped into [0, 1]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * clamp01(t)
}

/// Wrap into [0, 1).
///
/// `rem_euclid` rounds tiny negative inputs up to exactly 1.0, which is folded
/// back to 0.0 here.
pub fn wrap01(value: f32) -> f32 {
    let wrapped = value.rem_euclid(1.0);
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Drop the vertical component and normalize, or zero for a vertical vector
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z).normalize_or_zero()
}

/// Heading of a direction around the world up axis, in radians.
///
/// Zero faces negative Z, matching `Transform::forward`.
pub fn yaw_from_direction(direction: Vec3) -> f32 {
    if direction.x.abs() < f32::EPSILON && direction.z.abs() < f32::EPSILON {
        return 0.0;
    }
    (-direction.x).atan2(-direction.z)
}

/// `(value - min) / span`, or `fallback` when the span is degenerate
pub fn normalized_span(value: f32, min: f32, span: f32, fallback: f32) -> f32 {
    if span.abs() < SPAN_EPSILON || !span.is_finite() {
        return fallback;
    }
    (value - min) / span
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_clamps() {
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
        assert_eq!(lerp(2.0, 4.0, -1.0), 2.0);
        assert_eq!(lerp(2.0, 4.0, 3.0), 4.0);
    }

    #[test]
    fn test_wrap01_stays_below_one() {
        assert_eq!(wrap01(1.25), 0.25);
        assert_eq!(wrap01(-0.25), 0.75);
        assert_eq!((-1e-9f32).rem_euclid(1.0), 1.0);
        assert_eq!(wrap01(-1e-9), 0.0);
        assert_eq!(wrap01(1.0), 0.0);
    }

    #[test]
    fn test_flatten() {
        let flat = flatten(Vec3::new(3.0, 7.0, 4.0));
        assert_eq!(flat.y, 0.0);
        assert!((flat.length() - 1.0).abs() < 1e-5);
        assert_eq!(flatten(Vec3::Y), Vec3::ZERO);
    }

    #[test]
    fn test_normalized_span_degenerate() {
        assert_eq!(normalized_span(5.0, 1.0, 0.0, 1.0), 1.0);
        assert_eq!(normalized_span(5.0, 1.0, 2.0, 1.0), 2.0);
    }

    #[test]
    fn test_yaw_from_direction() {
        assert!(yaw_from_direction(-Vec3::Z).abs() < 1e-6);
        assert!((yaw_from_direction(-Vec3::X) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(yaw_from_direction(Vec3::Y), 0.0);
    }
}
