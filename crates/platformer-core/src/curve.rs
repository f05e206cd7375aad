//! Tunable response curves
//!
//! Designers shape jump force, jump extension, mode blending and zone
//! transitions with curves over the normalized domain [0, 1].

use serde::{Deserialize, Serialize};

/// A single keyframe of a curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

impl CurveKey {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Errors raised when building a curve from authored keys
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("a curve needs at least one key")]
    Empty,

    #[error("key {0} is not after the previous key")]
    NotIncreasing(usize),

    #[error("key {0} is not a finite number")]
    NonFinite(usize),
}

/// Response curve evaluated over [0, 1]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Curve {
    /// `f(t) = t`
    #[default]
    Linear,
    /// Accelerating ease, `f(t) = t²`
    EaseIn,
    /// Smoothstep, flat at both ends
    EaseInOut,
    /// Same value everywhere
    Constant(f32),
    /// Piecewise-linear keyframes, held flat outside the first and last key
    Keys(Vec<CurveKey>),
}

impl Curve {
    /// Build a keyframed curve, validating the keys
    pub fn from_keys(keys: Vec<CurveKey>) -> Result<Self, CurveError> {
        if keys.is_empty() {
            return Err(CurveError::Empty);
        }
        for (index, key) in keys.iter().enumerate() {
            if !key.time.is_finite() || !key.value.is_finite() {
                return Err(CurveError::NonFinite(index));
            }
            if index > 0 && key.time <= keys[index - 1].time {
                return Err(CurveError::NotIncreasing(index));
            }
        }
        Ok(Curve::Keys(keys))
    }

    /// Check authored data after deserialization
    pub fn validate(&self) -> Result<(), CurveError> {
        match self {
            Curve::Keys(keys) => Curve::from_keys(keys.clone()).map(|_| ()),
            Curve::Constant(value) if !value.is_finite() => Err(CurveError::NonFinite(0)),
            _ => Ok(()),
        }
    }

    /// Sample the curve; the shaped variants clamp `t` into [0, 1]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t };
        match self {
            Curve::Linear => t.clamp(0.0, 1.0),
            Curve::EaseIn => {
                let t = t.clamp(0.0, 1.0);
                t * t
            }
            Curve::EaseInOut => {
                let t = t.clamp(0.0, 1.0);
                t * t * (3.0 - 2.0 * t)
            }
            Curve::Constant(value) => *value,
            Curve::Keys(keys) => Self::sample_keys(keys, t),
        }
    }

    fn sample_keys(keys: &[CurveKey], t: f32) -> f32 {
        let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
            return 0.0;
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        keys.windows(2)
            .find(|pair| t <= pair[1].time)
            .map(|pair| {
                let (a, b) = (pair[0], pair[1]);
                let span = b.time - a.time;
                a.value + (b.value - a.value) * ((t - a.time) / span)
            })
            .unwrap_or(last.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_clamps() {
        let curve = Curve::Linear;
        assert_eq!(curve.evaluate(-0.5), 0.0);
        assert_eq!(curve.evaluate(0.25), 0.25);
        assert_eq!(curve.evaluate(4.0), 1.0);
        assert_eq!(Curve::default(), Curve::Linear);
    }

    #[test]
    fn test_ease_in_out_endpoints() {
        let curve = Curve::EaseInOut;
        assert_eq!(curve.evaluate(0.0), 0.0);
        assert_eq!(curve.evaluate(0.5), 0.5);
        assert_eq!(curve.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_keys_interpolate() {
        let curve = Curve::from_keys(vec![
            CurveKey::new(0.0, 0.6),
            CurveKey::new(0.5, 0.8),
            CurveKey::new(1.0, 1.0),
        ])
        .unwrap();
        assert!((curve.evaluate(0.25) - 0.7).abs() < 1e-6);
        assert!((curve.evaluate(0.75) - 0.9).abs() < 1e-6);
        assert_eq!(curve.evaluate(-1.0), 0.6);
        assert_eq!(curve.evaluate(2.0), 1.0);
    }

    #[test]
    fn test_invalid_keys() {
        assert_eq!(Curve::from_keys(vec![]), Err(CurveError::Empty));
        assert_eq!(
            Curve::from_keys(vec![CurveKey::new(0.5, 0.0), CurveKey::new(0.5, 1.0)]),
            Err(CurveError::NotIncreasing(1))
        );
        assert_eq!(
            Curve::from_keys(vec![CurveKey::new(0.0, f32::NAN)]),
            Err(CurveError::NonFinite(0))
        );
    }

    #[test]
    fn test_curve_from_json() {
        let curve: Curve =
            serde_json::from_str(r#"{"Keys":[{"time":0.0,"value":1.0},{"time":1.0,"value":0.0}]}"#)
                .unwrap();
        assert!(curve.validate().is_ok());
        assert_eq!(curve.evaluate(0.5), 0.5);
    }
}
