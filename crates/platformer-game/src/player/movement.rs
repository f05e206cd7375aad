//! Movement configuration and constants

use platformer_core::{clamp01, normalized_span, Curve, CurveKey};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Movement configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Weight of the raw stick input in the per-frame low-pass (0..1)
    pub standard_lag_coeff: f32,
    /// Ground speed at full stick deflection (meters per second)
    pub speed_multiplier: f32,
    /// Constant downward acceleration
    pub gravity: f32,
    /// Share of the pre-jump momentum kept while airborne
    pub air_inertia: f32,
    /// Per-frame decay of the pre-jump momentum
    pub aerodynamic: f32,
    /// Extra per-frame decay after a double jump
    pub air_inertia_decreaser: f32,
    /// Stick authority while airborne
    pub air_control: f32,
    /// Stick authority after a double jump
    pub air_control_double_jump: f32,
    /// Ground jump impulse at full charge
    pub ground_jump_force: f32,
    /// Fixed double jump impulse
    pub air_jump_force: f32,
    /// Ground jump impulse multiplier over the normalized hold time
    pub jump_force_curve: Curve,
    /// Longest hold that still counts as a tap (seconds)
    pub jump_max_time: f32,
    /// Jump extension multiplier over the normalized extension window
    pub jump_expand_curve: Curve,
    /// Window after the tap window in which holding jump extends it (seconds)
    pub jump_max_expand_time: f32,
    /// Grace period after losing ground contact (seconds)
    pub grounded_delay: f32,
    /// Speeds below this snap to zero
    pub speed_dead_zone: f32,
    /// Squared stick magnitude above which the character turns to face its motion
    pub facing_threshold: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            standard_lag_coeff: 0.2,
            speed_multiplier: 12.0,
            gravity: 9.8,
            air_inertia: 1.0,
            aerodynamic: 0.99,
            air_inertia_decreaser: 0.95,
            air_control: 1.0,
            air_control_double_jump: 1.0,
            ground_jump_force: 5.0,
            air_jump_force: 3.0,
            jump_force_curve: Curve::Keys(vec![CurveKey::new(0.0, 0.6), CurveKey::new(1.0, 1.0)]),
            jump_max_time: 10.0 / 60.0,
            jump_expand_curve: Curve::Keys(vec![CurveKey::new(0.0, 1.0), CurveKey::new(1.0, 0.0)]),
            jump_max_expand_time: 20.0 / 60.0,
            grounded_delay: 0.1,
            speed_dead_zone: 0.1,
            facing_threshold: 0.1,
        }
    }
}

impl MovementConfig {
    /// Parse and validate a configuration authored as JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.standard_lag_coeff) {
            return Err(ConfigError::InvalidProfile(
                "input lag coefficient must be within [0, 1]".into(),
            ));
        }
        if self.jump_max_time < 0.0 || self.jump_max_expand_time < 0.0 || self.grounded_delay < 0.0 {
            return Err(ConfigError::InvalidProfile("jump timings must not be negative".into()));
        }
        for curve in [&self.jump_force_curve, &self.jump_expand_curve] {
            curve
                .validate()
                .map_err(|e| ConfigError::InvalidProfile(e.to_string()))?;
        }
        Ok(())
    }

    /// Ground jump impulse after holding the button for `held` seconds.
    ///
    /// Grows with the hold time up to the tap window, then stays capped.
    pub fn jump_impulse(&self, held: f32) -> f32 {
        let charge = clamp01(normalized_span(held, 0.0, self.jump_max_time, 1.0));
        self.ground_jump_force * self.jump_force_curve.evaluate(charge)
    }

    /// Extension multiplier `since_window` seconds after the tap window closed
    pub fn jump_extension(&self, since_window: f32) -> f32 {
        let t = clamp01(normalized_span(since_window, 0.0, self.jump_max_expand_time, 1.0));
        self.jump_expand_curve.evaluate(t)
    }
}
