//! Camera attribute profiles
//!
//! Profiles are authored data shared by reference. Zones swap the active
//! profile while the player stands inside them and restore the default when
//! they leave; the camera never runs without a profile.

use std::sync::Arc;

use platformer_core::{Curve, LayerMask};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ConfigError;

/// Distance, height and mode-switch timing for the orbit camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraAttributes {
    /// Horizontal distance behind the follow target in automatic mode
    pub distance: f32,
    /// Height above the follow target in automatic mode
    pub distance_up: f32,
    /// Distance when the pitch slider is fully up
    pub manual_min_distance: f32,
    /// Height when the pitch slider is fully up
    pub manual_min_distance_up: f32,
    /// Distance when the pitch slider is fully down
    pub manual_max_distance: f32,
    /// Height when the pitch slider is fully down
    pub manual_max_distance_up: f32,
    /// Remaps the hybrid blend ratio (0 = manual, 1 = automatic)
    pub mode_interpolation: Curve,
    /// Time it takes to regain an automatic camera once hybrid starts
    pub auto_switch_time: f32,
    /// How long the camera stays manual after the last look input
    pub hybrid_delay_time: f32,
}

impl Default for CameraAttributes {
    fn default() -> Self {
        Self {
            distance: 5.0,
            distance_up: 2.25,
            manual_min_distance: 4.0,
            manual_min_distance_up: 0.0,
            manual_max_distance: 12.0,
            manual_max_distance_up: 10.0,
            mode_interpolation: Curve::Linear,
            auto_switch_time: 5.0,
            hybrid_delay_time: 2.0,
        }
    }
}

impl CameraAttributes {
    /// Parse and validate a profile authored as JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let attributes: Self = serde_json::from_str(json)?;
        attributes.validate()?;
        Ok(attributes)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            self.distance,
            self.distance_up,
            self.manual_min_distance,
            self.manual_min_distance_up,
            self.manual_max_distance,
            self.manual_max_distance_up,
            self.auto_switch_time,
            self.hybrid_delay_time,
        ];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(ConfigError::InvalidProfile("camera values must be finite".into()));
        }
        if self.auto_switch_time <= 0.0 {
            return Err(ConfigError::InvalidProfile("auto switch time must be positive".into()));
        }
        if self.hybrid_delay_time < 0.0 {
            return Err(ConfigError::InvalidProfile("hybrid delay must not be negative".into()));
        }
        self.mode_interpolation
            .validate()
            .map_err(|e| ConfigError::InvalidProfile(e.to_string()))
    }

    /// Manual orbit distance for a pitch slider value in [-1, 1]
    pub fn manual_distance(&self, pitch: f32) -> f32 {
        if pitch < 0.0 {
            platformer_core::lerp(self.manual_max_distance, self.distance, pitch + 1.0)
        } else {
            platformer_core::lerp(self.distance, self.manual_min_distance, pitch)
        }
    }

    /// Manual orbit height for a pitch slider value in [-1, 1]
    pub fn manual_distance_up(&self, pitch: f32) -> f32 {
        if pitch < 0.0 {
            platformer_core::lerp(self.manual_max_distance_up, self.distance_up, pitch + 1.0)
        } else {
            platformer_core::lerp(self.distance_up, self.manual_min_distance_up, pitch)
        }
    }
}

/// Geometry and camera targets for one terrain probe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Camera distance to relax toward when this probe decides
    pub distance: f32,
    /// Camera height to relax toward when this probe decides
    pub height: f32,
    /// Length of the probe ray
    pub max_cast_distance: f32,
    /// How far ahead of the follow target (along the camera heading) the probe starts
    pub cast_away_distance: f32,
}

/// Terrain sensing profile: how the camera reacts to cliffs and hills ahead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightAttributes {
    /// Layers the probes can hit
    pub mask: LayerMask,
    /// Short downward probe close to the player
    pub cliff: ProbeSettings,
    /// Long probe started high above the ground further ahead
    pub hill: ProbeSettings,
}

impl Default for HeightAttributes {
    fn default() -> Self {
        Self {
            mask: LayerMask::DEFAULT_SOLID,
            cliff: ProbeSettings {
                distance: 4.0,
                height: 12.0,
                max_cast_distance: 20.0,
                cast_away_distance: 5.0,
            },
            hill: ProbeSettings {
                distance: 170.0,
                height: 10.0,
                max_cast_distance: 100.0,
                cast_away_distance: 8.0,
            },
        }
    }
}

impl HeightAttributes {
    /// Parse and validate a profile authored as JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let attributes: Self = serde_json::from_str(json)?;
        attributes.validate()?;
        Ok(attributes)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, probe) in [("cliff", &self.cliff), ("hill", &self.hill)] {
            let values = [probe.distance, probe.height, probe.max_cast_distance, probe.cast_away_distance];
            if values.iter().any(|value| !value.is_finite()) {
                return Err(ConfigError::InvalidProfile(format!("{name} probe values must be finite")));
            }
            if probe.max_cast_distance < 0.0 {
                return Err(ConfigError::InvalidProfile(format!(
                    "{name} probe cast distance must not be negative"
                )));
            }
        }
        Ok(())
    }
}

/// Active profile reference with a guaranteed default to fall back on
#[derive(Debug, Clone)]
pub struct ProfileSlot<T> {
    default: Arc<T>,
    active: Arc<T>,
}

impl<T> ProfileSlot<T> {
    pub fn new(default: Arc<T>) -> Self {
        Self {
            active: Arc::clone(&default),
            default,
        }
    }

    /// The profile currently in effect
    pub fn get(&self) -> &T {
        &self.active
    }

    /// Shared handle to the profile currently in effect
    pub fn active(&self) -> &Arc<T> {
        &self.active
    }

    /// Swap in a profile; an absent profile falls back to the default
    pub fn set(&mut self, profile: Option<Arc<T>>) {
        match profile {
            Some(profile) => {
                debug!("Attribute profile swapped");
                self.active = profile;
            }
            None => {
                warn!("Missing attribute profile, falling back to the default");
                self.reset();
            }
        }
    }

    /// Restore the default profile
    pub fn reset(&mut self) {
        self.active = Arc::clone(&self.default);
    }

    pub fn is_default(&self) -> bool {
        Arc::ptr_eq(&self.active, &self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_distance_continuous_at_zero() {
        let attrs = CameraAttributes::default();
        assert_eq!(attrs.manual_distance(0.0), attrs.distance);
        assert_eq!(attrs.manual_distance_up(0.0), attrs.distance_up);

        let eps = 1e-4;
        assert!((attrs.manual_distance(-eps) - attrs.distance).abs() < 1e-2);
        assert!((attrs.manual_distance(eps) - attrs.distance).abs() < 1e-2);
        assert!((attrs.manual_distance_up(-eps) - attrs.distance_up).abs() < 1e-2);
        assert!((attrs.manual_distance_up(eps) - attrs.distance_up).abs() < 1e-2);
    }

    #[test]
    fn test_manual_distance_extremes() {
        let attrs = CameraAttributes::default();
        assert_eq!(attrs.manual_distance(1.0), attrs.manual_min_distance);
        assert_eq!(attrs.manual_distance(-1.0), attrs.manual_max_distance);
        assert_eq!(attrs.manual_distance_up(1.0), attrs.manual_min_distance_up);
        assert_eq!(attrs.manual_distance_up(-1.0), attrs.manual_max_distance_up);
    }

    #[test]
    fn test_profile_from_json() {
        let attrs = CameraAttributes::from_json(r#"{"distance": 7.5, "hybrid_delay_time": 1.0}"#).unwrap();
        assert_eq!(attrs.distance, 7.5);
        assert_eq!(attrs.hybrid_delay_time, 1.0);
        assert_eq!(attrs.distance_up, 2.25);

        let err = CameraAttributes::from_json(r#"{"auto_switch_time": -1.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProfile(_)));
        let err = CameraAttributes::from_json(r#"{"auto_switch_time": 0.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProfile(_)));
        assert!(CameraAttributes::from_json(r#"{"hybrid_delay_time": 0.0}"#).is_ok());
        assert!(matches!(CameraAttributes::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_height_profile_from_json() {
        let json = r#"{"cliff": {"distance": 3.0, "height": 8.0, "max_cast_distance": 15.0, "cast_away_distance": 4.0}}"#;
        let attrs = HeightAttributes::from_json(json).unwrap();
        assert_eq!(attrs.cliff.height, 8.0);
        assert_eq!(attrs.hill, HeightAttributes::default().hill);
    }

    #[test]
    fn test_profile_slot_fallback() {
        let mut slot = ProfileSlot::new(Arc::new(CameraAttributes::default()));
        assert!(slot.is_default());

        let zone_profile = Arc::new(CameraAttributes {
            distance: 9.0,
            ..Default::default()
        });
        slot.set(Some(Arc::clone(&zone_profile)));
        assert_eq!(slot.get().distance, 9.0);
        assert!(!slot.is_default());

        slot.set(None);
        assert!(slot.is_default());
        assert_eq!(slot.get().distance, 5.0);
    }
}
