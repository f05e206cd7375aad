//! Controller tuning with persistence
//!
//! Settings are saved to `~/.config/platformer/settings.toml`

use std::fs;
use std::path::PathBuf;

use platformer_game::{CameraSettings, MotionIndicatorConfig, MovementConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All tunables the demo reads at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub camera: CameraSettings,
    pub movement: MovementConfig,
    pub motion_indicator: MotionIndicatorConfig,
}

impl GameSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("platformer"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found or invalid
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::parse(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {:#}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Parse and validate settings from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.movement.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings = GameSettings::parse(
            r#"
            [camera]
            dead_zone = 0.2

            [movement]
            gravity = 12.0
            "#,
        )
        .unwrap();
        assert_eq!(settings.camera.dead_zone, 0.2);
        assert_eq!(settings.camera.position_smoothing_time, 0.4);
        assert_eq!(settings.movement.gravity, 12.0);
        assert_eq!(settings.movement.speed_multiplier, 12.0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(GameSettings::parse("[movement]\nstandard_lag_coeff = 3.0").is_err());
        assert!(GameSettings::parse("[camera").is_err());
    }

    #[test]
    fn test_settings_round_trip_through_toml() {
        let settings = GameSettings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed = GameSettings::parse(&text).unwrap();
        assert_eq!(parsed.movement, settings.movement);
    }
}
