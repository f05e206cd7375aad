//! Frame clock for the controllers
//!
//! Each rendered frame runs one simulate tick and one present tick against the
//! same `GameTime` snapshot: `now()` for timestamps, `delta_time` for
//! integration and smoothing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Simulation seconds per real second
    pub time_scale: f32,
    /// Upper bound on a single frame's delta, so a hitch cannot launch the character
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_delta_time: 0.25,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameTime {
    pub config: TimeConfig,
    /// Accumulated scaled time
    pub total_time: f64,
    pub delta_time: f32,
    /// Clamped but not scaled
    pub unscaled_delta_time: f32,
    pub frame_count: u64,
    pub paused: bool,
}

impl GameTime {
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Start a frame that took `raw_delta` real seconds
    pub fn update(&mut self, raw_delta: f32) {
        self.frame_count += 1;
        self.unscaled_delta_time = raw_delta.clamp(0.0, self.config.max_delta_time);
        self.delta_time = if self.paused {
            0.0
        } else {
            self.unscaled_delta_time * self.config.time_scale
        };
        self.total_time += f64::from(self.delta_time);
    }

    /// Timestamp the controllers compare against
    pub fn now(&self) -> f32 {
        self.total_time as f32
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Negative scales are treated as 0
    pub fn set_time_scale(&mut self, scale: f32) {
        self.config.time_scale = scale.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_time() {
        let mut time = GameTime::default();
        time.update(0.016);

        assert!(time.delta_time > 0.0);
        assert_eq!(time.frame_count, 1);

        time.pause();
        time.update(0.016);
        assert_eq!(time.delta_time, 0.0);

        time.resume();
        time.update(0.016);
        assert!((time.now() - 0.032).abs() < 1e-6);
    }

    #[test]
    fn test_delta_clamped() {
        let mut time = GameTime::default();
        time.update(3.0);
        assert_eq!(time.delta_time, 0.25);

        time.set_time_scale(2.0);
        time.update(0.1);
        assert!((time.delta_time - 0.2).abs() < 1e-6);
    }
}
