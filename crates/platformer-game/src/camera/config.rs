//! Camera configuration

use platformer_core::LayerMask;
use serde::{Deserialize, Serialize};

/// Camera tuning that does not change with zones
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Time to settle the camera position (seconds)
    pub position_smoothing_time: f32,
    /// Time to settle the look-at point (seconds)
    pub look_at_smoothing_time: f32,
    /// Time to settle the orbit position in manual and hybrid modes (seconds)
    pub manual_smoothing_time: f32,
    /// Time for the terrain sensor's bump height and distance to settle (seconds)
    pub sensor_smoothing_time: f32,
    /// Pushes the camera away from colliding geometry along the hit normal
    pub collision_distance_multiplier: f32,
    /// Look input below this magnitude is ignored
    pub dead_zone: f32,
    /// Layers that block the camera
    pub solid_mask: LayerMask,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position_smoothing_time: 0.4,
            look_at_smoothing_time: 0.2,
            manual_smoothing_time: 0.1,
            sensor_smoothing_time: 0.4,
            collision_distance_multiplier: 0.35,
            dead_zone: 0.1,
            solid_mask: LayerMask::DEFAULT_SOLID,
        }
    }
}
