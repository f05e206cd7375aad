//! Motion indicator
//!
//! A marker that leads the character in the direction of travel, further the
//! faster it moves. It is cosmetic: it eases back onto the character whenever
//! something solid sits between the two.

use glam::{Quat, Vec3};
use platformer_core::{LayerMask, SmoothDamp};
use platformer_physics::Raycaster;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionIndicatorConfig {
    /// Settle time when pulling back behind an obstacle (seconds)
    pub blocked_smoothing_time: f32,
    /// Settle time when leading the character (seconds)
    pub free_smoothing_time: f32,
    /// Layers that block the line of sight to the marker
    pub mask: LayerMask,
}

impl Default for MotionIndicatorConfig {
    fn default() -> Self {
        Self {
            blocked_smoothing_time: 0.2,
            free_smoothing_time: 4.0,
            mask: LayerMask::DEFAULT_SOLID,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MotionIndicator {
    pub config: MotionIndicatorConfig,
    /// Offset at full speed, in the character's local frame
    rest_offset: Vec3,
    offset: Vec3,
    velocity: Vec3,
}

impl MotionIndicator {
    /// Marker authored at `rest_offset` from the character
    pub fn new(rest_offset: Vec3) -> Self {
        Self::with_config(rest_offset, MotionIndicatorConfig::default())
    }

    pub fn with_config(rest_offset: Vec3, config: MotionIndicatorConfig) -> Self {
        Self {
            config,
            rest_offset,
            offset: rest_offset,
            velocity: Vec3::ZERO,
        }
    }

    pub fn rest_offset(&self) -> Vec3 {
        self.rest_offset
    }

    /// Current offset in the character's local frame
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn world_position(&self, character: Vec3, rotation: Quat) -> Vec3 {
        character + rotation * self.offset
    }

    /// Ease the marker for this frame; `speed` is the normalized move speed
    pub fn update(&mut self, character: Vec3, rotation: Quat, speed: f32, world: &impl Raycaster, dt: f32) {
        let marker = self.world_position(character, rotation);
        let (target, smoothing_time) = if world.linecast(character, marker, self.config.mask).is_some() {
            (Vec3::ZERO, self.config.blocked_smoothing_time)
        } else {
            (self.rest_offset * speed, self.config.free_smoothing_time)
        };

        (self.offset, self.velocity) = Vec3::smooth_damp(self.offset, target, self.velocity, smoothing_time, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platformer_physics::{CharacterController, EmptyWorld, PhysicsWorld, RaycastHit};

    fn blocked(origin: Vec3, direction: Vec3, _: f32, _: LayerMask) -> Option<RaycastHit> {
        Some(RaycastHit::new(origin + direction * 0.1, -direction, 0.1))
    }

    #[test]
    fn test_blocked_marker_pulls_back_quickly() {
        let mut indicator = MotionIndicator::new(Vec3::new(0.0, 1.0, -3.0));
        for _ in 0..60 {
            indicator.update(Vec3::ZERO, Quat::IDENTITY, 1.0, &blocked, 1.0 / 60.0);
        }
        assert!(indicator.offset().length() < 0.05);
    }

    #[test]
    fn test_free_marker_leads_slowly() {
        let mut indicator = MotionIndicator::new(Vec3::new(0.0, 1.0, -3.0));
        indicator.update(Vec3::ZERO, Quat::IDENTITY, 0.0, &EmptyWorld, 1.0 / 60.0);
        let after_one = indicator.offset();
        assert!(after_one.length() < indicator.rest_offset().length());
        assert!(after_one.length() > 0.9 * indicator.rest_offset().length());

        for _ in 0..(60 * 30) {
            indicator.update(Vec3::ZERO, Quat::IDENTITY, 0.5, &EmptyWorld, 1.0 / 60.0);
        }
        assert!(indicator.offset().distance(indicator.rest_offset() * 0.5) < 1e-2);
    }

    #[test]
    fn test_own_capsule_does_not_block_marker() {
        let mut physics = PhysicsWorld::new();
        physics.create_ground(0.0);
        let mut character = CharacterController::new();
        character.spawn(&mut physics, Vec3::new(0.0, 0.05, 0.0)).unwrap();
        physics.refresh_queries();

        let rest = Vec3::new(0.0, 1.0, -3.0);
        let mut indicator = MotionIndicator::new(rest);
        for _ in 0..60 {
            indicator.update(character.position, Quat::IDENTITY, 1.0, &physics, 1.0 / 60.0);
        }
        assert!(indicator.offset().distance(rest) < 1e-3);
    }
}
