//! Core types shared by the camera and locomotion controllers

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for scene objects (zones, points of interest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an entity ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Bit mask selecting which collision layers a query can hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    pub const NONE: LayerMask = LayerMask(0);
    /// Layers 0 to 7 except the character layer
    pub const DEFAULT_SOLID: LayerMask = LayerMask(251);
    /// Layer the player capsule sits on, skipped by [`LayerMask::DEFAULT_SOLID`]
    pub const CHARACTER_LAYER: u8 = 2;

    /// Build a mask from a list of layer indices
    pub fn from_layers(layers: &[u8]) -> Self {
        Self(layers.iter().fold(0, |mask, layer| mask | Self::bit(*layer)))
    }

    /// Check whether a layer index is selected
    pub fn contains(&self, layer: u8) -> bool {
        self.0 & Self::bit(layer) != 0
    }

    fn bit(layer: u8) -> u32 {
        1u32.checked_shl(layer as u32).unwrap_or(0)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::DEFAULT_SOLID
    }
}

/// Transform component representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Get the forward direction (negative Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X in local space)
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction (positive Y in local space)
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Heading around the world up axis, in degrees within [0, 360)
    pub fn yaw_degrees(&self) -> f32 {
        crate::math::yaw_from_direction(self.forward())
            .to_degrees()
            .rem_euclid(360.0)
    }

    /// Resolve a transform expressed relative to this one into world space
    pub fn child(&self, local: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (local.position * self.scale),
            rotation: self.rotation * local.rotation,
            scale: self.scale * local.scale,
        }
    }

    /// Orient the transform so its forward axis points at `target`
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        if forward == Vec3::ZERO {
            return;
        }
        let mut right = forward.cross(up);
        if right.length_squared() < 1e-8 {
            right = forward.any_orthonormal_vector();
        }
        let right = right.normalize();
        let up = right.cross(forward);

        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize();
    }

    /// Rotate the transform around a world-space pivot and axis
    pub fn rotate_around(&mut self, point: Vec3, axis: Vec3, degrees: f32) {
        let Some(axis) = axis.try_normalize() else {
            return;
        };
        let rotation = Quat::from_axis_angle(axis, degrees.to_radians());
        self.position = point + rotation * (self.position - point);
        self.rotation = (rotation * self.rotation).normalize();
    }

    /// Interpolate between two transforms
    pub fn lerp(a: &Transform, b: &Transform, t: f32) -> Transform {
        Transform {
            position: a.position.lerp(b.position, t),
            rotation: a.rotation.slerp(b.rotation, t),
            scale: a.scale.lerp(b.scale, t),
        }
    }
}
