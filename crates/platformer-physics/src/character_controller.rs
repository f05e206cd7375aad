//! Capsule character on top of rapier's kinematic character controller
//!
//! The capsule lives on a rigid body so it can be handed over to the physics
//! simulation (frozen) and back to the controller.

use glam::Vec3;
use platformer_core::LayerMask;
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;
use tracing::debug;

use crate::motor::{CharacterMotor, KinematicBody};
use crate::{layer_groups, PhysicsError, PhysicsWorld};

/// Capsule dimensions and how the controller treats slopes and steps
#[derive(Debug, Clone)]
pub struct CharacterControllerConfig {
    /// Full capsule height, feet to crown
    pub height: f32,
    pub radius: f32,
    /// Steepest walkable slope, in degrees
    pub max_slope_angle: f32,
    /// Tallest ledge climbed without jumping
    pub step_height: f32,
    /// Gap kept between the capsule and whatever it touches
    pub skin_width: f32,
    /// Keep contact when walking down slopes, up to this distance (None disables)
    pub ground_snap: Option<f32>,
    /// Eye height below the crown
    pub eye_inset: f32,
    /// Collision layer of the capsule; keep it outside the camera's solid mask
    pub layer: u8,
}

impl Default for CharacterControllerConfig {
    fn default() -> Self {
        Self {
            height: 1.8,
            radius: 0.4,
            max_slope_angle: 45.0,
            step_height: 0.25,
            skin_width: 0.02,
            ground_snap: Some(0.2),
            eye_inset: 0.1,
            layer: LayerMask::CHARACTER_LAYER,
        }
    }
}

impl CharacterControllerConfig {
    fn kinematic_controller(&self) -> KinematicCharacterController {
        let slope = self.max_slope_angle.to_radians();
        KinematicCharacterController {
            offset: CharacterLength::Absolute(self.skin_width),
            max_slope_climb_angle: slope,
            min_slope_slide_angle: slope,
            autostep: Some(CharacterAutostep {
                max_height: CharacterLength::Absolute(self.step_height),
                min_width: CharacterLength::Relative(0.5),
                include_dynamic_bodies: true,
            }),
            snap_to_ground: self.ground_snap.map(CharacterLength::Absolute),
            ..KinematicCharacterController::default()
        }
    }
}

/// Player capsule; `position` is the feet
pub struct CharacterController {
    pub config: CharacterControllerConfig,
    pub position: Vec3,
    /// Contact reported by the last controller-driven move
    pub grounded: bool,
    handles: Option<(RigidBodyHandle, ColliderHandle)>,
    controller_driven: bool,
    kinematic: KinematicCharacterController,
}

impl CharacterController {
    pub fn new() -> Self {
        Self::with_config(CharacterControllerConfig::default())
    }

    pub fn with_config(config: CharacterControllerConfig) -> Self {
        let kinematic = config.kinematic_controller();
        Self {
            config,
            position: Vec3::ZERO,
            grounded: false,
            handles: None,
            controller_driven: true,
            kinematic,
        }
    }

    /// Insert the capsule with its feet at `position`
    pub fn spawn(&mut self, physics: &mut PhysicsWorld, position: Vec3) -> Result<RigidBodyHandle, PhysicsError> {
        let groups = layer_groups(self.config.layer)?;
        self.position = position;
        self.controller_driven = true;

        let center = self.center_position();
        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(vector![center.x, center.y, center.z])
            .lock_rotations()
            .build();
        let half_segment = (self.config.height / 2.0 - self.config.radius).max(0.01);
        let collider = ColliderBuilder::capsule_y(half_segment, self.config.radius)
            .friction(0.0)
            .restitution(0.0)
            .collision_groups(groups)
            .build();

        let handles = physics.add_body(body, collider);
        self.handles = Some(handles);
        debug!("Spawned character on layer {}", self.config.layer);
        Ok(handles.0)
    }

    /// Pair the controller with the world it lives in for one tick
    pub fn bind<'a>(&'a mut self, physics: &'a mut PhysicsWorld) -> Result<BoundCharacter<'a>, PhysicsError> {
        if self.handles.is_none() {
            return Err(PhysicsError::NotSpawned);
        }
        Ok(BoundCharacter {
            character: self,
            physics,
        })
    }

    /// Slide the capsule along `desired` with collision resolution.
    ///
    /// While the simulation owns the body this only reads the body back.
    pub fn move_character(&mut self, physics: &mut PhysicsWorld, desired: Vec3, dt: f32) {
        if !self.controller_driven {
            self.sync_from_body(physics);
            return;
        }
        let Some((body_handle, collider_handle)) = self.handles else {
            return;
        };
        let Some(collider) = physics.collider_set.get(collider_handle) else {
            return;
        };

        let center = self.center_position();
        let corrected = self.kinematic.move_shape(
            dt,
            &physics.rigid_body_set,
            &physics.collider_set,
            &physics.query_pipeline,
            collider.shape(),
            &Isometry::translation(center.x, center.y, center.z),
            vector![desired.x, desired.y, desired.z],
            QueryFilter::default().exclude_rigid_body(body_handle),
            |_| {},
        );

        self.grounded = corrected.grounded;
        self.position += Vec3::new(corrected.translation.x, corrected.translation.y, corrected.translation.z);

        let center = self.center_position();
        if let Some(body) = physics.rigid_body_set.get_mut(body_handle) {
            body.set_next_kinematic_translation(vector![center.x, center.y, center.z]);
        }
    }

    fn sync_from_body(&mut self, physics: &PhysicsWorld) {
        let Some(body) = self.handles.and_then(|(handle, _)| physics.get_rigid_body(handle)) else {
            return;
        };
        let center = body.translation();
        self.position = Vec3::new(center.x, center.y, center.z) - self.half_height();
        self.grounded = false;
    }

    /// Hand the body to the simulation (`false`) or back to the controller (`true`)
    pub fn set_controller_driven(&mut self, physics: &mut PhysicsWorld, driven: bool) {
        let Some(body) = self.handles.and_then(|(handle, _)| physics.get_rigid_body_mut(handle)) else {
            return;
        };
        let body_type = if driven {
            RigidBodyType::KinematicPositionBased
        } else {
            RigidBodyType::Dynamic
        };
        body.set_body_type(body_type, true);
        self.controller_driven = driven;
        debug!("Character body is now {:?}", body_type);
    }

    pub fn is_controller_driven(&self) -> bool {
        self.controller_driven
    }

    pub fn center_position(&self) -> Vec3 {
        self.position + self.half_height()
    }

    /// Eye point relative to the feet, for anchoring a first-person camera
    pub fn eye_offset(&self) -> Vec3 {
        Vec3::Y * (self.config.height - self.config.eye_inset)
    }

    pub fn head_position(&self) -> Vec3 {
        self.position + self.eye_offset()
    }

    fn half_height(&self) -> Vec3 {
        Vec3::Y * (self.config.height / 2.0)
    }
}

impl Default for CharacterController {
    fn default() -> Self {
        Self::new()
    }
}

/// A character paired with its physics world, implementing the motion contracts
pub struct BoundCharacter<'a> {
    character: &'a mut CharacterController,
    physics: &'a mut PhysicsWorld,
}

impl CharacterMotor for BoundCharacter<'_> {
    fn move_by(&mut self, displacement: Vec3, dt: f32) {
        self.character.move_character(self.physics, displacement, dt);
    }

    fn is_grounded(&self) -> bool {
        self.character.grounded
    }

    fn position(&self) -> Vec3 {
        self.character.position
    }
}

impl KinematicBody for BoundCharacter<'_> {
    fn is_kinematic(&self) -> bool {
        self.character.is_controller_driven()
    }

    fn set_kinematic(&mut self, kinematic: bool) {
        self.character.set_controller_driven(self.physics, kinematic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Raycaster;

    #[test]
    fn test_character_controller_config() {
        let config = CharacterControllerConfig::default();
        assert_eq!(config.height, 1.8);
        assert_eq!(config.radius, 0.4);
        assert_eq!(config.max_slope_angle, 45.0);
    }

    #[test]
    fn test_head_position() {
        let controller = CharacterController::new();
        let head = controller.head_position();
        assert!(head.y > 0.0);
        assert!(head.y < controller.config.height);
    }

    #[test]
    fn test_bind_requires_spawn() {
        let mut physics = PhysicsWorld::new();
        let mut controller = CharacterController::new();
        assert!(matches!(controller.bind(&mut physics), Err(PhysicsError::NotSpawned)));

        controller.spawn(&mut physics, Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert!(controller.bind(&mut physics).is_ok());
    }

    #[test]
    fn test_falls_onto_ground() {
        let mut physics = PhysicsWorld::new();
        physics.create_ground(0.0);
        let mut controller = CharacterController::new();
        controller.spawn(&mut physics, Vec3::new(0.0, 0.5, 0.0)).unwrap();
        physics.refresh_queries();

        for _ in 0..60 {
            let mut motor = controller.bind(&mut physics).unwrap();
            motor.move_by(Vec3::new(0.0, -0.1, 0.0), 1.0 / 60.0);
            physics.step();
        }
        assert!(controller.grounded);
        assert!(controller.position.y.abs() < 0.1);
    }

    #[test]
    fn test_freeze_swaps_body_type() {
        let mut physics = PhysicsWorld::new();
        let mut controller = CharacterController::new();
        let handle = controller.spawn(&mut physics, Vec3::ZERO).unwrap();

        let mut motor = controller.bind(&mut physics).unwrap();
        assert!(motor.is_kinematic());
        motor.set_kinematic(false);
        assert!(!motor.is_kinematic());

        assert!(physics.get_rigid_body(handle).unwrap().is_dynamic());
        assert!(!controller.is_controller_driven());
    }

    #[test]
    fn test_capsule_is_invisible_to_solid_queries() {
        let mut physics = PhysicsWorld::new();
        let mut controller = CharacterController::new();
        controller.spawn(&mut physics, Vec3::ZERO).unwrap();
        physics.refresh_queries();

        let center = controller.center_position();
        let above = center + Vec3::Y * 5.0;
        assert!(physics.linecast(above, center, LayerMask::DEFAULT_SOLID).is_none());
        assert!(physics.linecast(above, center, LayerMask::ALL).is_some());
    }

    #[test]
    fn test_spawn_rejects_bad_layer() {
        let mut physics = PhysicsWorld::new();
        let mut controller = CharacterController::with_config(CharacterControllerConfig {
            layer: 40,
            ..Default::default()
        });
        assert_eq!(controller.spawn(&mut physics, Vec3::ZERO), Err(PhysicsError::InvalidLayer(40)));
        assert!(controller.bind(&mut physics).is_err());
    }
}
