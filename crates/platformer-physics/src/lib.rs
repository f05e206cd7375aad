//! Platformer Physics - Collaborator primitives backed by rapier3d
//!
//! Provides the raycast contract used by the camera and sensors, the
//! character-motion contract used by locomotion, and a rapier world that
//! implements both.

mod character_controller;
mod motor;
mod query;

pub use character_controller::{BoundCharacter, CharacterController, CharacterControllerConfig};
pub use motor::{CharacterMotor, KinematicBody};
pub use query::{EmptyWorld, RaycastHit, Raycaster};

use glam::Vec3;
use nalgebra::Unit;
use platformer_core::LayerMask;
use rapier3d::prelude::*;

/// Errors raised by the physics layer
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    #[error("character has not been spawned into a physics world")]
    NotSpawned,

    #[error("layer index {0} is outside the 32 available layers")]
    InvalidLayer(u8),
}

#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.81 on Y axis)
    pub gravity: Vec3,
    /// Physics timestep (default: 1/60)
    pub timestep: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            timestep: 1.0 / 60.0,
        }
    }
}

/// Rapier state for the level and the character capsule.
///
/// Static geometry goes straight into the collider set; the character is the
/// only rigid body. Queries are refreshed after every step so raycasts see the
/// latest positions.
pub struct PhysicsWorld {
    pub config: PhysicsConfig,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,

    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    pub fn with_config(config: PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.timestep;

        Self {
            config,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Advance one fixed timestep, then refresh the query structure
    pub fn step(&mut self) {
        let gravity = vector![self.config.gravity.x, self.config.gravity.y, self.config.gravity.z];

        self.pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );

        self.refresh_queries();
    }

    /// Rebuild the query acceleration structure without stepping
    pub fn refresh_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Insert level geometry that never moves
    pub fn add_static_collider(&mut self, collider: Collider) -> ColliderHandle {
        self.collider_set.insert(collider)
    }

    /// Insert a body with its collider attached
    pub fn add_body(&mut self, body: RigidBody, collider: Collider) -> (RigidBodyHandle, ColliderHandle) {
        let body_handle = self.rigid_body_set.insert(body);
        let collider_handle = self
            .collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);
        (body_handle, collider_handle)
    }

    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    pub fn get_rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    pub fn get_collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.collider_set.get(handle)
    }

    /// Move a collider onto a single layer so masks can include or skip it
    pub fn set_collider_layer(&mut self, handle: ColliderHandle, layer: u8) -> Result<(), PhysicsError> {
        let groups = layer_groups(layer)?;
        if let Some(collider) = self.collider_set.get_mut(handle) {
            collider.set_collision_groups(groups);
        }
        Ok(())
    }

    /// Infinite floor at height `y`
    pub fn create_ground(&mut self, y: f32) -> ColliderHandle {
        let normal = Unit::new_normalize(vector![0.0, 1.0, 0.0]);
        let ground = ColliderBuilder::halfspace(normal)
            .translation(vector![0.0, y, 0.0])
            .friction(0.7)
            .restitution(0.0)
            .build();
        self.add_static_collider(ground)
    }

    /// Axis-aligned block centred on `position`
    pub fn create_static_box(&mut self, half_extents: Vec3, position: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![position.x, position.y, position.z])
            .friction(0.7)
            .build();
        self.add_static_collider(collider)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Raycaster for PhysicsWorld {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask)
        -> Option<RaycastHit> {
        let direction = direction.try_normalize()?;
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );
        let filter = QueryFilter::default().groups(mask_groups(mask));

        self.query_pipeline
            .cast_ray_and_get_normal(&self.rigid_body_set, &self.collider_set, &ray, max_distance, true, filter)
            .map(|(handle, intersection)| RaycastHit {
                collider: Some(handle),
                distance: intersection.time_of_impact,
                point: origin + direction * intersection.time_of_impact,
                normal: Vec3::new(
                    intersection.normal.x,
                    intersection.normal.y,
                    intersection.normal.z,
                ),
            })
    }
}

/// Collision groups for a collider living on one layer
pub(crate) fn layer_groups(layer: u8) -> Result<InteractionGroups, PhysicsError> {
    let bit = 1u32.checked_shl(layer as u32).ok_or(PhysicsError::InvalidLayer(layer))?;
    Ok(InteractionGroups::new(Group::from_bits_truncate(bit), Group::ALL))
}

/// Query groups selecting every collider whose layer is in `mask`
fn mask_groups(mask: LayerMask) -> InteractionGroups {
    InteractionGroups::new(Group::ALL, Group::from_bits_truncate(mask.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_world_creation() {
        let world = PhysicsWorld::new();
        assert_eq!(world.config.gravity, Vec3::new(0.0, -9.81, 0.0));
    }

    #[test]
    fn test_ground_creation() {
        let mut world = PhysicsWorld::new();
        let ground = world.create_ground(0.0);
        assert!(world.get_collider(ground).is_some());
    }

    #[test]
    fn test_raycast() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        world.refresh_queries();

        let hit = world
            .cast(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 100.0, LayerMask::ALL)
            .unwrap();
        assert!((hit.distance - 10.0).abs() < 1e-3);
        assert!(hit.normal.distance(Vec3::Y) < 1e-3);
        assert!(hit.collider.is_some());
    }

    #[test]
    fn test_raycast_respects_layer_mask() {
        let mut world = PhysicsWorld::new();
        let wall = world.create_static_box(Vec3::new(1.0, 5.0, 1.0), Vec3::new(0.0, 0.0, -5.0));
        world.set_collider_layer(wall, 2).unwrap();
        world.refresh_queries();

        let origin = Vec3::new(0.0, 0.0, 0.0);
        assert!(world.linecast(origin, Vec3::new(0.0, 0.0, -10.0), LayerMask::DEFAULT_SOLID).is_none());
        assert!(world.linecast(origin, Vec3::new(0.0, 0.0, -10.0), LayerMask::ALL).is_some());
        assert_eq!(world.set_collider_layer(wall, 40), Err(PhysicsError::InvalidLayer(40)));
    }
}
