//! Raycast contract consumed by the camera, the height sensor and the motion
//! indicator. Missing a hit is a normal outcome (open space), not an error.

use glam::Vec3;
use platformer_core::LayerMask;
use rapier3d::prelude::ColliderHandle;

/// Detailed raycast hit information
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// The collider that was hit, when the query came from a rapier world
    pub collider: Option<ColliderHandle>,
    /// Distance along the ray to the hit point
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Surface normal at hit point
    pub normal: Vec3,
}

impl RaycastHit {
    /// Hit record without a backing collider
    pub fn new(point: Vec3, normal: Vec3, distance: f32) -> Self {
        Self {
            collider: None,
            distance,
            point,
            normal,
        }
    }
}

/// Anything that can answer ray queries against the world
pub trait Raycaster {
    /// Cast a ray and return the first hit within `max_distance`.
    ///
    /// `direction` does not need to be normalized; a zero direction never hits.
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask)
        -> Option<RaycastHit>;

    /// Check the straight segment between two points
    fn linecast(&self, from: Vec3, to: Vec3, mask: LayerMask) -> Option<RaycastHit> {
        let delta = to - from;
        let length = delta.length();
        if length <= f32::EPSILON {
            return None;
        }
        self.cast(from, delta / length, length, mask)
    }
}

impl<F> Raycaster for F
where
    F: Fn(Vec3, Vec3, f32, LayerMask) -> Option<RaycastHit>,
{
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask)
        -> Option<RaycastHit> {
        let direction = direction.try_normalize()?;
        self(origin, direction, max_distance, mask)
    }
}

/// A world with nothing in it
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyWorld;

impl Raycaster for EmptyWorld {
    fn cast(&self, _: Vec3, _: Vec3, _: f32, _: LayerMask) -> Option<RaycastHit> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor(origin: Vec3, direction: Vec3, max_distance: f32, _: LayerMask) -> Option<RaycastHit> {
        if direction.y >= 0.0 {
            return None;
        }
        let distance = origin.y / -direction.y;
        (distance <= max_distance).then(|| RaycastHit::new(origin + direction * distance, Vec3::Y, distance))
    }

    #[test]
    fn test_closure_raycaster() {
        let hit = floor.cast(Vec3::new(0.0, 4.0, 0.0), Vec3::new(0.0, -2.0, 0.0), 10.0, LayerMask::ALL);
        let hit = hit.unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!(floor.cast(Vec3::Y, Vec3::ZERO, 10.0, LayerMask::ALL).is_none());
    }

    #[test]
    fn test_linecast_respects_segment_length() {
        let from = Vec3::new(0.0, 4.0, 0.0);
        assert!(floor.linecast(from, Vec3::new(0.0, 1.0, 0.0), LayerMask::ALL).is_none());
        assert!(floor.linecast(from, Vec3::new(0.0, -1.0, 0.0), LayerMask::ALL).is_some());
        assert!(EmptyWorld.linecast(from, Vec3::ZERO, LayerMask::ALL).is_none());
    }
}
