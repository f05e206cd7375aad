//! Camera zones
//!
//! A zone is a trigger volume that, while the player stands in it, pulls the
//! automatic camera toward a point of interest and can swap the camera and
//! height profiles. Zones talk to the camera only through its public
//! point-of-interest and profile API. Overlapping zones are not arbitrated:
//! the last one to claim the slot wins.

use std::sync::Arc;

use glam::Vec3;
use platformer_core::{clamp01, normalized_span, Curve, EntityId, SmoothDamp};
use tracing::{debug, info};

use super::interest::PointOfInterest;
use super::{CameraAttributes, CameraController, HeightAttributes};

/// Edge reported by [`CameraZone::track`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneEvent {
    Entered,
    Exited,
}

/// Trigger volume steering the camera while the player is inside
#[derive(Debug)]
pub struct CameraZone {
    id: EntityId,
    point: Option<Arc<PointOfInterest>>,
    camera_attributes: Option<Arc<CameraAttributes>>,
    height_attributes: Option<Arc<HeightAttributes>>,
    /// Seconds the point takes to travel to its rest position
    time_to_change: f32,
    curve: Curve,
    bounds: Option<(Vec3, Vec3)>,
    rest_position: Vec3,
    entered_at: f32,
    velocity: Vec3,
    /// The camera slot was empty when this zone claimed it
    had_priority: bool,
    inside: bool,
}

impl Default for CameraZone {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraZone {
    pub fn new() -> Self {
        Self {
            id: EntityId::new(),
            point: None,
            camera_attributes: None,
            height_attributes: None,
            time_to_change: 5.0,
            curve: Curve::EaseInOut,
            bounds: None,
            rest_position: Vec3::ZERO,
            entered_at: 0.0,
            velocity: Vec3::ZERO,
            had_priority: false,
            inside: false,
        }
    }

    /// Give the zone a point of interest resting at `position`
    pub fn with_point_of_interest(mut self, position: Vec3) -> Self {
        self.rest_position = position;
        self.point = Some(PointOfInterest::new(self.id, position));
        self
    }

    pub fn with_camera_attributes(mut self, attributes: Arc<CameraAttributes>) -> Self {
        self.camera_attributes = Some(attributes);
        self
    }

    pub fn with_height_attributes(mut self, attributes: Arc<HeightAttributes>) -> Self {
        self.height_attributes = Some(attributes);
        self
    }

    pub fn with_time_to_change(mut self, seconds: f32) -> Self {
        self.time_to_change = seconds.max(0.0);
        self
    }

    /// Shape of the transition when the zone did not take over another point
    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    /// Axis-aligned volume used by [`CameraZone::track`]
    pub fn with_bounds(mut self, min: Vec3, max: Vec3) -> Self {
        self.bounds = Some((min.min(max), min.max(max)));
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn point_of_interest(&self) -> Option<&Arc<PointOfInterest>> {
        self.point.as_ref()
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }

    pub fn contains(&self, position: Vec3) -> bool {
        self.bounds
            .is_some_and(|(min, max)| position.cmpge(min).all() && position.cmple(max).all())
    }

    /// Drive the enter/stay/exit callbacks from the actor's position
    pub fn track(&mut self, camera: &mut CameraController, actor: Vec3, now: f32, dt: f32) -> Option<ZoneEvent> {
        match (self.inside, self.contains(actor)) {
            (false, true) => {
                self.on_enter(camera, now);
                self.on_stay(camera, now, dt);
                Some(ZoneEvent::Entered)
            }
            (true, true) => {
                self.on_stay(camera, now, dt);
                None
            }
            (true, false) => {
                self.on_exit(camera);
                Some(ZoneEvent::Exited)
            }
            (false, false) => None,
        }
    }

    pub fn on_enter(&mut self, camera: &mut CameraController, now: f32) {
        if self.inside {
            debug!("Camera zone {:?} entered twice", self.id);
            return;
        }
        self.inside = true;

        if let Some(point) = &self.point {
            let current = camera.current_point_of_interest();
            let normal = camera.normal_point_of_interest();
            let start = if current.distance(self.rest_position) < normal.distance(self.rest_position) {
                current
            } else {
                normal
            };
            point.set_position(start);

            self.entered_at = now;
            self.velocity = Vec3::ZERO;
            self.had_priority = camera.point_of_interest().is_none();
            camera.replace_point_of_interest(Some(point));
        }
        if let Some(attributes) = &self.camera_attributes {
            camera.set_camera_attributes(Some(Arc::clone(attributes)));
        }
        if let Some(attributes) = &self.height_attributes {
            camera.set_height_attributes(Some(Arc::clone(attributes)));
        }
        info!("Entered camera zone {:?}", self.id);
    }

    /// Move the point toward its rest position
    pub fn on_stay(&mut self, camera: &CameraController, now: f32, dt: f32) {
        let Some(point) = &self.point else {
            return;
        };

        if self.had_priority {
            let t = normalized_span(now - self.entered_at, 0.0, self.time_to_change, 1.0);
            let blend = clamp01(self.curve.evaluate(clamp01(t)));
            point.set_position(camera.normal_point_of_interest().lerp(self.rest_position, blend));
        } else {
            let (position, velocity) =
                Vec3::smooth_damp(point.position(), self.rest_position, self.velocity, self.time_to_change, dt);
            self.velocity = velocity;
            point.set_position(position);
        }
    }

    pub fn on_exit(&mut self, camera: &mut CameraController) {
        if !self.inside {
            return;
        }
        self.inside = false;

        if let Some(point) = &self.point {
            // A zone that took over from another point never clears the slot
            let owns_slot = camera.point_of_interest().is_some_and(|current| Arc::ptr_eq(&current, point));
            if self.had_priority && owns_slot {
                camera.replace_point_of_interest(None);
            }
            point.set_position(self.rest_position);
            self.velocity = Vec3::ZERO;
        }
        if self.camera_attributes.is_some() {
            camera.reset_camera_attributes();
        }
        if self.height_attributes.is_some() {
            camera.reset_height_attributes();
        }
        info!("Left camera zone {:?}", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platformer_core::Transform;

    fn camera() -> CameraController {
        CameraController::builder()
            .follow(Transform::default())
            .head_anchor(Transform::from_position(Vec3::new(0.0, 1.7, 0.0)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_zone_claims_and_releases_empty_slot() {
        let mut camera = camera();
        let rest = Vec3::new(20.0, 0.0, 0.0);
        let mut zone = CameraZone::new().with_point_of_interest(rest).with_time_to_change(2.0);

        zone.on_enter(&mut camera, 0.0);
        let point = zone.point_of_interest().cloned().unwrap();
        assert!(camera.point_of_interest().is_some_and(|p| Arc::ptr_eq(&p, &point)));
        assert!(point.position().distance(camera.normal_point_of_interest()) < 1e-5);

        zone.on_stay(&camera, 1.0, 0.1);
        let halfway = point.position();
        assert!(halfway.distance(rest) > 1.0);

        zone.on_stay(&camera, 2.5, 0.1);
        assert!(point.position().distance(rest) < 1e-4);

        zone.on_exit(&mut camera);
        assert!(camera.point_of_interest().is_none());
        assert_eq!(point.position(), rest);
    }

    #[test]
    fn test_earlier_zone_exit_keeps_later_claim() {
        let mut camera = camera();
        let mut first = CameraZone::new().with_point_of_interest(Vec3::new(10.0, 0.0, 0.0));
        let mut second = CameraZone::new().with_point_of_interest(Vec3::new(-10.0, 0.0, 0.0));

        first.on_enter(&mut camera, 0.0);
        second.on_enter(&mut camera, 1.0);
        let second_point = second.point_of_interest().cloned().unwrap();
        // Took over from the first zone, so it starts where the camera was already looking
        assert!(second_point.position().distance(Vec3::new(10.0, 0.0, 0.0)) > 1e-3);

        first.on_exit(&mut camera);
        assert_eq!(camera.point_of_interest().map(|p| p.owner()), Some(second.id()));

        let before = second_point.position();
        second.on_stay(&camera, 1.5, 0.1);
        let after = second_point.position();
        assert!(after.distance(Vec3::new(-10.0, 0.0, 0.0)) < before.distance(Vec3::new(-10.0, 0.0, 0.0)));

        // The second zone found the slot taken when it entered, so it leaves it alone
        second.on_exit(&mut camera);
        assert_eq!(camera.point_of_interest().map(|p| p.owner()), Some(second.id()));
    }

    #[test]
    fn test_exit_without_priority_keeps_slot() {
        let mut camera = camera();
        let mut first = CameraZone::new().with_point_of_interest(Vec3::new(10.0, 0.0, 0.0));
        let mut second = CameraZone::new().with_point_of_interest(Vec3::new(-10.0, 0.0, 0.0));

        first.on_enter(&mut camera, 0.0);
        second.on_enter(&mut camera, 1.0);
        second.on_exit(&mut camera);
        assert!(camera.point_of_interest().is_some());

        // The first zone no longer owns the slot either
        first.on_exit(&mut camera);
        assert_eq!(camera.point_of_interest().map(|p| p.owner()), Some(second.id()));

        // A zone entering an empty slot claims and releases it as usual
        camera.replace_point_of_interest(None);
        first.on_enter(&mut camera, 2.0);
        first.on_exit(&mut camera);
        assert!(camera.point_of_interest().is_none());
    }

    #[test]
    fn test_zone_swaps_profiles() {
        let mut camera = camera();
        let mut zone = CameraZone::new()
            .with_camera_attributes(Arc::new(CameraAttributes {
                distance: 8.0,
                ..Default::default()
            }))
            .with_height_attributes(Arc::new(HeightAttributes {
                mask: platformer_core::LayerMask::NONE,
                ..Default::default()
            }));

        zone.on_enter(&mut camera, 0.0);
        assert_eq!(camera.camera_attributes().distance, 8.0);
        assert_eq!(camera.height_attributes().mask, platformer_core::LayerMask::NONE);
        assert!(camera.point_of_interest().is_none());

        zone.on_exit(&mut camera);
        assert_eq!(camera.camera_attributes(), &CameraAttributes::default());
        assert_eq!(camera.height_attributes(), &HeightAttributes::default());
    }

    #[test]
    fn test_track_reports_edges() {
        let mut camera = camera();
        let mut zone = CameraZone::new()
            .with_point_of_interest(Vec3::new(0.0, 5.0, -30.0))
            .with_bounds(Vec3::new(-5.0, -1.0, -5.0), Vec3::new(5.0, 5.0, 5.0));

        assert_eq!(zone.track(&mut camera, Vec3::new(20.0, 0.0, 0.0), 0.0, 0.1), None);
        assert_eq!(zone.track(&mut camera, Vec3::ZERO, 0.1, 0.1), Some(ZoneEvent::Entered));
        assert!(zone.is_inside());
        assert_eq!(zone.track(&mut camera, Vec3::new(1.0, 0.0, 0.0), 0.2, 0.1), None);
        assert_eq!(zone.track(&mut camera, Vec3::new(9.0, 0.0, 0.0), 0.3, 0.1), Some(ZoneEvent::Exited));
        assert!(camera.point_of_interest().is_none());
    }
}
