//! Platformer orbit camera
//!
//! The camera runs once per frame after locomotion. It first resolves its mode
//! from the look input, then places itself for that mode, and finally probes
//! the terrain ahead so the next frame's automatic placement can clear hills
//! and cliffs.

use std::sync::Arc;

use glam::{Quat, Vec2, Vec3};
use platformer_core::{clamp01, flatten, lerp, normalized_span, wrap01, GameTime, SmoothDamp, Transform};
use platformer_physics::{RaycastHit, Raycaster};
use tracing::{debug, info};

use crate::input::{InputButton, InputState};
use crate::ConfigError;

use super::first_person::{first_person_rotation, EntryStep, FirstPersonEntry, LookAtRetarget, TRIGGER_AXIS};
use super::height::{HeightSensor, SensorReading};
use super::interest::{InterestSlot, PointOfInterest};
use super::{CameraAttributes, CameraSettings, HeightAttributes, ProfileSlot};

/// Camera behaviour currently in charge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Follows behind the target, lifted by the terrain sensor
    Automatic,
    /// Orbit driven by the look sliders
    Manual,
    /// Blending from manual back to automatic after the player let go
    Hybrid,
    /// At the head anchor
    FirstPerson,
}

/// Builder for [`CameraController`]; follow target and head anchor are required
#[derive(Debug, Clone, Default)]
pub struct CameraControllerBuilder {
    settings: CameraSettings,
    attributes: Option<Arc<CameraAttributes>>,
    height_attributes: Option<Arc<HeightAttributes>>,
    follow: Option<Transform>,
    head_anchor: Option<Transform>,
    rotation: Quat,
}

impl CameraControllerBuilder {
    pub fn settings(mut self, settings: CameraSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Default camera profile, restored whenever a zone lets go
    pub fn attributes(mut self, attributes: Arc<CameraAttributes>) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Default terrain sensing profile
    pub fn height_attributes(mut self, attributes: Arc<HeightAttributes>) -> Self {
        self.height_attributes = Some(attributes);
        self
    }

    /// Where the follow target starts
    pub fn follow(mut self, follow: Transform) -> Self {
        self.follow = Some(follow);
        self
    }

    /// Eye transform relative to the follow target
    pub fn head_anchor(mut self, anchor: Transform) -> Self {
        self.head_anchor = Some(anchor);
        self
    }

    /// Starting orientation; also the base the first-person view turns from
    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn build(self) -> Result<CameraController, ConfigError> {
        let follow = self.follow.ok_or(ConfigError::MissingFollowTarget)?;
        let head_anchor = self.head_anchor.ok_or(ConfigError::MissingHeadAnchor)?;

        let attributes = ProfileSlot::new(self.attributes.unwrap_or_default());
        attributes.get().validate()?;
        let height_attributes = ProfileSlot::new(self.height_attributes.unwrap_or_default());
        height_attributes.get().validate()?;

        let manual_distance = attributes.get().distance;
        let manual_distance_up = attributes.get().distance_up;
        let rotation = self.rotation.normalize();
        let sensor = HeightSensor::new(self.settings.sensor_smoothing_time);

        Ok(CameraController {
            settings: self.settings,
            attributes,
            height_attributes,
            sensor,
            mode: CameraMode::Automatic,
            transform: Transform::from_position_rotation(follow.position + Vec3::ONE, rotation),
            base_rotation: rotation,
            head_anchor,
            look_at: follow.position,
            smoothed_look_at: follow.position,
            target_position: follow.position,
            look_direction: Vec3::ZERO,
            position_velocity: Vec3::ZERO,
            manual_velocity: Vec3::ZERO,
            look_at_velocity: Vec3::ZERO,
            yaw_slider: 0.0,
            pitch_slider: 0.0,
            look_memory: Vec2::ZERO,
            manual_forward: flatten(follow.forward()),
            manual_up: follow.up(),
            manual_distance,
            manual_distance_up,
            last_manual_time: 0.0,
            mode_ratio: 1.0,
            allowed_to_first_person: true,
            entry: FirstPersonEntry::default(),
            retarget: None,
            interest: InterestSlot::default(),
        })
    }
}

/// Orbit camera with automatic, manual, hybrid and first-person modes
#[derive(Debug)]
pub struct CameraController {
    settings: CameraSettings,
    attributes: ProfileSlot<CameraAttributes>,
    height_attributes: ProfileSlot<HeightAttributes>,
    sensor: HeightSensor,
    mode: CameraMode,
    transform: Transform,
    base_rotation: Quat,
    head_anchor: Transform,
    /// Follow position this frame
    look_at: Vec3,
    /// Point the camera actually faces, trailing `look_at`
    smoothed_look_at: Vec3,
    target_position: Vec3,
    look_direction: Vec3,
    position_velocity: Vec3,
    manual_velocity: Vec3,
    look_at_velocity: Vec3,
    /// [0, 1) maps to a full turn around the follow target
    yaw_slider: f32,
    /// [-1, 1]; picks the manual distance pair, or the first-person pitch
    pitch_slider: f32,
    look_memory: Vec2,
    manual_forward: Vec3,
    manual_up: Vec3,
    manual_distance: f32,
    manual_distance_up: f32,
    last_manual_time: f32,
    mode_ratio: f32,
    allowed_to_first_person: bool,
    entry: FirstPersonEntry,
    retarget: Option<LookAtRetarget>,
    interest: InterestSlot,
}

impl CameraController {
    pub fn builder() -> CameraControllerBuilder {
        CameraControllerBuilder::default()
    }

    /// Advance the camera by one frame. Call after the follow target moved.
    pub fn present(&mut self, input: &InputState, follow: &Transform, world: &impl Raycaster, time: &GameTime) {
        let dt = time.delta_time;
        let now = time.now();

        self.advance_retarget(dt);
        self.resolve_mode(input, follow, now);
        self.advance_entry(follow, dt);

        self.look_at = follow.position;
        match self.mode {
            CameraMode::Automatic => self.update_automatic(follow, world, dt),
            CameraMode::Manual => self.update_manual(follow, world, now, dt),
            CameraMode::Hybrid => self.update_hybrid(follow, world, dt),
            CameraMode::FirstPerson => {
                self.target_position = follow.position;
                if self.entry.is_locked_in() {
                    self.transform.position = follow.child(&self.head_anchor).position;
                    self.transform.rotation =
                        first_person_rotation(self.base_rotation, follow.up(), self.yaw_slider, self.pitch_slider);
                }
            }
        }

        let heading = self.camera_direction();
        self.sensor.sense(
            self.height_attributes.get(),
            follow.position,
            -follow.up(),
            heading,
            world,
            dt,
        );
    }

    fn resolve_mode(&mut self, input: &InputState, follow: &Transform, now: f32) {
        let previous = self.mode;

        if input.is_just_pressed(InputButton::CameraReset) {
            self.set_mode(CameraMode::Automatic);
        }

        if self.allowed_to_first_person && self.first_person_triggered() {
            if self.mode != CameraMode::FirstPerson {
                self.entry.arm();
            }
        } else if (self.has_look_input(input) && self.mode != CameraMode::FirstPerson)
            || (!self.allowed_to_first_person && self.mode == CameraMode::FirstPerson)
        {
            self.set_mode(CameraMode::Manual);
            if !matches!(previous, CameraMode::Manual | CameraMode::Hybrid) {
                self.manual_forward = flatten(self.transform.forward());
                self.manual_up = follow.up();
            }
            self.last_manual_time = now;
        }

        match self.mode {
            CameraMode::Manual | CameraMode::Hybrid | CameraMode::FirstPerson => self.update_sliders(input.look),
            CameraMode::Automatic => {
                self.yaw_slider = 0.0;
                self.look_memory = Vec2::ZERO;
            }
        }

        let attributes = self.attributes.get();
        let elapsed = now - (self.last_manual_time + attributes.hybrid_delay_time);
        self.mode_ratio = clamp01(normalized_span(elapsed, 0.0, attributes.auto_switch_time, 1.0));
    }

    fn update_sliders(&mut self, look: Vec2) {
        let axis = self.look_memory / 2.0 + look / 2.0;
        let dead_zone = self.settings.dead_zone;

        if axis.x.abs() > dead_zone {
            self.yaw_slider = wrap01(self.yaw_slider + axis.x * axis.x.abs() / 90.0);
        }
        if axis.y.abs() > dead_zone {
            self.pitch_slider = (self.pitch_slider + axis.y * axis.y.abs() / 20.0).clamp(-1.0, 1.0);
        }

        let attributes = self.attributes.get();
        self.manual_distance = attributes.manual_distance(self.pitch_slider);
        self.manual_distance_up = attributes.manual_distance_up(self.pitch_slider);
        self.look_memory = axis;
    }

    fn advance_entry(&mut self, follow: &Transform, dt: f32) {
        let anchor = follow.child(&self.head_anchor);
        let triggered = self.first_person_triggered();

        match self.entry.advance(triggered, &self.transform, &anchor, dt) {
            EntryStep::Entered => {
                info!("Entering first-person view");
                self.set_mode(CameraMode::FirstPerson);
            }
            EntryStep::Moving(transform) => self.transform = transform,
            EntryStep::LockedIn(transform) => {
                self.transform = transform;
                self.pitch_slider = 0.0;
                self.yaw_slider = wrap01(follow.yaw_degrees() / 360.0);
                info!("First-person view locked in");
            }
            EntryStep::Waiting | EntryStep::Aborted => {}
        }
    }

    fn update_automatic(&mut self, follow: &Transform, world: &impl Raycaster, dt: f32) {
        let attributes = self.attributes.get();
        let (distance, distance_up) = (attributes.distance, attributes.distance_up);

        self.look_direction = self.flat_look_direction();
        self.target_position = self.automatic_target(follow, distance, distance_up);
        self.collide_target(world);
        self.smooth_follow(follow, world, 1.0, dt);
    }

    fn update_manual(&mut self, follow: &Transform, world: &impl Raycaster, now: f32, dt: f32) {
        self.target_position = self.manual_target(follow);
        self.smooth_follow(follow, world, 0.0, dt);

        if self.last_manual_time + self.attributes.get().hybrid_delay_time < now {
            self.set_mode(CameraMode::Hybrid);
        }
    }

    fn update_hybrid(&mut self, follow: &Transform, world: &impl Raycaster, dt: f32) {
        let blend = self.hybrid_blend();
        let attributes = self.attributes.get();
        let distance = lerp(self.manual_distance, attributes.distance, blend);
        let distance_up = lerp(self.manual_distance_up, attributes.distance_up, blend);

        self.look_direction = self.flat_look_direction();
        let automatic = self.automatic_target(follow, distance, distance_up);
        self.target_position = self.manual_target(follow).lerp(automatic, blend);
        self.collide_target(world);
        self.smooth_follow(follow, world, blend, dt);

        if self.mode_ratio >= 1.0 {
            self.set_mode(CameraMode::Automatic);
        }
    }

    /// Automatic placement for the given base distances, bent by the terrain sensor
    fn automatic_target(&mut self, follow: &Transform, distance: f32, distance_up: f32) -> Vec3 {
        if let Some(point) = self.interest.get() {
            self.look_direction = (point.position() - self.transform.position).normalize_or_zero();
        }
        let reading = self.sensor.reading();
        let height = lerp(distance_up, reading.bump_height, reading.ratio);
        let distance = lerp(distance, reading.bump_distance, reading.ratio);

        follow.position + follow.up() * height - self.look_direction * distance
    }

    fn manual_target(&self, follow: &Transform) -> Vec3 {
        follow.position + self.manual_up * self.manual_distance_up - self.manual_forward * self.manual_distance
    }

    fn flat_look_direction(&self) -> Vec3 {
        flatten(self.look_at - self.transform.position)
    }

    fn collide_target(&mut self, world: &impl Raycaster) {
        if let Some(position) = self.pushed_out(self.target_position, world) {
            self.target_position = position;
        }
    }

    /// Where to put the camera if the line from the look-at point to `position` is blocked
    fn pushed_out(&self, position: Vec3, world: &impl Raycaster) -> Option<Vec3> {
        world
            .linecast(self.smoothed_look_at, position, self.settings.solid_mask)
            .map(|hit| hit.point + hit.normal.normalize_or_zero() * self.settings.collision_distance_multiplier)
    }

    /// Move toward the resolved target and face the trailing look-at point.
    ///
    /// `blend` weighs the automatic placement against the manual orbit: 1 is
    /// fully automatic, 0 fully manual.
    fn smooth_follow(&mut self, follow: &Transform, world: &impl Raycaster, blend: f32, dt: f32) {
        let old_position = self.transform.position;
        self.transform.rotation = self.base_rotation;

        self.transform.position = match self.mode {
            CameraMode::Manual => self.orbit(self.target_position, old_position, world, dt),
            CameraMode::Hybrid => {
                let automatic = self.smooth_position(old_position, dt);
                let manual = self.orbit(self.manual_target(follow), old_position, world, dt);
                manual.lerp(automatic, blend)
            }
            _ => self.smooth_position(old_position, dt),
        };

        (self.smoothed_look_at, self.look_at_velocity) = Vec3::smooth_damp(
            self.smoothed_look_at,
            self.look_at,
            self.look_at_velocity,
            self.settings.look_at_smoothing_time,
            dt,
        );
        self.transform.look_at(self.smoothed_look_at, Vec3::Y);
    }

    fn smooth_position(&mut self, from: Vec3, dt: f32) -> Vec3 {
        let (position, velocity) = Vec3::smooth_damp(
            from,
            self.target_position,
            self.position_velocity,
            self.settings.position_smoothing_time,
            dt,
        );
        self.position_velocity = velocity;
        position
    }

    /// Swing `start` around the look-at point by the yaw slider, keep it out of
    /// walls, and settle toward it from `old_position`
    fn orbit(&mut self, start: Vec3, old_position: Vec3, world: &impl Raycaster, dt: f32) -> Vec3 {
        let mut orbit = Transform::from_position_rotation(start, self.base_rotation);
        orbit.rotate_around(self.look_at, Vec3::Y, lerp(0.0, 360.0, self.yaw_slider));
        let position = self.pushed_out(orbit.position, world).unwrap_or(orbit.position);

        let (position, velocity) = Vec3::smooth_damp(
            old_position,
            position,
            self.manual_velocity,
            self.settings.manual_smoothing_time,
            dt,
        );
        self.manual_velocity = velocity;
        position
    }

    fn advance_retarget(&mut self, dt: f32) {
        if let Some(retarget) = self.retarget.as_mut() {
            let (value, done) = retarget.advance(dt);
            self.settings.look_at_smoothing_time = value;
            if done {
                self.retarget = None;
            }
        }
    }

    fn first_person_triggered(&self) -> bool {
        self.pitch_slider >= 1.0 - f32::EPSILON && self.look_memory.y > TRIGGER_AXIS
    }

    fn has_look_input(&self, input: &InputState) -> bool {
        input.look.x.abs() >= self.settings.dead_zone || input.look.y.abs() >= self.settings.dead_zone
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Force a mode. Leaving first person drops any entry in progress.
    pub fn set_mode(&mut self, mode: CameraMode) {
        if mode != CameraMode::FirstPerson {
            self.entry.cancel();
        }
        if mode != self.mode {
            debug!("Camera mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Time-based progress from manual back to automatic, in [0, 1]
    pub fn mode_ratio(&self) -> f32 {
        self.mode_ratio
    }

    /// `mode_ratio` remapped through the profile's interpolation curve
    pub fn hybrid_blend(&self) -> f32 {
        clamp01(self.attributes.get().mode_interpolation.evaluate(self.mode_ratio))
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Camera forward without its vertical part; locomotion steers relative to it
    pub fn camera_direction(&self) -> Vec3 {
        flatten(self.transform.forward())
    }

    /// Forward and up captured when manual mode was entered
    pub fn manual_frame(&self) -> (Vec3, Vec3) {
        (self.manual_forward, self.manual_up)
    }

    pub fn yaw_slider(&self) -> f32 {
        self.yaw_slider
    }

    pub fn pitch_slider(&self) -> f32 {
        self.pitch_slider
    }

    /// The trailing point the camera faces
    pub fn look_at_point(&self) -> Vec3 {
        self.smoothed_look_at
    }

    pub fn is_first_person_locked(&self) -> bool {
        self.entry.is_locked_in()
    }

    pub fn allowed_to_first_person(&self) -> bool {
        self.allowed_to_first_person
    }

    /// Written by locomotion every frame; false while moving or airborne
    pub fn set_allowed_to_first_person(&mut self, allowed: bool) {
        self.allowed_to_first_person = allowed;
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn look_at_smoothing_time(&self) -> f32 {
        self.settings.look_at_smoothing_time
    }

    /// Ease the look-at smoothing time toward `value`, replacing any change in progress
    pub fn set_look_at_smoothing_time(&mut self, value: f32) {
        self.retarget = Some(LookAtRetarget::new(self.settings.look_at_smoothing_time, value));
    }

    pub fn sensor_reading(&self) -> SensorReading {
        self.sensor.reading()
    }

    pub fn last_sensor_hit(&self) -> Option<&RaycastHit> {
        self.sensor.last_hit()
    }

    /// Where the camera is looking at interest-wise: the point of interest if
    /// one is set, the normal point otherwise
    pub fn current_point_of_interest(&self) -> Vec3 {
        self.interest
            .get()
            .map(|point| point.position())
            .unwrap_or_else(|| self.normal_point_of_interest())
    }

    /// One unit ahead of the camera toward the follow target
    pub fn normal_point_of_interest(&self) -> Vec3 {
        self.transform.position + self.flat_look_direction()
    }

    pub fn point_of_interest(&self) -> Option<Arc<PointOfInterest>> {
        self.interest.get()
    }

    pub fn replace_point_of_interest(&mut self, point: Option<&Arc<PointOfInterest>>) {
        self.interest.replace(point);
    }

    pub fn camera_attributes(&self) -> &CameraAttributes {
        self.attributes.get()
    }

    pub fn set_camera_attributes(&mut self, attributes: Option<Arc<CameraAttributes>>) {
        self.attributes.set(attributes);
    }

    pub fn reset_camera_attributes(&mut self) {
        self.attributes.reset();
    }

    pub fn height_attributes(&self) -> &HeightAttributes {
        self.height_attributes.get()
    }

    pub fn set_height_attributes(&mut self, attributes: Option<Arc<HeightAttributes>>) {
        self.height_attributes.set(attributes);
    }

    pub fn reset_height_attributes(&mut self) {
        self.height_attributes.reset();
    }
}
