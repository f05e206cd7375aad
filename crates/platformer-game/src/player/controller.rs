//! Locomotion controller
//!
//! Arcade movement relative to the camera: smoothed stick input, ground and
//! air control, charged jumps, a double jump and jump extension, with the
//! pre-jump momentum carried through the air.

use glam::{Quat, Vec2, Vec3};
use platformer_core::{flatten, yaw_from_direction, GameTime};
use platformer_physics::{CharacterMotor, KinematicBody, Raycaster};
use tracing::{debug, info};

use crate::input::{InputButton, InputState};
use crate::ConfigError;

use super::{FreezeListener, MotionIndicator, MovementConfig};

/// What one simulate tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementOutput {
    /// Displacement handed to the motor
    pub displacement: Vec3,
    /// Debounced ground state used for this tick
    pub grounded: bool,
    /// A ground jump started this tick
    pub jumped: bool,
    /// A double jump started this tick
    pub double_jumped: bool,
    /// Flattened direction the character faces
    pub facing: Vec3,
    /// Whether the camera may enter first person (standing still on the ground)
    pub allowed_to_first_person: bool,
    /// Whether the character is handed over to the physics simulation
    pub frozen: bool,
}

/// Builder for [`MovementController`]; the motion indicator is required
#[derive(Default)]
pub struct MovementControllerBuilder {
    config: MovementConfig,
    indicator: Option<MotionIndicator>,
    facing: Option<Vec3>,
}

impl MovementControllerBuilder {
    pub fn config(mut self, config: MovementConfig) -> Self {
        self.config = config;
        self
    }

    pub fn motion_indicator(mut self, indicator: MotionIndicator) -> Self {
        self.indicator = Some(indicator);
        self
    }

    /// Initial facing direction, flattened
    pub fn facing(mut self, facing: Vec3) -> Self {
        self.facing = Some(facing);
        self
    }

    pub fn build(self) -> Result<MovementController, ConfigError> {
        let indicator = self.indicator.ok_or(ConfigError::MissingMotionIndicator)?;
        self.config.validate()?;
        let facing = self.facing.map(flatten).filter(|f| *f != Vec3::ZERO).unwrap_or(Vec3::NEG_Z);

        Ok(MovementController {
            config: self.config,
            indicator,
            listeners: Vec::new(),
            axes: Vec2::ZERO,
            xy_direction: Vec3::ZERO,
            speed: 0.0,
            vertical_speed: 0.0,
            move_direction_before_jump: Vec3::ZERO,
            nullify_next: false,
            did_jump: false,
            did_double_jump: false,
            jump_tap_time: 0.0,
            left_ground_at: 0.0,
            had_contact: false,
            facing,
            frozen: false,
        })
    }
}

/// Player locomotion driven once per frame before the camera
pub struct MovementController {
    pub config: MovementConfig,
    indicator: MotionIndicator,
    listeners: Vec<Box<dyn FreezeListener>>,
    /// Low-passed stick input
    axes: Vec2,
    /// Stick input in the canonical frame (forward is -Z)
    xy_direction: Vec3,
    speed: f32,
    vertical_speed: f32,
    move_direction_before_jump: Vec3,
    nullify_next: bool,
    did_jump: bool,
    did_double_jump: bool,
    jump_tap_time: f32,
    left_ground_at: f32,
    had_contact: bool,
    facing: Vec3,
    frozen: bool,
}

impl MovementController {
    pub fn builder() -> MovementControllerBuilder {
        MovementControllerBuilder::default()
    }

    /// Run one simulate tick.
    ///
    /// `camera_direction` is the camera's flattened forward; input is steered
    /// relative to it.
    pub fn simulate<M>(
        &mut self,
        input: &InputState,
        camera_direction: Vec3,
        motor: &mut M,
        time: &GameTime,
    ) -> MovementOutput
    where
        M: CharacterMotor + KinematicBody,
    {
        let now = time.now();
        let dt = time.delta_time;

        let contact = motor.is_grounded();
        if !contact && self.had_contact {
            self.left_ground_at = now;
        }
        self.had_contact = contact;

        if input.is_just_pressed(InputButton::Jump) {
            self.jump_tap_time = now;
        }

        self.read_input(input.movement);
        let mut output = self.apply_motion(input, camera_direction, motor, contact, now, dt);

        if input.is_just_pressed(InputButton::Secondary) {
            self.toggle_freeze(motor);
        }
        output.frozen = self.frozen;

        if motor.is_grounded() && self.did_jump {
            self.did_jump = false;
        }
        output
    }

    fn read_input(&mut self, raw: Vec2) {
        let lag = self.config.standard_lag_coeff;
        self.axes = (self.axes * (1.0 - lag) + raw * lag).clamp(Vec2::NEG_ONE, Vec2::ONE);
        self.xy_direction = Vec3::new(self.axes.x, 0.0, -self.axes.y);

        let speed = self.xy_direction.length_squared().min(1.0);
        self.speed = if speed < self.config.speed_dead_zone { 0.0 } else { speed };
    }

    fn apply_motion<M>(
        &mut self,
        input: &InputState,
        camera_direction: Vec3,
        motor: &mut M,
        contact: bool,
        now: f32,
        dt: f32,
    ) -> MovementOutput
    where
        M: CharacterMotor,
    {
        let relative_to_camera = Quat::from_rotation_y(yaw_from_direction(camera_direction));
        let mut move_direction =
            (relative_to_camera * self.xy_direction).normalize_or_zero() * self.speed * self.config.speed_multiplier;

        let mut allowed_to_first_person = true;
        if self.xy_direction.length_squared() > self.config.facing_threshold {
            let facing = flatten(move_direction);
            if facing != Vec3::ZERO {
                self.facing = facing;
            }
            allowed_to_first_person = false;
        }

        let grounded = self.is_grounded(contact, now);
        let mut jumped = false;
        let mut double_jumped = false;

        if grounded {
            self.vertical_speed = 0.0;
            self.did_jump = false;
            self.did_double_jump = false;
            self.move_direction_before_jump = move_direction;

            let held = now - self.jump_tap_time;
            if input.is_just_released(InputButton::Jump)
                || (input.is_held(InputButton::Jump) && held > self.config.jump_max_time)
            {
                self.vertical_speed = self.config.jump_impulse(held);
                self.did_jump = true;
                jumped = true;
                debug!("Jump with impulse {:.2}", self.vertical_speed);
            }
        } else {
            allowed_to_first_person = false;
            self.move_direction_before_jump *= self.config.aerodynamic;

            if !self.did_double_jump {
                move_direction *= self.config.air_control;
                let since_window = now - (self.jump_tap_time + self.config.jump_max_time);
                if input.is_just_pressed(InputButton::Jump) {
                    self.vertical_speed = self.config.air_jump_force;
                    self.did_double_jump = true;
                    double_jumped = true;
                    debug!("Double jump");
                } else if input.is_held(InputButton::Jump) && since_window < self.config.jump_max_expand_time {
                    self.vertical_speed += self.config.jump_extension(since_window) * self.config.gravity * dt;
                }
            } else {
                self.move_direction_before_jump *= self.config.air_inertia_decreaser;
                move_direction *= self.config.air_control_double_jump;
            }
        }

        self.vertical_speed -= self.config.gravity * dt;
        move_direction.y = self.vertical_speed;
        if !self.is_grounded(contact, now) {
            move_direction += self.move_direction_before_jump * self.config.air_inertia;
        }

        let nullifier = if std::mem::take(&mut self.nullify_next) { 0.0 } else { 1.0 };
        let displacement = move_direction * nullifier * dt;
        if !self.frozen {
            motor.move_by(displacement, dt);
        }

        MovementOutput {
            displacement,
            grounded,
            jumped,
            double_jumped,
            facing: self.facing,
            allowed_to_first_person,
            frozen: self.frozen,
        }
    }

    /// Ground contact with a short grace period; never grounded right after a jump
    fn is_grounded(&self, contact: bool, now: f32) -> bool {
        if self.did_jump {
            return false;
        }
        contact || now - self.left_ground_at <= self.config.grounded_delay
    }

    /// Ease the motion indicator after the character moved.
    ///
    /// Kept apart from `simulate` so the motor can hold the physics world
    /// mutably while the indicator only needs to query it.
    pub fn update_indicator(&mut self, character: Vec3, world: &impl Raycaster, dt: f32) {
        let rotation = Quat::from_rotation_y(yaw_from_direction(self.facing));
        self.indicator.update(character, rotation, self.speed, world, dt);
    }

    /// Hand the character to the physics simulation or take it back
    pub fn toggle_freeze(&mut self, body: &mut impl KinematicBody) {
        let kinematic = !body.is_kinematic();
        let frozen = !kinematic;
        for listener in &mut self.listeners {
            listener.on_freeze(frozen);
        }
        body.set_kinematic(kinematic);
        self.frozen = frozen;
        info!("Character {}", if frozen { "frozen" } else { "released" });
    }

    pub fn add_freeze_listener(&mut self, listener: Box<dyn FreezeListener>) {
        self.listeners.push(listener);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Zero the next tick's displacement; later ticks move normally again
    pub fn nullify_next_move(&mut self) {
        self.nullify_next = true;
    }

    pub fn gravity(&self) -> f32 {
        self.config.gravity
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.config.gravity = gravity;
    }

    pub fn did_jump(&self) -> bool {
        self.did_jump
    }

    pub fn set_did_jump(&mut self, did_jump: bool) {
        self.did_jump = did_jump;
    }

    pub fn did_double_jump(&self) -> bool {
        self.did_double_jump
    }

    pub fn set_did_double_jump(&mut self, did_double_jump: bool) {
        self.did_double_jump = did_double_jump;
    }

    pub fn set_move_direction_before_jump(&mut self, direction: Vec3) {
        self.move_direction_before_jump = direction;
    }

    pub fn vertical_speed(&self) -> f32 {
        self.vertical_speed
    }

    pub fn set_vertical_speed(&mut self, speed: f32) {
        self.vertical_speed = speed;
    }

    /// Normalized move speed in [0, 1]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn facing(&self) -> Vec3 {
        self.facing
    }

    pub fn motion_indicator(&self) -> &MotionIndicator {
        &self.indicator
    }
}
