//! Platformer - headless run of the camera and movement controllers
//!
//! Drives a character across a small test level with a scripted input track
//! and logs what the camera does in response.

mod settings;

use std::sync::Arc;

use anyhow::{Context, Result};
use glam::{Quat, Vec2, Vec3};
use tracing::{debug, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use platformer_core::{yaw_from_direction, GameTime, Transform};
use platformer_game::{
    CameraAttributes, CameraController, CameraMode, CameraZone, InputButton, InputState, MotionIndicator,
    MovementController, ZoneEvent,
};
use platformer_physics::{CharacterController, PhysicsWorld};

use settings::GameSettings;

const FRAME_TIME: f32 = 1.0 / 60.0;
const RUN_SECONDS: f32 = 14.0;

/// One scripted input segment, active on `[start, end)`
struct Segment {
    start: f32,
    end: f32,
    movement: Vec2,
    look: Vec2,
    held: &'static [InputButton],
}

const SCRIPT: &[Segment] = &[
    Segment { start: 0.5, end: 3.0, movement: Vec2::new(0.0, 1.0), look: Vec2::ZERO, held: &[] },
    Segment { start: 3.0, end: 3.1, movement: Vec2::new(0.0, 1.0), look: Vec2::ZERO, held: &[InputButton::Jump] },
    Segment { start: 3.1, end: 3.4, movement: Vec2::new(0.0, 1.0), look: Vec2::ZERO, held: &[] },
    Segment { start: 3.4, end: 3.45, movement: Vec2::new(0.0, 1.0), look: Vec2::ZERO, held: &[InputButton::Jump] },
    Segment { start: 3.45, end: 5.0, movement: Vec2::new(1.0, 0.0), look: Vec2::ZERO, held: &[] },
    Segment { start: 5.0, end: 6.0, movement: Vec2::ZERO, look: Vec2::new(1.0, 0.0), held: &[] },
    Segment { start: 9.5, end: 9.55, movement: Vec2::ZERO, look: Vec2::ZERO, held: &[InputButton::CameraReset] },
    Segment { start: 10.0, end: 12.0, movement: Vec2::ZERO, look: Vec2::new(0.0, 1.0), held: &[] },
    Segment { start: 12.5, end: 12.55, movement: Vec2::ZERO, look: Vec2::ZERO, held: &[InputButton::CameraReset] },
];

/// Fill `input` with this frame's scripted state, producing press and release edges
fn apply_script(input: &mut InputState, now: f32) {
    let active = SCRIPT.iter().find(|s| now >= s.start && now < s.end);
    let (movement, look, held) = active.map_or((Vec2::ZERO, Vec2::ZERO, &[][..]), |s| (s.movement, s.look, s.held));

    input.set_axes(look, movement);
    for button in [InputButton::Jump, InputButton::Secondary, InputButton::CameraReset] {
        match (held.contains(&button), input.is_held(button)) {
            (true, false) => input.press(button),
            (false, true) => input.release(button),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.as_str()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting platformer controllers...");

    let settings = GameSettings::load();
    if std::env::args().any(|arg| arg == "--save-settings") {
        settings.save().context("Failed to save settings")?;
    }

    // Level: a floor, a wall behind the start, and a ledge ahead
    let mut physics = PhysicsWorld::new();
    physics.create_ground(0.0);
    physics.create_static_box(Vec3::new(6.0, 2.0, 0.5), Vec3::new(0.0, 2.0, 6.0));
    physics.create_static_box(Vec3::new(3.0, 1.0, 3.0), Vec3::new(0.0, 1.0, -18.0));
    physics.refresh_queries();

    let mut character = CharacterController::new();
    character
        .spawn(&mut physics, Vec3::new(0.0, 0.05, 0.0))
        .context("Failed to spawn character")?;

    let mut movement = MovementController::builder()
        .config(settings.movement.clone())
        .motion_indicator(MotionIndicator::with_config(
            Vec3::new(0.0, 1.0, -3.0),
            settings.motion_indicator.clone(),
        ))
        .facing(Vec3::NEG_Z)
        .build()
        .context("Invalid movement configuration")?;
    movement.add_freeze_listener(Box::new(|frozen: bool| debug!("Freeze listener notified: {}", frozen)));

    let mut camera = CameraController::builder()
        .settings(settings.camera.clone())
        .follow(Transform::from_position(character.position))
        .head_anchor(Transform::from_position(character.eye_offset()))
        .build()
        .context("Invalid camera configuration")?;

    // A zone around the ledge that frames a point above it
    let mut zone = CameraZone::new()
        .with_bounds(Vec3::new(-4.0, -1.0, -24.0), Vec3::new(4.0, 6.0, -12.0))
        .with_point_of_interest(Vec3::new(0.0, 4.0, -22.0))
        .with_camera_attributes(Arc::new(CameraAttributes {
            distance: 8.0,
            ..CameraAttributes::default()
        }))
        .with_time_to_change(1.5);

    let mut time = GameTime::default();
    let mut input = InputState::new();
    let mut last_mode = camera.mode();
    let mut was_grounded = true;

    while (time.total_time as f32) < RUN_SECONDS {
        time.update(FRAME_TIME);
        let now = time.now();
        let dt = time.delta_time;
        apply_script(&mut input, now);

        let output = {
            let mut bound = character.bind(&mut physics).context("Character is not spawned")?;
            movement.simulate(&input, camera.camera_direction(), &mut bound, &time)
        };
        movement.update_indicator(character.position, &physics, dt);
        physics.step();

        let follow = Transform::from_position_rotation(
            character.position,
            Quat::from_rotation_y(yaw_from_direction(output.facing)),
        );

        camera.set_allowed_to_first_person(output.allowed_to_first_person);
        match zone.track(&mut camera, character.position, now, dt) {
            Some(ZoneEvent::Entered) => info!("Entered camera zone at {:.2}s", now),
            Some(ZoneEvent::Exited) => info!("Left camera zone at {:.2}s", now),
            None => {}
        }
        camera.present(&input, &follow, &physics, &time);
        input.clear_frame();

        if output.jumped {
            info!("Jump at {:.2}s", now);
        }
        if output.double_jumped {
            info!("Double jump at {:.2}s", now);
        }
        if output.grounded && !was_grounded {
            info!("Landed at {:.2}s, position {:?}", now, character.position);
        }
        was_grounded = output.grounded;

        if camera.mode() != last_mode {
            info!("Camera {:?} -> {:?} at {:.2}s", last_mode, camera.mode(), now);
            last_mode = camera.mode();
        }
        if camera.mode() == CameraMode::FirstPerson && camera.is_first_person_locked() {
            debug!("First person view at {:?}", camera.position());
        }

        if time.frame_count % 60 == 0 {
            debug!(
                "t={:.1}s character={:?} camera={:?} ratio={:.2} sensor={:.2}",
                now,
                character.position,
                camera.position(),
                camera.mode_ratio(),
                camera.sensor_reading().ratio,
            );
        }
    }

    info!(
        "Finished after {} frames; character at {:?}, camera at {:?}",
        time.frame_count,
        character.position,
        camera.position()
    );

    Ok(())
}
