//! Platformer Game - camera and locomotion controllers
//!
//! Provides the orbit camera with its zones and profiles, the player movement
//! controller, and the per-frame input snapshot both read from.

pub mod camera;
mod error;
pub mod input;
pub mod player;

pub use camera::{
    CameraAttributes, CameraController, CameraMode, CameraSettings, CameraZone, HeightAttributes,
    PointOfInterest, ZoneEvent,
};
pub use error::ConfigError;
pub use input::{InputButton, InputState};
pub use player::{
    FreezeListener, MotionIndicator, MotionIndicatorConfig, MovementConfig, MovementController,
    MovementOutput,
};
