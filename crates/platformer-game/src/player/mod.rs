//! Player controller module
//!
//! Camera-relative locomotion with jumps, air control and a motion indicator.

mod controller;
mod freeze;
mod indicator;
mod movement;

pub use controller::{MovementController, MovementControllerBuilder, MovementOutput};
pub use freeze::FreezeListener;
pub use indicator::{MotionIndicator, MotionIndicatorConfig};
pub use movement::MovementConfig;
