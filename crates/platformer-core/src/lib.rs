//! Platformer Core - Core types and utilities for the platformer controllers
//!
//! This crate provides the foundational types used throughout the workspace:
//! - Mathematical primitives (re-exported from glam)
//! - Transform component for camera and character positioning
//! - Frame clock for elapsed and delta time
//! - Critically-damped smoothing and tunable curves
//! - Layer masks for environment queries

pub mod curve;
pub mod math;
pub mod smooth;
pub mod time;
pub mod types;

pub use glam::{Quat, Vec2, Vec3};
pub use curve::{Curve, CurveError, CurveKey};
pub use math::{clamp01, flatten, lerp, normalized_span, wrap01, yaw_from_direction};
pub use smooth::SmoothDamp;
pub use time::{GameTime, TimeConfig};
pub use types::{EntityId, LayerMask, Transform};
