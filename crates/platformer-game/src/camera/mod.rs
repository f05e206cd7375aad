//! Camera system module
//!
//! Orbit camera for a third-person platformer: automatic follow with terrain
//! sensing, manual orbit, a hybrid blend back to automatic, and a first-person
//! view at the head anchor. Zones steer it with points of interest and
//! swappable profiles.

mod attributes;
mod config;
mod controller;
mod first_person;
mod height;
mod interest;
mod zone;

pub use attributes::{CameraAttributes, HeightAttributes, ProbeSettings, ProfileSlot};
pub use config::CameraSettings;
pub use controller::{CameraController, CameraControllerBuilder, CameraMode};
pub use first_person::{first_person_rotation, EntryPhase, EntryStep, FirstPersonEntry, LookAtRetarget};
pub use height::{HeightSensor, SensorReading, Terrain};
pub use interest::PointOfInterest;
pub use zone::{CameraZone, ZoneEvent};
