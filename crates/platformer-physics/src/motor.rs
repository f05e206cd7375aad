//! Character-motion contracts used by the locomotion controller

use glam::Vec3;

/// Moves a character shape through the world once per simulate tick
pub trait CharacterMotor {
    /// Apply a displacement with collision resolution
    fn move_by(&mut self, displacement: Vec3, dt: f32);

    /// Ground contact as of the last move
    fn is_grounded(&self) -> bool;

    /// Feet position of the character
    fn position(&self) -> Vec3;
}

/// Swaps a body between controller-driven (kinematic) and physics-driven
pub trait KinematicBody {
    fn is_kinematic(&self) -> bool;

    fn set_kinematic(&mut self, kinematic: bool);
}
