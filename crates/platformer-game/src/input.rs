//! Per-frame input snapshot
//!
//! Device bindings live outside this crate; whatever maps devices fills an
//! `InputState` each frame with two look axes, two move axes and the button
//! edges the controllers care about.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Buttons read by the controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputButton {
    /// Jump, double jump and jump extension
    Jump,
    /// Secondary action (toggles freeze)
    Secondary,
    /// Snap the camera back to automatic mode
    CameraReset,
}

/// Current state of all inputs for a frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Buttons currently held down
    pub held: HashSet<InputButton>,
    /// Buttons that were just pressed this frame
    pub just_pressed: HashSet<InputButton>,
    /// Buttons that were just released this frame
    pub just_released: HashSet<InputButton>,
    /// Look axes (horizontal, vertical), each in [-1, 1]
    pub look: Vec2,
    /// Move axes (horizontal, vertical), each in [-1, 1]
    pub movement: Vec2,
}

impl InputState {
    /// Create a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a button is currently held
    pub fn is_held(&self, button: InputButton) -> bool {
        self.held.contains(&button)
    }

    /// Check if a button was just pressed this frame
    pub fn is_just_pressed(&self, button: InputButton) -> bool {
        self.just_pressed.contains(&button)
    }

    /// Check if a button was just released this frame
    pub fn is_just_released(&self, button: InputButton) -> bool {
        self.just_released.contains(&button)
    }

    /// Record a press edge; held until released
    pub fn press(&mut self, button: InputButton) {
        if self.held.insert(button) {
            self.just_pressed.insert(button);
        }
    }

    /// Record a release edge
    pub fn release(&mut self, button: InputButton) {
        if self.held.remove(&button) {
            self.just_released.insert(button);
        }
    }

    /// Set both axis pairs, clamping each component into [-1, 1]
    pub fn set_axes(&mut self, look: Vec2, movement: Vec2) {
        self.look = look.clamp(Vec2::NEG_ONE, Vec2::ONE);
        self.movement = movement.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Clear frame-specific data (call at end of frame)
    pub fn clear_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }

    /// Clear all input state
    pub fn clear_all(&mut self) {
        self.held.clear();
        self.just_pressed.clear();
        self.just_released.clear();
        self.look = Vec2::ZERO;
        self.movement = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release_edges() {
        let mut input = InputState::new();
        input.press(InputButton::Jump);
        assert!(input.is_just_pressed(InputButton::Jump));
        assert!(input.is_held(InputButton::Jump));

        input.clear_frame();
        input.press(InputButton::Jump);
        assert!(!input.is_just_pressed(InputButton::Jump));

        input.release(InputButton::Jump);
        assert!(input.is_just_released(InputButton::Jump));
        assert!(!input.is_held(InputButton::Jump));
    }

    #[test]
    fn test_axes_clamped() {
        let mut input = InputState::new();
        input.set_axes(Vec2::new(3.0, -0.5), Vec2::new(-2.0, 0.25));
        assert_eq!(input.look, Vec2::new(1.0, -0.5));
        assert_eq!(input.movement, Vec2::new(-1.0, 0.25));

        input.clear_all();
        assert_eq!(input.look, Vec2::ZERO);
    }
}
