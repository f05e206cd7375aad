//! Timed camera transitions
//!
//! Both transitions here span several frames. They are plain state machines
//! advanced once per present tick and can be dropped or cancelled at any point.

use glam::{Quat, Vec3};
use platformer_core::{lerp, Transform};
use tracing::debug;

/// Look-down input above this keeps a first-person entry going
pub const TRIGGER_AXIS: f32 = 0.9;
/// How long the trigger must be held before the camera starts moving (seconds)
pub const ARM_TIME: f32 = 0.2;
/// Progress gained per second while moving to the head anchor
const ENTRY_RATE: f32 = 2.0;
/// Pitch range of the first-person view (degrees, each side)
pub const PITCH_LIMIT_DEGREES: f32 = 70.0;
/// Progress gained per second while retargeting the look-at smoothing time
const RETARGET_RATE: f32 = 5.0;

/// Where a first-person entry currently is
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryPhase {
    Idle,
    /// Waiting for the trigger to be held long enough
    Arming { held: f32 },
    /// Easing from the starting transform to the head anchor
    Moving { progress: f32, from: Transform },
    /// Sitting at the head anchor, driven by the look sliders
    LockedIn,
}

/// What happened during one `advance` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryStep {
    /// Nothing to do, or still arming
    Waiting,
    /// The trigger was let go while arming
    Aborted,
    /// Arming finished; the camera now belongs to first-person mode
    Entered,
    /// Intermediate camera transform while moving
    Moving(Transform),
    /// The move finished this frame at the given transform
    LockedIn(Transform),
}

/// Resumable transition from any camera mode into the first-person view
#[derive(Debug, Clone)]
pub struct FirstPersonEntry {
    phase: EntryPhase,
}

impl Default for FirstPersonEntry {
    fn default() -> Self {
        Self {
            phase: EntryPhase::Idle,
        }
    }
}

impl FirstPersonEntry {
    pub fn phase(&self) -> EntryPhase {
        self.phase
    }

    /// Arming or moving
    pub fn in_flight(&self) -> bool {
        matches!(self.phase, EntryPhase::Arming { .. } | EntryPhase::Moving { .. })
    }

    pub fn is_locked_in(&self) -> bool {
        self.phase == EntryPhase::LockedIn
    }

    /// Start arming; ignored unless idle
    pub fn arm(&mut self) -> bool {
        if self.phase != EntryPhase::Idle {
            return false;
        }
        debug!("First-person entry armed");
        self.phase = EntryPhase::Arming { held: 0.0 };
        true
    }

    /// Advance by one frame.
    ///
    /// `triggered` tells whether the pitch slider is still pinned with the
    /// look-down axis past [`TRIGGER_AXIS`]; it only matters while arming.
    pub fn advance(&mut self, triggered: bool, current: &Transform, anchor: &Transform, dt: f32) -> EntryStep {
        match self.phase {
            EntryPhase::Idle | EntryPhase::LockedIn => EntryStep::Waiting,
            EntryPhase::Arming { held } => {
                if !triggered {
                    debug!("First-person entry aborted while arming");
                    self.phase = EntryPhase::Idle;
                    return EntryStep::Aborted;
                }
                let held = held + dt;
                if held >= ARM_TIME {
                    self.phase = EntryPhase::Moving {
                        progress: 0.0,
                        from: *current,
                    };
                    EntryStep::Entered
                } else {
                    self.phase = EntryPhase::Arming { held };
                    EntryStep::Waiting
                }
            }
            EntryPhase::Moving { progress, from } => {
                let progress = progress + dt * ENTRY_RATE;
                if progress >= 1.0 {
                    self.phase = EntryPhase::LockedIn;
                    return EntryStep::LockedIn(Transform::from_position_rotation(
                        anchor.position,
                        anchor.rotation,
                    ));
                }
                self.phase = EntryPhase::Moving { progress, from };
                let t = progress * progress;
                EntryStep::Moving(Transform::from_position_rotation(
                    from.position.lerp(anchor.position, t),
                    from.rotation.slerp(anchor.rotation, t),
                ))
            }
        }
    }

    /// Drop any transition in flight and leave the locked-in view.
    ///
    /// Returns true when a transition was interrupted.
    pub fn cancel(&mut self) -> bool {
        let interrupted = self.in_flight();
        if interrupted {
            debug!("First-person entry cancelled");
        }
        self.phase = EntryPhase::Idle;
        interrupted
    }
}

/// Rotation of the locked-in first-person view.
///
/// `base` is yawed about `up` by `yaw_slider · 360°`, then pitched about its
/// own right axis by up to [`PITCH_LIMIT_DEGREES`]; a positive pitch slider
/// tilts the view down.
pub fn first_person_rotation(base: Quat, up: Vec3, yaw_slider: f32, pitch_slider: f32) -> Quat {
    let up = up.try_normalize().unwrap_or(Vec3::Y);
    let yawed = Quat::from_axis_angle(up, (yaw_slider * 360.0).to_radians()) * base;

    let pitch = if pitch_slider < 0.0 {
        lerp(-PITCH_LIMIT_DEGREES, 0.0, pitch_slider + 1.0)
    } else {
        lerp(0.0, PITCH_LIMIT_DEGREES, pitch_slider)
    };
    let right = yawed * Vec3::X;
    (Quat::from_axis_angle(right, -pitch.to_radians()) * yawed).normalize()
}

/// Eases the look-at smoothing time toward a new value over a fifth of a second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAtRetarget {
    from: f32,
    to: f32,
    progress: f32,
}

impl LookAtRetarget {
    pub fn new(from: f32, to: f32) -> Self {
        Self { from, to, progress: 0.0 }
    }

    /// Step the transition; returns the current value and whether it finished
    pub fn advance(&mut self, dt: f32) -> (f32, bool) {
        self.progress += dt * RETARGET_RATE;
        if self.progress >= 1.0 {
            return (self.to, true);
        }
        (lerp(self.from, self.to, self.progress), false)
    }

    pub fn target(&self) -> f32 {
        self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.05;

    fn anchor() -> Transform {
        Transform::from_position_rotation(Vec3::new(0.0, 1.7, 0.0), Quat::from_rotation_y(1.0))
    }

    #[test]
    fn test_arming_requires_sustained_trigger() {
        let mut entry = FirstPersonEntry::default();
        let current = Transform::from_position(Vec3::new(0.0, 4.0, 6.0));
        assert!(entry.arm());
        assert!(!entry.arm());

        assert_eq!(entry.advance(true, &current, &anchor(), DT), EntryStep::Waiting);
        assert_eq!(entry.advance(false, &current, &anchor(), DT), EntryStep::Aborted);
        assert_eq!(entry.phase(), EntryPhase::Idle);
    }

    #[test]
    fn test_entry_reaches_head_anchor() {
        let mut entry = FirstPersonEntry::default();
        let current = Transform::from_position(Vec3::new(0.0, 4.0, 6.0));
        entry.arm();

        let mut frames = 0;
        while entry.advance(true, &current, &anchor(), DT) == EntryStep::Waiting {
            frames += 1;
            assert!(frames < 10, "arming never finished");
        }
        assert!(matches!(entry.phase(), EntryPhase::Moving { .. }));

        // Eased: the first step covers less than its share of the distance
        let EntryStep::Moving(first) = entry.advance(false, &current, &anchor(), DT) else {
            panic!("expected the camera to be moving");
        };
        let travelled = current.position.distance(first.position) / current.position.distance(anchor().position);
        assert!(travelled > 0.0 && travelled < DT * ENTRY_RATE);

        let mut last = EntryStep::Waiting;
        for _ in 0..20 {
            last = entry.advance(false, &current, &anchor(), DT);
            if matches!(last, EntryStep::LockedIn(_)) {
                break;
            }
        }
        let EntryStep::LockedIn(locked) = last else {
            panic!("expected the entry to lock in");
        };
        assert_eq!(locked.position, anchor().position);
        assert!(entry.is_locked_in());
    }

    #[test]
    fn test_cancel_mid_move() {
        let mut entry = FirstPersonEntry::default();
        let current = Transform::default();
        entry.arm();
        for _ in 0..6 {
            entry.advance(true, &current, &anchor(), DT);
        }
        assert!(matches!(entry.phase(), EntryPhase::Moving { .. }));
        assert!(entry.cancel());
        assert_eq!(entry.phase(), EntryPhase::Idle);
        assert!(!entry.cancel());
    }

    #[test]
    fn test_first_person_rotation_limits() {
        let level = first_person_rotation(Quat::IDENTITY, Vec3::Y, 0.0, 0.0);
        assert!((level * -Vec3::Z).distance(-Vec3::Z) < 1e-5);

        let down = first_person_rotation(Quat::IDENTITY, Vec3::Y, 0.0, 1.0) * -Vec3::Z;
        let angle = down.angle_between(-Vec3::Z).to_degrees();
        assert!((angle - PITCH_LIMIT_DEGREES).abs() < 1e-3);
        assert!(down.y < 0.0);

        let quarter = first_person_rotation(Quat::IDENTITY, Vec3::Y, 0.25, 0.0) * -Vec3::Z;
        assert!(quarter.distance(-Vec3::X) < 1e-5);
    }

    #[test]
    fn test_look_at_retarget() {
        let mut retarget = LookAtRetarget::new(0.2, 1.2);
        let (value, done) = retarget.advance(0.1);
        assert!((value - 0.7).abs() < 1e-5);
        assert!(!done);
        assert_eq!(retarget.advance(0.1), (1.2, true));
    }
}
