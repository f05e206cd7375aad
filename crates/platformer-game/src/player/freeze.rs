//! Freeze notifications
//!
//! Freezing hands the character over to the physics simulation for scripted
//! sequences. Listeners hear about it before the swap happens.

/// Observer of freeze toggles
pub trait FreezeListener {
    /// `frozen` is the state the character is about to enter
    fn on_freeze(&mut self, frozen: bool);
}

impl<F> FreezeListener for F
where
    F: FnMut(bool),
{
    fn on_freeze(&mut self, frozen: bool) {
        self(frozen)
    }
}
