// src/engine/run_state.rs

/// Whether the monitor keeps looping, and whether the next iteration must
/// run a full cycle even without changes.
///
/// Both flags start set: the first iteration always builds and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    active: bool,
    forced_once: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            active: true,
            forced_once: true,
        }
    }
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Force one cycle on the next iteration.
    pub fn allow_once(&mut self) {
        self.forced_once = true;
    }

    /// Consume the forced-cycle flag.
    pub fn take_forced(&mut self) -> bool {
        std::mem::replace(&mut self.forced_once, false)
    }
}
