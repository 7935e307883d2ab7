//! Full-toggle debounce for mechanical contacts.
//!
//! An event needs two level changes: the contact must go out and come back.
//! A single bounce edge only arms the toggle; the next change fires and
//! reports the level the contact returned to.

/// Per-contact state, owned by the contact's sampling task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceState {
    last_level: bool,
    pending_toggle: bool,
}

impl DebounceState {
    /// Start at rest on the level read at task start.
    pub fn new(initial_level: bool) -> Self {
        Self {
            last_level: initial_level,
            pending_toggle: false,
        }
    }

    pub fn last_level(&self) -> bool {
        self.last_level
    }

    pub fn is_armed(&self) -> bool {
        self.pending_toggle
    }

    /// Feed one raw sample. Returns the new level when a full toggle
    /// completes.
    pub fn process(&mut self, sample: bool) -> Option<bool> {
        if sample == self.last_level {
            return None;
        }
        self.last_level = sample;
        if self.pending_toggle {
            self.pending_toggle = false;
            Some(sample)
        } else {
            self.pending_toggle = true;
            None
        }
    }
}
