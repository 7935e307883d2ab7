use spoke_traits::{Clock, ContactInput};
use std::time::Duration;
use tracing::debug;

use super::{SamplingTask, Shutdown};
use crate::debounce::DebounceState;
use crate::error::SpokeError;
use crate::event::{Event, SourceId};
use crate::queue::EventSender;

/// Per-contact state: the debouncer seeded with the level at task start.
pub type ContactState = DebounceState;

/// Samples one contact, emitting its level on every completed toggle.
pub struct ContactTask<I, K> {
    source: SourceId,
    input: I,
    clock: K,
    poll: Duration,
    state: ContactState,
}

impl<I, K> ContactTask<I, K>
where
    I: ContactInput,
    K: Clock,
{
    /// Reads the contact once to establish the rest level.
    pub fn new(source: SourceId, mut input: I, clock: K, poll: Duration) -> Self {
        let state = DebounceState::new(input.is_high());
        Self {
            source,
            input,
            clock,
            poll,
            state,
        }
    }

    pub fn state(&self) -> ContactState {
        self.state
    }

    /// Sample and debounce once, without the pacing delay.
    pub fn sample(&mut self) -> Option<Event> {
        let level = self.input.is_high();
        let fired = self.state.process(level)?;
        debug!(source_id = self.source, level = fired, "contact toggled");
        Some(Event::digital(self.source, fired))
    }
}

impl<I, K> SamplingTask for ContactTask<I, K>
where
    I: ContactInput + Send,
    K: Clock + Send,
{
    fn source(&self) -> SourceId {
        self.source
    }

    fn kind(&self) -> &'static str {
        "contact"
    }

    fn poll_once(&mut self, tx: &EventSender, shutdown: &Shutdown) -> Result<(), SpokeError> {
        if let Some(ev) = self.sample() {
            tx.push(ev)?;
        }
        shutdown.pause(&self.clock, self.poll);
        Ok(())
    }
}
