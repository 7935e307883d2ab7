//! Sampling tasks: one independent loop per sensor source.
//!
//! Each task owns its sensor handle and its per-source state; the event
//! queue is the only thing tasks share. A task runs until the shutdown flag
//! is raised or the queue's consumer disappears.

mod contact;
mod gauge;
mod scale;

pub use contact::{ContactState, ContactTask};
pub use gauge::{GaugeState, GaugeTask};
pub use scale::ScaleTask;

use spoke_traits::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::SpokeError;
use crate::event::SourceId;
use crate::queue::EventSender;
use crate::util::PAUSE_SLICE;

/// Cooperative stop flag shared by every task of a pipeline.
#[derive(Debug, Clone, Default)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Sleep for `d` in slices, returning early (false) once a stop is
    /// requested.
    pub fn pause<K: Clock + ?Sized>(&self, clock: &K, d: Duration) -> bool {
        let mut left = d;
        while !left.is_zero() {
            if self.is_requested() {
                return false;
            }
            let slice = left.min(PAUSE_SLICE);
            clock.sleep(slice);
            left -= slice;
        }
        !self.is_requested()
    }
}

/// One sensor's sampling loop body.
pub trait SamplingTask: Send {
    fn source(&self) -> SourceId;

    /// Short label for logs and thread names ("gauge", "contact", "scale").
    fn kind(&self) -> &'static str;

    /// Run one iteration, pushing whatever events it produces.
    ///
    /// Sensor trouble never surfaces here; the only error is a closed queue.
    fn poll_once(&mut self, tx: &EventSender, shutdown: &Shutdown) -> Result<(), SpokeError>;
}

impl<T: SamplingTask + ?Sized> SamplingTask for Box<T> {
    fn source(&self) -> SourceId {
        (**self).source()
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn poll_once(&mut self, tx: &EventSender, shutdown: &Shutdown) -> Result<(), SpokeError> {
        (**self).poll_once(tx, shutdown)
    }
}

/// Drive `task` until shutdown or until the consumer is gone.
pub fn run<T: SamplingTask + ?Sized>(task: &mut T, tx: &EventSender, shutdown: &Shutdown) {
    let source = task.source();
    let kind = task.kind();
    info!(source_id = source, kind, "sampling task started");
    while !shutdown.is_requested() {
        if let Err(e) = task.poll_once(tx, shutdown) {
            warn!(source_id = source, kind, error = %e, "sampling task stopping early");
            break;
        }
    }
    info!(source_id = source, kind, "sampling task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use spoke_traits::clock::test_clock::TestClock;

    #[test]
    fn pause_sleeps_full_duration() {
        let clock = TestClock::new();
        assert!(Shutdown::new().pause(&clock, Duration::from_millis(125)));
        assert_eq!(clock.elapsed(), Duration::from_millis(125));
    }

    #[test]
    fn pause_returns_early_when_stopped() {
        let clock = TestClock::new();
        let stop = Shutdown::new();
        stop.request();
        assert!(!stop.pause(&clock, Duration::from_secs(5)));
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }
}
