//! Busy-poll and pacing helpers shared by the samplers and task loops.

use spoke_traits::Clock;
use std::time::{Duration, Instant};

/// Longest single sleep a task takes before re-checking its shutdown flag.
pub const PAUSE_SLICE: Duration = Duration::from_millis(50);

/// Spin while `cond` holds. Returns false if `limit` (measured from `start`)
/// ran out first. Never yields: edge timing on the gauge lines is tighter
/// than a scheduler tick.
#[inline]
pub fn spin_while<K: Clock + ?Sized>(
    clock: &K,
    start: Instant,
    limit: Duration,
    mut cond: impl FnMut() -> bool,
) -> bool {
    while cond() {
        if clock.expired(start, limit) {
            return false;
        }
        std::hint::spin_loop();
    }
    true
}

