//! Bounded MPSC event queue.
//!
//! Producers block on a full queue instead of dropping; FIFO order holds per
//! producer, and every pushed event is popped exactly once.
use crossbeam_channel as xch;
use std::time::Duration;

use crate::error::SpokeError;
use crate::event::Event;

/// Queue depth used when nothing else is configured.
pub const DEFAULT_CAPACITY: usize = 20;

/// Create a queue holding at most `capacity` events (clamped to 1).
pub fn event_queue(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = xch::bounded(capacity.max(1));
    (EventSender { tx }, EventReceiver { rx })
}

/// Producer half; clone one per sampling task.
#[derive(Clone)]
pub struct EventSender {
    tx: xch::Sender<Event>,
}

impl EventSender {
    /// Enqueue, waiting for room. Fails only once the receiver is gone.
    pub fn push(&self, event: Event) -> Result<(), SpokeError> {
        self.tx.send(event).map_err(|_| SpokeError::QueueClosed)
    }

    /// Non-blocking variant; hands the event back when the queue is full.
    pub fn try_push(&self, event: Event) -> Result<(), xch::TrySendError<Event>> {
        self.tx.try_send(event)
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tx.is_full()
    }
}

/// Consumer half, owned by the dispatch task.
pub struct EventReceiver {
    rx: xch::Receiver<Event>,
}

impl EventReceiver {
    /// Wait for the next event; `None` once every sender is dropped and the
    /// queue has drained.
    pub fn pop(&self) -> Option<Event> {
        self.rx.recv().ok()
    }

    /// Like [`pop`](Self::pop) but gives up after `timeout`.
    pub fn pop_timeout(&self, timeout: Duration) -> Result<Event, xch::RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub fn try_pop(&self) -> Option<Event> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.rx.capacity()
    }
}
