//! The single consumer: drains the event queue and fans each line out to
//! every sink, in queue order.

use spoke_traits::{BoxError, LineSink};
use std::io::Write;
use tracing::{debug, warn};

use crate::event::Event;
use crate::queue::EventReceiver;

/// Counters reported when the dispatcher exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub delivered: u64,
    pub sink_errors: u64,
}

pub struct Dispatcher {
    sinks: Vec<Box<dyn LineSink + Send>>,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new(sinks: Vec<Box<dyn LineSink + Send>>) -> Self {
        Self {
            sinks,
            stats: DispatchStats::default(),
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Hand one event to every sink. A failing sink is logged and skipped;
    /// the others still get the line.
    pub fn dispatch(&mut self, event: &Event) {
        let line = event.as_str();
        for (idx, sink) in self.sinks.iter_mut().enumerate() {
            if let Err(e) = sink.write_line(line) {
                self.stats.sink_errors += 1;
                warn!(sink = idx, line, error = %e, "sink write failed");
            }
        }
        self.stats.delivered += 1;
    }

    /// Forward events until every producer is gone and the queue is empty.
    pub fn run(mut self, rx: &EventReceiver) -> DispatchStats {
        while let Some(ev) = rx.pop() {
            self.dispatch(&ev);
        }
        debug!(delivered = self.stats.delivered, "dispatcher drained");
        self.stats
    }
}

/// Line sink over any `io::Write`: one line per event, flushed immediately.
pub struct WriterSink<W> {
    inner: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> LineSink for WriterSink<W> {
    fn write_line(&mut self, line: &str) -> Result<(), BoxError> {
        writeln!(self.inner, "{line}")?;
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MemorySink;
    use crate::queue::event_queue;

    struct Failing;

    impl LineSink for Failing {
        fn write_line(&mut self, _line: &str) -> Result<(), BoxError> {
            Err("link down".into())
        }
    }

    #[test]
    fn both_sinks_see_the_same_sequence() {
        let a = MemorySink::new();
        let b = MemorySink::new();
        let (tx, rx) = event_queue(8);
        for id in [1, 2, 6] {
            tx.push(Event::digital(id, true)).expect("push");
        }
        drop(tx);
        let stats = Dispatcher::new(vec![Box::new(a.clone()), Box::new(b.clone())]).run(&rx);
        assert_eq!(stats.delivered, 3);
        assert_eq!(a.lines(), ["1:1.00", "2:1.00", "6:1.00"]);
        assert_eq!(a.lines(), b.lines());
    }

    #[test]
    fn failing_sink_does_not_starve_the_other() {
        let ok = MemorySink::new();
        let mut d = Dispatcher::new(vec![Box::new(Failing), Box::new(ok.clone())]);
        d.dispatch(&Event::weight(9, 1.5));
        assert_eq!(ok.lines(), ["9:1.50"]);
        assert_eq!(d.stats(), DispatchStats { delivered: 1, sink_errors: 1 });
    }

    #[test]
    fn writer_sink_terminates_lines() {
        let mut sink = WriterSink::new(Vec::new());
        sink.write_line("0:0.70").expect("write");
        sink.write_line("0:0.80").expect("write");
        assert_eq!(sink.into_inner(), b"0:0.70\n0:0.80\n");
    }
}
