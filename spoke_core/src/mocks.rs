//! Test and helper mocks for spoke_core

use spoke_traits::{BoxError, LineSink};
use std::sync::{Arc, Mutex};

/// A sink that records every line; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LineSink for MemorySink {
    fn write_line(&mut self, line: &str) -> Result<(), BoxError> {
        self.lines
            .lock()
            .map_err(|_| "memory sink poisoned")?
            .push(line.to_string());
        Ok(())
    }
}
