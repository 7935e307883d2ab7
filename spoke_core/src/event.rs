//! Wire events: `"<source_id>:<value>"`, value with two decimals.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::packet::Measurement;

/// Numeric tag identifying a sensor slot on the wire.
pub type SourceId = u8;

/// Longest event line, in bytes.
pub const EVENT_CAPACITY: usize = 64;

/// A fixed-capacity text record, copied by value through the queue.
#[derive(Clone, Copy)]
pub struct Event {
    len: u8,
    buf: [u8; EVENT_CAPACITY],
}

impl Event {
    pub fn gauge(source: SourceId, m: Measurement) -> Self {
        Self::render(source, m.mm())
    }

    /// Contact transition; the level is rendered like a reading (`1.00`).
    pub fn digital(source: SourceId, level: bool) -> Self {
        Self::render(source, if level { 1.0 } else { 0.0 })
    }

    pub fn weight(source: SourceId, kg: f32) -> Self {
        Self::render(source, kg)
    }

    fn render(source: SourceId, value: f32) -> Self {
        use fmt::Write;
        let mut ev = Self {
            len: 0,
            buf: [0; EVENT_CAPACITY],
        };
        // a u8 tag and an f32 always fit; overflow would only truncate
        let _ = write!(ev, "{source}:{value:.2}");
        ev
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.buf[..usize::from(self.len)]).unwrap_or_default()
    }

    /// Parse the line back into its parts.
    pub fn line(&self) -> Result<EventLine, ParseEventError> {
        self.as_str().parse()
    }
}

impl fmt::Write for Event {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let at = usize::from(self.len);
        let room = EVENT_CAPACITY - at;
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[at..at + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len = u8::try_from(at + take).unwrap_or(u8::MAX);
        if take < s.len() { Err(fmt::Error) } else { Ok(()) }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Event {}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Event").field(&self.as_str()).finish()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A received event line split into source and value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventLine {
    pub source: SourceId,
    pub value: f32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseEventError {
    #[error("missing ':' separator")]
    MissingSeparator,
    #[error("invalid source id {0:?}")]
    Source(String),
    #[error("invalid value {0:?}")]
    Value(String),
}

impl FromStr for EventLine {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, value) = s
            .trim()
            .split_once(':')
            .ok_or(ParseEventError::MissingSeparator)?;
        let source = source
            .parse()
            .map_err(|_| ParseEventError::Source(source.to_string()))?;
        let value = value
            .parse()
            .map_err(|_| ParseEventError::Value(value.to_string()))?;
        Ok(Self { source, value })
    }
}

/// Well-known source ids used by the receiving application.
pub mod roles {
    use super::SourceId;

    pub const TENSION_GAUGE: SourceId = 0;
    pub const LATERAL_GAUGE: SourceId = 1;
    pub const RADIAL_GAUGE: SourceId = 2;
    pub const PEDAL: SourceId = 6;
    pub const SCALE: SourceId = 9;
}
