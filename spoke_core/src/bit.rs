//! Single-bit sampling on a gauge clock/data pair.
//!
//! A gauge clocks one data bit per clock cycle. The sampler waits for the
//! clock to leave its active level, then for it to come back, and reads the
//! data line at that second transition. Both waits share one deadline
//! measured from call entry.

use spoke_traits::{Clock, SignalLine};
use std::time::Duration;

use crate::util::spin_while;

/// ADC threshold of the analog front end (11-bit reads, 6 dB attenuation).
pub const DEFAULT_ADC_THRESHOLD: u16 = 1100;

/// Outcome of one bit sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawBit {
    Zero,
    One,
    Timeout,
}

impl From<bool> for RawBit {
    #[inline]
    fn from(b: bool) -> Self {
        if b { RawBit::One } else { RawBit::Zero }
    }
}

/// Decides whether a raw line reading counts as the "active" level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// Noisy analog lines: active above the threshold.
    Analog { threshold: u16 },
    /// Lines buffered through an inverting transistor: active when low.
    DigitalInverted,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::Analog {
            threshold: DEFAULT_ADC_THRESHOLD,
        }
    }
}

impl Comparator {
    #[inline]
    pub fn is_active(self, level: u16) -> bool {
        match self {
            Self::Analog { threshold } => level > threshold,
            Self::DigitalInverted => level == 0,
        }
    }
}

/// Source of clock-synchronized bits.
///
/// The polled implementation below busy-waits on the lines; a platform with
/// edge interrupts can provide its own and reuse the packet decoder as is.
pub trait BitSampler {
    fn sample(&mut self, bit_timeout: Duration) -> RawBit;
}

impl<T: BitSampler + ?Sized> BitSampler for Box<T> {
    fn sample(&mut self, bit_timeout: Duration) -> RawBit {
        (**self).sample(bit_timeout)
    }
}

/// Busy-polling bit sampler over two `SignalLine`s.
pub struct PolledBitSampler<L, D, K> {
    clock_line: L,
    data_line: D,
    comparator: Comparator,
    clock: K,
}

impl<L, D, K> PolledBitSampler<L, D, K>
where
    L: SignalLine,
    D: SignalLine,
    K: Clock,
{
    pub fn new(clock_line: L, data_line: D, comparator: Comparator, clock: K) -> Self {
        Self {
            clock_line,
            data_line,
            comparator,
            clock,
        }
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }
}

impl<L, D, K> BitSampler for PolledBitSampler<L, D, K>
where
    L: SignalLine,
    D: SignalLine,
    K: Clock,
{
    fn sample(&mut self, bit_timeout: Duration) -> RawBit {
        let start = self.clock.now();
        let cmp = self.comparator;
        let line = &mut self.clock_line;

        if !spin_while(&self.clock, start, bit_timeout, || cmp.is_active(line.level())) {
            return RawBit::Timeout;
        }
        if !spin_while(&self.clock, start, bit_timeout, || !cmp.is_active(line.level())) {
            return RawBit::Timeout;
        }
        RawBit::from(cmp.is_active(self.data_line.level()))
    }
}
