//! 24-bit gauge packet assembly and interpretation.
//!
//! The gauge protocol has no start/stop framing the decoder can see, so a
//! packet boundary is inferred from timing alone: any bit timeout throws
//! away the partial packet and starts over at bit 0, until the overall
//! packet deadline runs out.

use spoke_traits::Clock;
use std::fmt;
use std::time::Duration;
use tracing::trace;

use crate::bit::{BitSampler, RawBit};

/// Bits per gauge packet.
pub const PACKET_BITS: u32 = 24;
/// Bits carrying the magnitude in hundredths of a unit.
pub const MAGNITUDE_MASK: u32 = 0x0FFF;
/// Set when the reading is negative.
pub const SIGN_BIT: u32 = 1 << 20;
/// Set when the gauge is in inch mode.
pub const INCH_BIT: u32 = 1 << 23;

/// A decoded packet, or the record that none arrived before the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet {
    Valid(u32),
    TimedOut,
}

impl Packet {
    pub fn is_valid(self) -> bool {
        matches!(self, Packet::Valid(_))
    }

    pub fn raw(self) -> Option<u32> {
        match self {
            Packet::Valid(v) => Some(v),
            Packet::TimedOut => None,
        }
    }
}

/// Assemble one packet, bit 0 first.
///
/// A bit timeout restarts accumulation from bit 0 unless more than
/// `packet_timeout` has passed since entry, in which case the result is
/// `Packet::TimedOut`.
pub fn read_packet<B, K>(
    sampler: &mut B,
    clock: &K,
    bit_timeout: Duration,
    packet_timeout: Duration,
) -> Packet
where
    B: BitSampler + ?Sized,
    K: Clock + ?Sized,
{
    let start = clock.now();
    let mut value: u32 = 0;
    let mut index: u32 = 0;
    while index < PACKET_BITS {
        match sampler.sample(bit_timeout) {
            RawBit::Timeout => {
                if clock.expired(start, packet_timeout) {
                    trace!(elapsed_ms = clock.ms_since(start), "packet deadline passed");
                    return Packet::TimedOut;
                }
                if index > 0 {
                    trace!(discarded_bits = index, "bit timeout, resynchronizing");
                }
                value = 0;
                index = 0;
            }
            RawBit::One => {
                value |= 1 << index;
                index += 1;
            }
            RawBit::Zero => index += 1,
        }
    }
    trace!(packet = value, "packet decoded");
    Packet::Valid(value)
}

/// Gauge deflection in millimetres, or [`Measurement::NO_READING`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement(f32);

impl Measurement {
    /// Reserved value for "no packet was obtained".
    pub const NO_READING: Measurement = Measurement(-1000.0);

    pub fn from_mm(mm: f32) -> Self {
        Self(mm)
    }

    #[inline]
    pub fn mm(self) -> f32 {
        self.0
    }

    pub fn is_reading(self) -> bool {
        self != Self::NO_READING
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Turn a packet into millimetres.
///
/// Low 12 bits are the magnitude in hundredths, bit 20 negates, bit 23
/// selects inch mode. Inch readings count half-thousandths: the signed value
/// is halved with integer truncation *before* scaling by 2.54, matching the
/// gauge firmware's integer conversion.
pub fn interpret(packet: Packet) -> Measurement {
    let Packet::Valid(raw) = packet else {
        return Measurement::NO_READING;
    };
    let magnitude = (raw & MAGNITUDE_MASK) as i32;
    let value = if raw & SIGN_BIT != 0 {
        -magnitude
    } else {
        magnitude
    };
    if raw & INCH_BIT != 0 {
        let halved = value / 2;
        return Measurement(halved as f32 * 2.54 / 100.0);
    }
    Measurement(value as f32 / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spoke_traits::clock::test_clock::TestClock;
    use std::collections::VecDeque;

    /// Replays bits; each sample costs `cost`, a timeout costs the full bit timeout.
    struct ScriptedBits {
        bits: VecDeque<RawBit>,
        clock: TestClock,
        cost: Duration,
    }

    impl BitSampler for ScriptedBits {
        fn sample(&mut self, bit_timeout: Duration) -> RawBit {
            let bit = self.bits.pop_front().unwrap_or(RawBit::Timeout);
            if bit == RawBit::Timeout {
                self.clock.advance(bit_timeout + Duration::from_millis(1));
            } else {
                self.clock.advance(self.cost);
            }
            bit
        }
    }

    fn bits_of(value: u32) -> Vec<RawBit> {
        (0..PACKET_BITS).map(|i| RawBit::from(value >> i & 1 == 1)).collect()
    }

    fn scripted(bits: Vec<RawBit>) -> (ScriptedBits, TestClock) {
        let clock = TestClock::new();
        (
            ScriptedBits {
                bits: bits.into(),
                clock: clock.clone(),
                cost: Duration::from_micros(500),
            },
            clock,
        )
    }

    const BIT: Duration = Duration::from_millis(100);
    const PACKET: Duration = Duration::from_millis(250);

    #[test]
    fn assembles_lsb_first() {
        let (mut s, clock) = scripted(bits_of(0x80_0123));
        assert_eq!(read_packet(&mut s, &clock, BIT, PACKET), Packet::Valid(0x80_0123));
    }

    #[test]
    fn bit_timeout_discards_partial_packet() {
        let mut bits = vec![RawBit::One; 10];
        bits.push(RawBit::Timeout);
        bits.extend(bits_of(5));
        let (mut s, clock) = scripted(bits);
        assert_eq!(read_packet(&mut s, &clock, BIT, PACKET), Packet::Valid(5));
    }

    #[test]
    fn gives_up_after_packet_deadline() {
        let bits = vec![RawBit::Timeout, RawBit::One, RawBit::Timeout, RawBit::Timeout];
        let (mut s, clock) = scripted(bits);
        assert_eq!(read_packet(&mut s, &clock, BIT, PACKET), Packet::TimedOut);
        // third timeout lands past 250 ms
        assert!(clock.elapsed() > PACKET);
    }

    #[test]
    fn interpret_scenarios() {
        assert!((interpret(Packet::Valid(5)).mm() - 0.05).abs() < 1e-6);
        let p = 100 | SIGN_BIT | INCH_BIT;
        assert!((interpret(Packet::Valid(p)).mm() + 1.27).abs() < 1e-6);
        assert_eq!(interpret(Packet::TimedOut), Measurement::NO_READING);
    }

    #[test]
    fn inch_mode_truncates_before_scaling() {
        // 101 / 2 -> 50 (not 50.5), 50 * 2.54 = 127 -> 1.27 mm
        let m = interpret(Packet::Valid(101 | INCH_BIT));
        assert!((m.mm() - 1.27).abs() < 1e-6);
        let m = interpret(Packet::Valid(101 | INCH_BIT | SIGN_BIT));
        assert!((m.mm() + 1.27).abs() < 1e-6);
    }

    #[test]
    fn upper_bits_outside_flags_are_ignored() {
        let noisy = 0x0F_F000 & !SIGN_BIT;
        assert!((interpret(Packet::Valid(noisy | 42)).mm() - 0.42).abs() < 1e-6);
    }
}
