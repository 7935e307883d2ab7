//! Simulated sensors.
//!
//! Everything here is driven by a `Clock`: line levels are a pure function
//! of elapsed time, so the same simulation runs in real time on
//! `MonotonicClock` and deterministically on the test clock (where each
//! read can be given a cost that moves time forward).

use spoke_traits::{AdvertisementSource, BoxError, Clock, ContactInput, SignalLine};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

/// ADC counts produced for an "active" analog level.
pub const ANALOG_HIGH: u16 = 1800;
/// ADC counts produced for an "inactive" analog level.
pub const ANALOG_LOW: u16 = 200;

const PACKET_BITS: u128 = 24;
const SIGN_BIT: u32 = 1 << 20;
const INCH_BIT: u32 = 1 << 23;

/// How a logical line state turns into a raw reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEncoding {
    /// Analog front end: active lines read above the ADC threshold.
    Analog { active: u16, inactive: u16 },
    /// Transistor stage: lines are inverted, active reads as 0.
    DigitalInverted,
}

impl LineEncoding {
    pub const fn analog() -> Self {
        Self::Analog {
            active: ANALOG_HIGH,
            inactive: ANALOG_LOW,
        }
    }

    #[inline]
    fn level(self, active: bool) -> u16 {
        match self {
            Self::Analog { active: a, inactive: i } => {
                if active {
                    a
                } else {
                    i
                }
            }
            Self::DigitalInverted => u16::from(!active),
        }
    }
}

/// Build the 24-bit gauge packet a real gauge sends for `mm`.
pub fn encode_packet(mm: f32) -> u32 {
    let hundredths = ((mm.abs() * 100.0).round() as u32) & 0x0FFF;
    if mm.is_sign_negative() && hundredths != 0 {
        hundredths | SIGN_BIT
    } else {
        hundredths
    }
}

/// Same as [`encode_packet`] but in the gauge's inch mode, where the
/// magnitude counts half-thousandths of an inch.
pub fn encode_packet_inches(half_thou: i32) -> u32 {
    let magnitude = half_thou.unsigned_abs() & 0x0FFF;
    let sign = if half_thou < 0 { SIGN_BIT } else { 0 };
    magnitude | sign | INCH_BIT
}

/// Clock waveform of the simulated gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeTiming {
    /// One full clock cycle per data bit.
    pub bit_period: Duration,
    /// Idle time between frames; the clock rests at its active level.
    pub frame_gap: Duration,
}

impl Default for GaugeTiming {
    fn default() -> Self {
        Self {
            bit_period: Duration::from_micros(400),
            frame_gap: Duration::from_millis(80),
        }
    }
}

impl GaugeTiming {
    /// Time one complete 24-bit frame occupies on the wire.
    pub fn frame_len(&self) -> Duration {
        self.bit_period.saturating_mul(PACKET_BITS as u32)
    }
}

/// A dial gauge that streams packets over a clock/data pair.
///
/// Each frame repeats the packet scheduled for the frame's start time;
/// `packets` are cycled through, each held for `hold`.
pub struct SimulatedGauge<C> {
    clock: C,
    encoding: LineEncoding,
    timing: GaugeTiming,
    packets: Vec<u32>,
    hold: Duration,
    read_cost: Duration,
}

impl<C: Clock> SimulatedGauge<C> {
    pub fn new(clock: C, encoding: LineEncoding) -> Self {
        Self {
            clock,
            encoding,
            timing: GaugeTiming::default(),
            packets: vec![encode_packet(0.0)],
            hold: Duration::from_secs(1),
            read_cost: Duration::ZERO,
        }
    }

    pub fn with_timing(mut self, timing: GaugeTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Cycle through raw packets, switching every `hold`.
    pub fn with_packets(mut self, packets: Vec<u32>, hold: Duration) -> Self {
        if !packets.is_empty() {
            self.packets = packets;
        }
        self.hold = hold;
        self
    }

    /// Cycle through readings in millimetres, switching every `hold`.
    pub fn with_readings_mm(self, readings: &[f32], hold: Duration) -> Self {
        let packets = readings.iter().copied().map(encode_packet).collect();
        self.with_packets(packets, hold)
    }

    /// Time each line read consumes. Only useful with a simulated clock.
    pub fn with_read_cost(mut self, cost: Duration) -> Self {
        self.read_cost = cost;
        self
    }

    /// Split into the two lines a sampler polls. Time zero of the waveform is
    /// the moment of this call.
    pub fn into_lines(self) -> (SimClockLine<C>, SimDataLine<C>) {
        let epoch = self.clock.now();
        let wave = Arc::new(Waveform {
            clock: self.clock,
            epoch,
            encoding: self.encoding,
            timing: self.timing,
            packets: self.packets,
            hold: self.hold,
            read_cost: self.read_cost,
        });
        (SimClockLine(wave.clone()), SimDataLine(wave))
    }
}

struct Waveform<C> {
    clock: C,
    epoch: Instant,
    encoding: LineEncoding,
    timing: GaugeTiming,
    packets: Vec<u32>,
    hold: Duration,
    read_cost: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineState {
    clock_active: bool,
    data_active: bool,
}

impl<C: Clock> Waveform<C> {
    fn state(&self) -> LineState {
        self.clock.sleep(self.read_cost);
        let t = self
            .clock
            .now()
            .saturating_duration_since(self.epoch)
            .as_nanos();
        let bit = self.timing.bit_period.as_nanos().max(2);
        let frame = bit * PACKET_BITS;
        let cycle = frame + self.timing.frame_gap.as_nanos();
        let pos = t % cycle;
        if pos >= frame {
            return LineState {
                clock_active: true,
                data_active: false,
            };
        }
        let packet = self.packet_at(t - pos);
        let index = (pos / bit) as u32;
        LineState {
            clock_active: pos % bit >= bit / 2,
            data_active: (packet >> index) & 1 == 1,
        }
    }

    fn packet_at(&self, frame_start: u128) -> u32 {
        let hold = self.hold.as_nanos().max(1);
        let slot = (frame_start / hold) % self.packets.len() as u128;
        self.packets[slot as usize]
    }
}

pub struct SimClockLine<C>(Arc<Waveform<C>>);

pub struct SimDataLine<C>(Arc<Waveform<C>>);

impl<C: Clock> SignalLine for SimClockLine<C> {
    fn level(&mut self) -> u16 {
        let state = self.0.state();
        self.0.encoding.level(state.clock_active)
    }
}

impl<C: Clock> SignalLine for SimDataLine<C> {
    fn level(&mut self) -> u16 {
        let state = self.0.state();
        self.0.encoding.level(state.data_active)
    }
}

/// A contact that replays a level pattern, one entry per `step`.
pub struct SimulatedContact<C> {
    clock: C,
    epoch: Instant,
    pattern: Vec<bool>,
    step: Duration,
}

impl<C: Clock> SimulatedContact<C> {
    pub fn new(clock: C, pattern: Vec<bool>, step: Duration) -> Self {
        let epoch = clock.now();
        let pattern = if pattern.is_empty() { vec![true] } else { pattern };
        Self {
            clock,
            epoch,
            pattern,
            step,
        }
    }

    /// Pull-up contact pressed (low) for `press` steps out of every `period`.
    pub fn pedal(clock: C, period: usize, press: usize, step: Duration) -> Self {
        let pattern = (0..period.max(1)).map(|i| i >= press).collect();
        Self::new(clock, pattern, step)
    }
}

impl<C: Clock> ContactInput for SimulatedContact<C> {
    fn is_high(&mut self) -> bool {
        let t = self
            .clock
            .now()
            .saturating_duration_since(self.epoch)
            .as_nanos();
        let idx = (t / self.step.as_nanos().max(1)) % self.pattern.len() as u128;
        self.pattern[idx as usize]
    }
}

/// Manufacturer-data payload as the scale broadcasts it: company id (LE) in
/// the first two bytes, weight in hundredths of a kg (BE) at `weight_offset`.
pub fn scale_payload(manufacturer_id: u16, weight_offset: usize, kg: f32) -> Vec<u8> {
    let mut payload = vec![0u8; weight_offset.max(2) + 2];
    payload[..2].copy_from_slice(&manufacturer_id.to_le_bytes());
    let raw = (kg * 100.0).round().clamp(0.0, f32::from(u16::MAX)) as u16;
    payload[weight_offset.max(2)..weight_offset.max(2) + 2].copy_from_slice(&raw.to_be_bytes());
    payload
}

/// Company id of an unrelated advertiser that shows up in every scan.
const NEIGHBOUR_ID: u16 = 0x004C;

/// A weight scale plus some radio noise.
///
/// Every scan sleeps for the scan window, then reports a foreign vendor's
/// payload, a truncated payload from the scale and one complete reading.
pub struct SimulatedScale<C> {
    clock: C,
    manufacturer_id: u16,
    weight_offset: usize,
    weights_kg: Vec<f32>,
    next: usize,
}

impl<C: Clock> SimulatedScale<C> {
    pub fn new(clock: C, manufacturer_id: u16, weight_offset: usize, weights_kg: Vec<f32>) -> Self {
        Self {
            clock,
            manufacturer_id,
            weight_offset,
            weights_kg,
            next: 0,
        }
    }
}

impl<C: Clock> AdvertisementSource for SimulatedScale<C> {
    fn scan(&mut self, window: Duration) -> Result<Vec<Vec<u8>>, BoxError> {
        self.clock.sleep(window);
        let mut seen = vec![
            scale_payload(NEIGHBOUR_ID, self.weight_offset, 12.34),
            self.manufacturer_id.to_le_bytes().to_vec(),
        ];
        if !self.weights_kg.is_empty() {
            let kg = self.weights_kg[self.next % self.weights_kg.len()];
            self.next = self.next.wrapping_add(1);
            seen.push(scale_payload(self.manufacturer_id, self.weight_offset, kg));
        }
        trace!(payloads = seen.len(), "simulated scan complete");
        Ok(seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spoke_traits::clock::test_clock::TestClock;

    #[test]
    fn encode_packet_sets_sign_bit_for_negatives() {
        assert_eq!(encode_packet(0.05), 5);
        assert_eq!(encode_packet(-1.0), 100 | SIGN_BIT);
        assert_eq!(encode_packet(-0.0), 0);
    }

    #[test]
    fn inch_packets_carry_the_unit_flag() {
        let p = encode_packet_inches(-100);
        assert_eq!(p & 0x0FFF, 100);
        assert_ne!(p & SIGN_BIT, 0);
        assert_ne!(p & INCH_BIT, 0);
    }

    #[test]
    fn clock_idles_active_between_frames() {
        let clock = TestClock::new();
        let timing = GaugeTiming::default();
        let (mut clk, mut data) = SimulatedGauge::new(clock.clone(), LineEncoding::analog())
            .with_timing(timing)
            .into_lines();
        clock.advance(timing.frame_len() + Duration::from_millis(1));
        assert_eq!(clk.level(), ANALOG_HIGH);
        assert_eq!(data.level(), ANALOG_LOW);
    }

    #[test]
    fn data_line_follows_packet_bits() {
        let clock = TestClock::new();
        let timing = GaugeTiming::default();
        let (mut clk, mut data) = SimulatedGauge::new(clock.clone(), LineEncoding::DigitalInverted)
            .with_timing(timing)
            .with_packets(vec![0b10], Duration::from_secs(10))
            .into_lines();
        // first half of bit 0: clock inactive (inverted: high), data bit 0 clear
        assert_eq!(clk.level(), 1);
        assert_eq!(data.level(), 1);
        // second half of bit 1: clock active (low), data bit 1 set (low)
        clock.set_offset(timing.bit_period + timing.bit_period * 3 / 4);
        assert_eq!(clk.level(), 0);
        assert_eq!(data.level(), 0);
    }

    #[test]
    fn pedal_pattern_presses_low() {
        let clock = TestClock::new();
        let mut pedal = SimulatedContact::pedal(clock.clone(), 4, 1, Duration::from_millis(10));
        assert!(!pedal.is_high());
        clock.advance(Duration::from_millis(10));
        assert!(pedal.is_high());
        clock.advance(Duration::from_millis(30));
        assert!(!pedal.is_high());
    }

    #[test]
    fn scale_payload_layout() {
        let p = scale_payload(256, 32, 72.5);
        assert_eq!(p.len(), 34);
        assert_eq!(&p[..2], &[0x00, 0x01]);
        assert_eq!(u16::from_be_bytes([p[32], p[33]]), 7250);
    }

    #[test]
    fn scan_consumes_the_window() {
        let clock = TestClock::new();
        let mut scale = SimulatedScale::new(clock.clone(), 256, 32, vec![1.0]);
        let seen = scale.scan(Duration::from_millis(500)).expect("scan");
        assert_eq!(clock.elapsed(), Duration::from_millis(500));
        assert_eq!(seen.len(), 3);
    }
}
