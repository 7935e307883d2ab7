use std::time::Duration;

use rstest::rstest;
use spoke_hardware::sim::{GaugeTiming, LineEncoding, SimulatedGauge, encode_packet};
use spoke_traits::clock::test_clock::TestClock;
use spoke_traits::{Clock, SignalLine};

/// Count clock transitions into the active level over one frame, the way a
/// sampler would see them.
fn count_rising(encoding: LineEncoding, active: impl Fn(u16) -> bool) -> usize {
    let clock = TestClock::new();
    let timing = GaugeTiming::default();
    let (mut clk, _data) = SimulatedGauge::new(clock.clone(), encoding)
        .with_timing(timing)
        .with_read_cost(Duration::from_micros(10))
        .into_lines();
    let start = clock.now();
    let mut prev = active(clk.level());
    let mut edges = 0;
    while !clock.expired(start, timing.frame_len()) {
        let now = active(clk.level());
        if now && !prev {
            edges += 1;
        }
        prev = now;
    }
    edges
}

#[rstest]
#[case(LineEncoding::analog(), 1100)]
#[case(LineEncoding::DigitalInverted, 0)]
fn one_clock_cycle_per_bit(#[case] encoding: LineEncoding, #[case] marker: u16) {
    let edges = match encoding {
        LineEncoding::DigitalInverted => count_rising(encoding, |l| l == marker),
        _ => count_rising(encoding, |l| l > marker),
    };
    assert_eq!(edges, 24);
}

#[test]
fn readings_rotate_after_hold() {
    let clock = TestClock::new();
    let timing = GaugeTiming {
        bit_period: Duration::from_micros(400),
        frame_gap: Duration::from_millis(40),
    };
    let (_clk, mut data) = SimulatedGauge::new(clock.clone(), LineEncoding::DigitalInverted)
        .with_timing(timing)
        .with_readings_mm(&[0.01, 0.0], Duration::from_millis(100))
        .into_lines();
    // second half of bit 0 in the first frame: 0.01 mm -> bit 0 set -> low
    clock.set_offset(Duration::from_micros(300));
    assert_eq!(data.level(), 0);
    assert_eq!(encode_packet(0.01) & 1, 1);
    // a frame starting after the hold expired carries 0.00 mm
    let cycle = timing.frame_len() + timing.frame_gap;
    clock.set_offset(cycle * 3 + Duration::from_micros(300));
    assert_eq!(data.level(), 1);
}
