use criterion::{Criterion, black_box, criterion_group, criterion_main};
use spoke_core::packet::{INCH_BIT, SIGN_BIT};
use spoke_core::{
    BitSampler, Event, FilterCfg, Measurement, NoiseFilter, Packet, RawBit, interpret, read_packet,
};
use spoke_traits::clock::test_clock::TestClock;
use std::time::Duration;

/// Replays the same packet forever, one bit per call.
struct Looping {
    value: u32,
    index: u32,
}

impl BitSampler for Looping {
    fn sample(&mut self, _bit_timeout: Duration) -> RawBit {
        let bit = RawBit::from(self.value >> self.index & 1 == 1);
        self.index = (self.index + 1) % 24;
        bit
    }
}

fn bench_read_packet(c: &mut Criterion) {
    let clock = TestClock::new();
    let mut sampler = Looping {
        value: 0x10_0123,
        index: 0,
    };
    c.bench_function("read_packet", |b| {
        b.iter(|| {
            read_packet(
                &mut sampler,
                &clock,
                Duration::from_millis(100),
                Duration::from_millis(250),
            )
        })
    });
}

fn bench_interpret_and_filter(c: &mut Criterion) {
    let packets: Vec<u32> = (0..1024u32)
        .map(|i| {
            let mut p = i * 3 & 0x0FFF;
            if i % 7 == 0 {
                p |= SIGN_BIT;
            }
            if i % 5 == 0 {
                p |= INCH_BIT;
            }
            p
        })
        .collect();
    let filter = NoiseFilter::new(FilterCfg::default());
    c.bench_function("interpret+filter+event", |b| {
        b.iter(|| {
            let mut last = 0.0f32;
            let mut sent = 0usize;
            for &p in &packets {
                let m: Measurement = interpret(Packet::Valid(black_box(p)));
                if filter.accept(m.mm(), &mut last).is_accepted() {
                    black_box(Event::gauge(1, m));
                    sent += 1;
                }
            }
            sent
        })
    });
}

criterion_group!(benches, bench_read_packet, bench_interpret_and_filter);
criterion_main!(benches);
