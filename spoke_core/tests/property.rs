use proptest::prelude::*;
use spoke_core::packet::{INCH_BIT, SIGN_BIT};
use spoke_core::{DebounceState, FilterCfg, NoiseFilter, Packet, Verdict, interpret};

proptest! {
    #[test]
    fn metric_packets_are_hundredths(
        magnitude in 0u32..=0x0FFF,
        negative: bool,
        noise in 0u32..0x10,
    ) {
        // bits 12..20 are not part of the reading
        let raw = magnitude | (noise << 12) | if negative { SIGN_BIT } else { 0 };
        let signed = if negative { -(magnitude as i32) } else { magnitude as i32 };
        let expected = signed as f32 / 100.0;
        prop_assert_eq!(interpret(Packet::Valid(raw)).mm(), expected);
    }

    #[test]
    fn inch_packets_halve_before_scaling(magnitude in 0u32..=0x0FFF, negative: bool) {
        let raw = magnitude | INCH_BIT | if negative { SIGN_BIT } else { 0 };
        let signed = if negative { -(magnitude as i32) } else { magnitude as i32 };
        let expected = (signed / 2) as f32 * 2.54 / 100.0;
        prop_assert_eq!(interpret(Packet::Valid(raw)).mm(), expected);
    }

    #[test]
    fn accepted_steps_stay_within_bounds(values in prop::collection::vec(-2.0f32..6.0, 1..200)) {
        let cfg = FilterCfg::default();
        let filter = NoiseFilter::new(cfg);
        let mut last = 0.0f32;
        for v in values {
            let before = last;
            let verdict = filter.accept(v, &mut last);
            if verdict.is_accepted() {
                let delta = (v - before).abs();
                prop_assert!(delta >= cfg.min_change_mm && delta <= cfg.max_step_mm);
                prop_assert!(v >= cfg.min_active_mm);
            }
            if verdict == Verdict::Inactive {
                prop_assert_eq!(last, 0.0);
            } else {
                prop_assert_eq!(last, v);
            }
        }
    }

    #[test]
    fn one_event_per_two_changes(
        samples in prop::collection::vec(any::<bool>(), 0..300),
        rest: bool,
    ) {
        let mut state = DebounceState::new(rest);
        let mut level = rest;
        let mut changes = 0usize;
        let mut events = 0usize;
        for s in samples {
            if s != level {
                changes += 1;
                level = s;
            }
            if let Some(fired) = state.process(s) {
                events += 1;
                prop_assert_eq!(fired, s);
            }
        }
        prop_assert_eq!(events, changes / 2);
        prop_assert_eq!(state.is_armed(), changes % 2 == 1);
    }
}
