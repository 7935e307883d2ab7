#![no_main]
use libfuzzer_sys::fuzz_target;
use spoke_core::WeightExtractor;

fuzz_target!(|input: (u16, usize, &[u8])| {
    let (id, offset, payload) = input;
    let _ = WeightExtractor::default().extract(payload);
    if let Some(kg) = WeightExtractor::new(id, offset).extract(payload) {
        assert!(kg >= 0.0 && kg <= 655.35);
    }
});
