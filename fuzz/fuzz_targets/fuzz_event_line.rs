#![no_main]
use libfuzzer_sys::fuzz_target;
use spoke_core::EventLine;

fuzz_target!(|data: &str| {
    let _ = data.parse::<EventLine>();
});
