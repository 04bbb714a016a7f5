//! Fuzz target for measure id parsing.
//!
//! Any id that parses must print back to itself.
//!
//! Run with: cargo +nightly fuzz run measure_id_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use riverdata_core::MeasureId;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(id) = MeasureId::parse(input) {
            assert_eq!(id.to_string(), input);
            let _ = id.translated();
        }
    }
});
