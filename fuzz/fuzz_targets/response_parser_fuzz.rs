//! Fuzz target for readings response decoding and parsing.
//!
//! Arbitrary bytes must either fail to decode with a `ParseError` or produce
//! series that are strictly ordered and contain only finite values.
//!
//! Run with: cargo +nightly fuzz run response_parser_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use riverdata_core::{parse_readings, parse_response_body};

fuzz_target!(|data: &[u8]| {
    let Ok(response) = parse_response_body(data, "fuzz") else {
        return;
    };

    let parsed = parse_readings(&response.items);
    let total: usize = parsed.values().map(|series| series.len()).sum();
    assert!(total <= response.items.len(), "Parser invented readings");

    for series in parsed.values() {
        for pair in series.as_slice().windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp, "Series out of order");
        }
        assert!(series.iter().all(|r| r.value.is_finite()), "Non-finite value kept");
    }
});
