//! Fuzz target for prediction result parsing.
//!
//! Arbitrary bytes go through the shape checks of nested result maps;
//! anything but a clean error or a value is a bug.

#![no_main]

use libfuzzer_sys::fuzz_target;
use letxbe::model::{LabelPrediction, ResultMap};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(result) = serde_json::from_slice::<ResultMap<LabelPrediction>>(data) {
        let _ = result.labels();
    }
});
