//! Fuzz target for projection parsing and entry lookup.

#![no_main]

use libfuzzer_sys::fuzz_target;
use letxbe::model::ProjectionRoot;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(roots) = serde_json::from_slice::<Vec<ProjectionRoot>>(data) {
        for root in &roots {
            for key in root.result.keys() {
                let _ = root.locate(key);
            }
        }
    }
});
