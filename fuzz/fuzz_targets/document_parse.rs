//! Fuzz target for target/artefact document parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use letxbe::model::Document;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = Document::from_json_slice(data);
});
