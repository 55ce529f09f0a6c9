#![no_main]

use libfuzzer_sys::fuzz_target;
use smartconfig::file::{FileFormat, FileUtils};

fuzz_target!(|data: &str| {
    for format in [FileFormat::Json, FileFormat::Toml, FileFormat::Yaml] {
        match FileUtils::parse_str(data, format) {
            // === Parsed documents are always lower-cased mappings ===
            Ok(value) => {
                let map = value.as_object().expect("parse_str yields a mapping");
                assert!(map.keys().all(|k| k.to_lowercase() == *k));
            }
            // === Errors render without panicking ===
            Err(err) => {
                let _ = err.to_string();
                let _ = format!("{err:?}");
            }
        }
    }
});
