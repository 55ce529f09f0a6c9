#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value, json};
use smartconfig::file::FileUtils;

/// Structured input for the merge helpers
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Dotted paths to insert
    paths: Vec<String>,
    /// Keys for the lower-casing pass
    keys: Vec<String>,
}

fuzz_target!(|input: FuzzInput| {
    // === insert_path builds a nested object for any dotted path ===
    let mut base = Map::new();
    for (i, path) in input.paths.iter().enumerate() {
        FileUtils::insert_path(&mut base, path, json!(i));
    }
    let mut base = Value::Object(base);

    // === Later paths win after a merge ===
    let mut overlay = Map::new();
    for path in &input.paths {
        FileUtils::insert_path(&mut overlay, path, json!("overlay"));
    }
    FileUtils::deep_merge(&mut base, Value::Object(overlay.clone()));
    FileUtils::deep_merge(&mut base, Value::Object(overlay));
    let _ = serde_json::to_string(&base);

    // === Lower-casing is idempotent ===
    let map: Map<String, Value> = input.keys.iter().map(|k| (k.clone(), json!(null))).collect();
    let once = FileUtils::lowercase_keys(map);
    let twice = FileUtils::lowercase_keys(once.clone());
    assert_eq!(once, twice);
});
