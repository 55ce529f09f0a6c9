#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use smartconfig::walker::split_annotation;
use smartconfig::{FlagSet, FlagSpec, Kind};

#[derive(Debug, Arbitrary)]
struct FuzzSpec {
    kind: u8,
    name: String,
    annotation: String,
}

const KINDS: [Kind; 8] = [
    Kind::Bool,
    Kind::I8,
    Kind::U16,
    Kind::I64,
    Kind::F64,
    Kind::String,
    Kind::Duration,
    Kind::Unsupported("sequence"),
];

fuzz_target!(|specs: Vec<FuzzSpec>| {
    let specs: Vec<FlagSpec> = specs
        .into_iter()
        .filter(|s| !s.name.is_empty())
        .map(|s| {
            // === Splitting only drops separators ===
            let (short, default, help) = split_annotation(&s.annotation);
            assert!(short.len() + default.len() + help.len() <= s.annotation.len());

            let kind = KINDS[usize::from(s.kind) % KINDS.len()];
            FlagSpec::from_annotation(kind, s.name, &s.annotation)
        })
        .collect();

    // === Materialization never panics, whatever the annotations say ===
    let set = FlagSet::new(specs);
    let _ = set.defaults();
    for warning in set.warnings() {
        let _ = warning.to_string();
    }

    // === Only ASCII letters and digits become short names ===
    assert!(
        set.flags()
            .iter()
            .filter_map(|f| f.short)
            .all(|c| c.is_ascii_alphanumeric())
    );

    // === No two flags share a short name ===
    let mut shorts: Vec<char> = set.flags().iter().filter_map(|f| f.short).collect();
    let total = shorts.len();
    shorts.sort_unstable();
    shorts.dedup();
    assert_eq!(shorts.len(), total);

    // === Long names stay unique ===
    let mut names: Vec<&str> = set.flags().iter().map(|f| f.name.as_str()).collect();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total);
});
