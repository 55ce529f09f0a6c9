#![no_main]

use libfuzzer_sys::fuzz_target;
use smartconfig::{Duration, format_duration, parse_duration};

fuzz_target!(|data: &str| {
    // === Parsing must never panic ===
    let Ok(parsed) = parse_duration(data) else {
        return;
    };

    // === Formatting round-trips exactly ===
    let text = format_duration(parsed);
    assert_eq!(
        parse_duration(&text).ok(),
        Some(parsed),
        "{data:?} formatted as {text:?} did not parse back"
    );

    // === The wrapper agrees with the free functions ===
    let wrapped: Duration = data.parse().expect("already parsed once");
    assert_eq!(wrapped.as_std(), parsed);
    assert_eq!(wrapped.to_string(), text);
});
