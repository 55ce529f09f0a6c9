//! Performance benchmarks for flag derivation and layered loading.
//!
//! Run with: `cargo bench -p smartconfig`

#![allow(dead_code, clippy::struct_field_names)]

use serde::{Deserialize, Serialize};
use serde_json::json;
use smartconfig::{Duration, FlagSet, Loader, Schema, SchemaWalker, parse_duration};

fn main() {
    divan::main();
}

// ============================================================================
// Configuration Types
// ============================================================================

#[derive(Schema, Serialize, Deserialize, Default)]
struct ServiceOne {
    #[flag("H|127.0.0.1|Listen {IP}")]
    ip: String,
    #[flag("p|8080|Listen {Port}")]
    port: i64,
}

#[derive(Schema, Serialize, Deserialize, Default)]
struct ServiceTwo {
    #[flag("|true|help message for foo")]
    foo: bool,
    #[flag("|blablabla|help message for bar")]
    bar: String,
}

#[derive(Schema, Serialize, Deserialize, Default)]
struct ServiceThree {
    #[flag("|100|help message for hello")]
    hello: i32,
    #[flag("|30s|help message for world")]
    world: Duration,
}

#[derive(Schema, Serialize, Deserialize, Default)]
struct MainConfig {
    #[flag("v|false|debug mode")]
    debug: bool,
    one: ServiceOne,
    two: ServiceTwo,
    three: ServiceThree,
}

#[derive(Schema, Serialize, Deserialize, Default)]
struct Wide {
    a: MainConfig,
    b: MainConfig,
    c: MainConfig,
    d: MainConfig,
    e: MainConfig,
}

// ============================================================================
// Derivation
// ============================================================================

#[divan::bench]
fn walk_small() -> usize {
    SchemaWalker::walk_schema::<MainConfig>().specs().len()
}

#[divan::bench]
fn walk_wide() -> usize {
    SchemaWalker::walk_schema::<Wide>().specs().len()
}

#[divan::bench]
fn flag_set_small() -> usize {
    FlagSet::from_schema::<MainConfig>().flags().len()
}

#[divan::bench]
fn flag_set_wide() -> usize {
    FlagSet::from_schema::<Wide>().flags().len()
}

// ============================================================================
// Loading
// ============================================================================

#[divan::bench]
fn load_defaults(bencher: divan::Bencher) {
    let flags = FlagSet::from_schema::<MainConfig>();
    let loader = Loader::new(flags.defaults(), json!({}), None);
    let current = MainConfig::default();

    bencher.bench_local(|| loader.load_with::<MainConfig>(&current, None));
}

#[divan::bench]
fn load_with_file(bencher: divan::Bencher) {
    let flags = FlagSet::from_schema::<MainConfig>();
    let loader = Loader::new(flags.defaults(), json!({"debug": true}), None);
    let current = MainConfig::default();
    let file = json!({"one": {"port": 9000}, "three": {"world": "1m30s"}});

    bencher.bench_local(|| loader.load_with::<MainConfig>(&current, Some(file.clone())));
}

// ============================================================================
// Durations
// ============================================================================

#[divan::bench(args = ["30s", "1h30m", "1.5h", "300ms", "2h45m30.5s"])]
fn duration_parse(literal: &str) -> Result<std::time::Duration, smartconfig::DurationError> {
    parse_duration(divan::black_box(literal))
}
