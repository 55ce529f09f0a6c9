//! Integration tests for `#[derive(Schema)]` and the schema walk.

#![allow(clippy::pedantic)]
#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use smartconfig::{
    Duration, FlagSet, FlagSpec, FlagValue, Kind, Schema, SchemaWalker, Shape, Warning,
};

// ============================================================================
// Test Configuration Types
// ============================================================================

#[derive(Schema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
struct ServiceOne {
    #[flag("H|127.0.0.1|Listen {IP}")]
    ip: String,

    #[flag("p|8080|Listen {Port}")]
    port: i64,
}

#[derive(Schema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
struct ServiceTwo {
    #[flag = "|true|help message for foo"]
    foo: bool,

    #[flag(default = "blablabla", help = "help message for bar")]
    bar: String,
}

#[derive(Schema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
struct ServiceThree {
    #[flag("|100|help message for hello")]
    hello: i32,

    #[flag("|30s|help message for world")]
    world: Duration,
}

#[derive(Schema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
struct MainConfig {
    #[flag("v|false|debug mode")]
    debug: bool,
    one: ServiceOne,
    two: ServiceTwo,
    three: ServiceThree,
}

#[derive(Schema, Serialize, Deserialize, Default)]
struct Bare {
    name: String,
    nested: BareInner,
}

#[derive(Schema, Serialize, Deserialize, Default)]
struct BareInner {
    count: u32,
    tags: Vec<String>,
}

// ============================================================================
// Walk Tests
// ============================================================================

#[test]
fn test_unannotated_record_derives_nothing() {
    let (specs, warnings) = SchemaWalker::walk_schema::<Bare>().finish();
    assert!(specs.is_empty());
    assert!(warnings.is_empty());
}

#[test]
fn test_declaration_order_and_dotted_names() {
    let (specs, warnings) = SchemaWalker::walk_schema::<MainConfig>().finish();
    let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();

    assert_eq!(
        names,
        [
            "debug",
            "one.ip",
            "one.port",
            "two.foo",
            "two.bar",
            "three.hello",
            "three.world",
        ]
    );
    assert!(warnings.is_empty());
}

#[test]
fn test_annotation_parts() {
    #[derive(Schema)]
    struct A {
        b: B,
    }

    #[derive(Schema)]
    struct B {
        #[flag("x|5|help")]
        b: u16,
        c: String,
    }

    #[derive(Schema)]
    struct Root {
        a: B,
    }

    let (specs, _) = SchemaWalker::walk_schema::<Root>().finish();
    assert_eq!(
        specs,
        vec![FlagSpec {
            kind: Kind::U16,
            name: "a.b".to_string(),
            short: "x".to_string(),
            default: "5".to_string(),
            help: "help".to_string(),
        }]
    );
}

#[test]
fn test_keyed_form_without_short() {
    let set = FlagSet::from_schema::<MainConfig>();
    let bar = set.get("two.bar").unwrap();

    assert_eq!(bar.short, None);
    assert_eq!(bar.default, FlagValue::String("blablabla".to_string()));
    assert_eq!(bar.help, "help message for bar");
}

#[test]
fn test_field_names_are_lowercased() {
    #[allow(non_snake_case)]
    #[derive(Schema)]
    struct Upper {
        #[flag("|1|level")]
        LogLevel: u8,
    }

    let (specs, _) = SchemaWalker::walk_schema::<Upper>().finish();
    assert_eq!(specs[0].name, "loglevel");
}

#[test]
fn test_raw_identifier_field() {
    #[derive(Schema)]
    struct Kinds {
        #[flag("|tcp|transport {kind}")]
        r#type: String,
    }

    let set = FlagSet::from_schema::<Kinds>();
    let flag = set.get("type").unwrap();
    assert_eq!(flag.value_name, "kind");
}

#[test]
fn test_optional_and_boxed_fields_are_leaves() {
    #[derive(Schema)]
    struct Limits {
        #[flag("|10|max {connections}")]
        max: Option<u32>,

        #[flag("|1s|backoff")]
        backoff: Box<Duration>,
    }

    let set = FlagSet::from_schema::<Limits>();
    assert_eq!(set.get("max").unwrap().default, FlagValue::U32(10));
    assert_eq!(
        set.get("backoff").unwrap().default,
        FlagValue::Duration(Duration::from_secs(1))
    );
}

#[test]
fn test_generic_record() {
    #[derive(Schema)]
    struct Wrapper<T> {
        #[flag("|7|inner value")]
        inner: T,
    }

    let set = FlagSet::from_schema::<Wrapper<i16>>();
    assert_eq!(set.get("inner").unwrap().default, FlagValue::I16(7));

    let set = FlagSet::from_schema::<Wrapper<String>>();
    assert_eq!(
        set.get("inner").unwrap().default,
        FlagValue::String("7".to_string())
    );
}

#[test]
fn test_unit_struct_shape() {
    #[derive(Schema)]
    struct Empty;

    assert!(matches!(Empty::shape(), Shape::Record(fields) if fields.is_empty()));
}

#[test]
fn test_annotated_record_warns() {
    #[derive(Schema)]
    struct Outer {
        #[flag("o|1|ignored")]
        one: ServiceOne,
    }

    let (specs, warnings) = SchemaWalker::walk_schema::<Outer>().finish();
    assert_eq!(specs.len(), 2);
    assert_eq!(
        warnings,
        vec![Warning::AnnotatedRecord {
            name: "one".to_string()
        }]
    );
}

// ============================================================================
// Flag Materialization Tests
// ============================================================================

#[test]
fn test_duplicate_short_second_loses_it() {
    #[derive(Schema)]
    struct Twin {
        #[flag("p|1|first")]
        first: u16,

        #[flag("p|2|second")]
        second: u16,
    }

    let set = FlagSet::from_schema::<Twin>();
    assert_eq!(set.get("first").unwrap().short, Some('p'));

    let second = set.get("second").unwrap();
    assert_eq!(second.short, None);
    assert_eq!(second.default, FlagValue::U16(2));
    assert!(matches!(
        set.warnings(),
        [Warning::ShortNameTaken { name, owner, .. }] if name == "second" && owner == "first"
    ));
}

#[test]
fn test_duration_defaults() {
    #[derive(Schema)]
    struct Timeouts {
        #[flag("|30s|good")]
        good: Duration,

        #[flag("|notaduration|bad")]
        bad: Duration,
    }

    let set = FlagSet::from_schema::<Timeouts>();

    assert_eq!(
        set.get("good").unwrap().default,
        FlagValue::Duration(Duration::from_secs(30))
    );
    assert_eq!(
        set.get("bad").unwrap().default,
        FlagValue::Duration(Duration::ZERO)
    );
    assert!(matches!(
        set.warnings(),
        [Warning::InvalidDefault { name, kind: Kind::Duration, .. }] if name == "bad"
    ));
}

#[test]
fn test_collections_are_skipped() {
    #[derive(Schema)]
    struct Tagged {
        #[flag("|a,b|tags")]
        tags: Vec<String>,

        #[flag("|x|name")]
        name: String,
    }

    let set = FlagSet::from_schema::<Tagged>();
    assert!(set.get("tags").is_none());
    assert!(set.get("name").is_some());
}
