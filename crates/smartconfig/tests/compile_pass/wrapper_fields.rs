//! Wrappers and collections are valid field types.

use std::collections::{BTreeMap, HashMap};

use smartconfig::{Duration, FlagSet, Schema};

#[derive(Schema)]
struct Limits {
    #[flag("|10|max {connections}")]
    max: Option<u32>,

    #[flag("|1s|backoff")]
    backoff: Box<Duration>,

    hosts: Vec<String>,
    labels: HashMap<String, String>,
    weights: BTreeMap<String, f64>,
    r#type: Option<Box<String>>,
}

fn main() {
    let set = FlagSet::from_schema::<Limits>();
    assert_eq!(set.flags().len(), 2);
}
