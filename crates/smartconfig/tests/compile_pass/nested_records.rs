//! Records nest to any depth.

use serde::{Deserialize, Serialize};
use smartconfig::{FlagSet, Schema};

#[derive(Schema, Serialize, Deserialize, Default)]
struct Inner {
    #[flag("|3|retries")]
    retries: u8,
}

#[derive(Schema, Serialize, Deserialize, Default)]
struct Middle {
    inner: Inner,
    other: Inner,
}

#[derive(Schema, Serialize, Deserialize, Default)]
pub struct Outer {
    middle: Middle,
    #[flag("d|false|debug mode")]
    debug: bool,
}

fn main() {
    let set = FlagSet::from_schema::<Outer>();
    assert!(set.get("middle.inner.retries").is_some());
    assert!(set.get("middle.other.retries").is_some());
    assert!(set.get("debug").is_some());
}
