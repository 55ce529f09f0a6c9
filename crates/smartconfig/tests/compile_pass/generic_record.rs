//! Generic records get `Schema` bounds on their field types.

use smartconfig::{FlagSet, Schema};

#[derive(Schema)]
struct Pair<A, B>
where
    A: Clone,
{
    #[flag("|1|first")]
    first: A,

    #[flag("|2|second")]
    second: B,
}

#[derive(Schema)]
struct Nested<T: Clone> {
    pair: Pair<T, String>,
}

fn main() {
    let set = FlagSet::from_schema::<Pair<u32, String>>();
    assert_eq!(set.flags().len(), 2);

    let set = FlagSet::from_schema::<Nested<i64>>();
    assert!(set.get("pair.first").is_some());
}
