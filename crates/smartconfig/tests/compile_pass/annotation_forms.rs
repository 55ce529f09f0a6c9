//! Every spelling of `#[flag]` is accepted.

use serde::{Deserialize, Serialize};
use smartconfig::{Duration, Schema, SchemaWalker};

#[derive(Schema, Serialize, Deserialize, Default)]
struct Listener {
    #[flag("H|127.0.0.1|Listen {IP}")]
    ip: String,

    #[flag = "p|8080|Listen {Port}"]
    port: u16,

    #[flag(short = 'i', default = "30s", help = "idle {timeout}")]
    idle: Duration,

    #[flag(short = "v", help = "verbose output")]
    verbose: bool,

    #[flag(default = "0.5")]
    ratio: f64,

    #[flag("")]
    quiet: bool,

    banner: String,
}

fn main() {
    let (specs, warnings) = SchemaWalker::walk_schema::<Listener>().finish();
    assert_eq!(specs.len(), 5);
    assert!(warnings.is_empty());
}
