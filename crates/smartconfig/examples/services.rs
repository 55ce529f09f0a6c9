//! Three services sharing one configuration record.
//!
//! ```text
//! cargo run --example services -- --help
//! cargo run --example services -- -p 9000 --three.world 1m
//! cargo run --example services -- --gen-yaml > config.yaml
//! ```
//!
//! With a `config.yaml` in the working directory, edit it while the example
//! runs and every change is printed.

use serde::{Deserialize, Serialize};
use smartconfig::{Duration, Schema, Session};
use tracing_subscriber::EnvFilter;

// In a real application each service would own its configuration type.
#[derive(Schema, Serialize, Deserialize, Debug, Clone, Default)]
struct ServiceOneConfig {
    #[flag("H|127.0.0.1|Listen {IP}")]
    ip: String,

    #[flag("p|8080|Listen {Port}")]
    port: i64,
}

#[derive(Schema, Serialize, Deserialize, Debug, Clone, Default)]
struct ServiceTwoConfig {
    #[flag("|true|help message for foo")]
    foo: bool,

    #[flag("|blablabla|help message for bar")]
    bar: String,
}

#[derive(Schema, Serialize, Deserialize, Debug, Clone, Default)]
struct ServiceThreeConfig {
    #[flag("|100|help message for hello")]
    hello: i32,

    #[flag("|30s|help message for world")]
    world: Duration,
}

#[derive(Schema, Serialize, Deserialize, Debug, Clone, Default)]
struct MainConfig {
    #[flag("v|false|debug mode")]
    debug: bool,
    one: ServiceOneConfig,
    two: ServiceTwoConfig,
    three: ServiceThreeConfig,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let handle = Session::new("example", "1.0")
        .version_detail("a\nlong\nlong\nversion\ndetail")
        .load_config(MainConfig::default());

    println!("config: {:#?}", handle.get());

    match handle.config_file() {
        Some(path) => println!("watching {}", path.display()),
        None => {
            println!("no configuration file found, nothing to watch");
            return;
        }
    }

    for config in handle.changed() {
        println!("new config: {config:#?}");
    }
}
