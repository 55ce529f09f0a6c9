//! # smartconfig
//!
//! Command-line flags and layered file configuration derived from one
//! annotated struct, with hot reload.
//!
//! Annotate the leaves of a configuration record with the compact
//! `short|default|help` mini-language and `smartconfig` will:
//!
//! - register one long flag per annotated leaf, named after its dotted,
//!   lower-cased path (`--one.port`), plus a short flag where requested,
//! - merge annotation defaults, a `config.{json,toml,yaml,yml}` file and the
//!   command line (highest priority last) into the record,
//! - answer `--help`, `--version`, `--gen-yaml` and `--gen-json`,
//! - watch the configuration file and publish every reloaded record
//!   through a single-slot change notification.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use serde::{Deserialize, Serialize};
//! use smartconfig::{Duration, Schema, Session};
//!
//! #[derive(Schema, Serialize, Deserialize, Default)]
//! struct Server {
//!     #[flag("H|127.0.0.1|Listen {IP}")]
//!     ip: String,
//!
//!     #[flag("p|8080|Listen {Port}")]
//!     port: u16,
//!
//!     #[flag(default = "30s", help = "idle {timeout}")]
//!     idle: Duration,
//! }
//!
//! #[derive(Schema, Serialize, Deserialize, Default)]
//! struct Config {
//!     server: Server,
//! }
//!
//! fn main() {
//!     let handle = Session::new("demo", "1.0.0").load_config(Config::default());
//!     println!("port {}", handle.read(|c| c.server.port));
//!
//!     for config in handle.changed() {
//!         println!("reloaded, port {}", config.server.port);
//!     }
//! }
//! ```
//!
//! ```text
//! $ demo --help
//! demo(version 1.0.0)
//!
//! Usage: demo [OPTIONS]
//!
//! Options:
//!   -c, --config <FILENAME>        config FILENAME, default to config.yaml or config.json
//!       --version                  just print version number only
//!       --help                     show this message
//!       --gen-yaml                 generate config.yaml
//!       --gen-json                 generate config.json
//!   -H, --server.ip <IP>           Listen IP [default: 127.0.0.1]
//!   -p, --server.port <Port>       Listen Port [default: 8080]
//!       --server.idle <timeout>    idle timeout [default: 30s]
//! ```
//!
//! ## Annotation Mini-Language
//!
//! | Part | Meaning |
//! |------|---------|
//! | `short` | One-character short flag; empty for none |
//! | `default` | Default value text, parsed as the field's type |
//! | `help` | Help text; a `{placeholder}` becomes the value name |
//!
//! Problems in annotations never abort a load. A short name already taken,
//! a default that does not parse, or a malformed annotation produces a
//! [`Warning`] and the flag degrades.
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `yaml` | YAML files and `--gen-yaml` | **Yes** |
//! | `watch` | Hot reload of the configuration file | **Yes** |
//! | `toml` | TOML files | No |
//!
//! ## Error Handling
//!
//! All errors are reported through the [`Error`] type, which integrates with
//! [`miette`] for rich terminal diagnostics:
//!
//! ```rust,ignore
//! match Session::new("demo", "1.0.0").run(Config::default()) {
//!     Ok(outcome) => { /* ... */ }
//!     Err(e) => eprintln!("{:?}", miette::Report::from(e)),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

// Derive macro
pub use smartconfig_macro::Schema;

// ============================================================================
// Re-exported Dependencies
// ============================================================================

/// Re-export miette for error reporting.
pub use miette;

/// Re-export clap; [`Session::command`] returns a [`clap::Command`].
pub use clap;

/// Re-export serde.
pub use serde;

/// Re-export `serde_json`; merge layers are [`serde_json::Value`] trees.
pub use serde_json;

// ============================================================================
// Core Modules
// ============================================================================

pub mod duration;
pub use duration::{Duration, DurationError, format_duration, parse_duration};

mod error;
pub use error::Error;

pub mod file;
pub use file::{FileError, FileFormat, FileUtils};

pub mod flags;
pub use flags::{Flag, FlagSet, FlagValue};

pub mod loader;
pub use loader::Loader;

pub mod schema;
pub use schema::{FieldShape, Kind, Schema, Shape};

mod session;
pub use session::{Outcome, Record, Session, Terminal, to_json, to_yaml};

pub mod walker;
pub use walker::{FlagSpec, SchemaWalker, derive_flags};

mod warning;
pub use warning::Warning;

pub mod watch;
pub use watch::{ChangeSlot, ConfigHandle, LiveRecord, ReloadCause, WatchError};
