//! Configuration file support.
//!
//! Files are located (`--config PATH`, or `config.<ext>` in the search
//! directory), parsed into a [`serde_json::Value`] tree with lower-cased
//! keys, and layered by the loader between annotation defaults and
//! command-line flags.
//!
//! # Supported Formats
//!
//! | Format | Feature Flag | Extensions |
//! |--------|--------------|------------|
//! | JSON | always | `.json` |
//! | TOML | `toml` | `.toml` |
//! | YAML | `yaml` | `.yaml`, `.yml` |
//!
//! # Error Handling
//!
//! A syntax error keeps the document and the failing position, so a
//! [`miette::Report`] can underline it:
//!
//! ```text
//!   × JSON syntax error in config.json
//!    ╭─[config.json:2:13]
//!  2 │     "port": ,
//!    │             ^ expected value at line 2 column 13
//!    ╰────
//! ```
//!
//! Discovery swallows these errors (debug log only) and carries on as if
//! no file existed.

mod error;
mod format;
mod utils;

pub use error::FileError;
pub use format::FileFormat;
pub use utils::{CONFIG_BASE_NAME, FileUtils};
