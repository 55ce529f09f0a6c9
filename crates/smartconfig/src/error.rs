//! Error types for configuration loading.
//!
//! # Error Variants
//!
//! | Variant | When It Occurs |
//! |---------|----------------|
//! | [`Error::File`] | Configuration file missing, unreadable, or malformed |
//! | [`Error::Unmarshal`] | Merged values do not fit the record type |
//! | [`Error::Serialize`] | The record could not be written as YAML or JSON |
//! | [`Error::InvalidDefault`] | An annotation default does not parse (strict mode) |
//! | [`Error::Watch`] | The file watcher could not be installed or driven |
//!
//! Most problems with annotations are not errors at all: they surface as
//! [`Warning`](crate::Warning)s and the affected flag degrades. Only a
//! session built with `strict_defaults(true)` turns an invalid default
//! into [`Error::InvalidDefault`]. A command line that does not parse is
//! not an error either: it ends the session as
//! [`Terminal::ParseFailure`](crate::Terminal::ParseFailure).
//!
//! ```rust,ignore
//! match session.run(Config::default()) {
//!     Ok(outcome) => { /* ... */ }
//!     Err(e) => eprintln!("{:?}", miette::Report::from(e)),
//! }
//! ```

use miette::Diagnostic;
use thiserror::Error as ThisError;

use crate::file::FileError;
use crate::schema::Kind;
use crate::watch::WatchError;

/// Errors that can occur while loading, generating, or watching configuration.
///
/// # Diagnostic Codes
///
/// | Code | Meaning |
/// |------|---------|
/// | `smartconfig::file::*` | See [`FileError`] |
/// | `smartconfig::unmarshal` | A merged value has the wrong type |
/// | `smartconfig::serialize` | `--gen-yaml` / `--gen-json` output failed |
/// | `smartconfig::invalid_default` | Unparseable annotation default |
/// | `smartconfig::watch::*` | See [`WatchError`] |
#[derive(Debug, Diagnostic, ThisError)]
#[non_exhaustive]
pub enum Error {
    /// A configuration file could not be used.
    #[error(transparent)]
    #[diagnostic(transparent)]
    File(#[from] FileError),

    /// The merged configuration does not deserialize into the record.
    #[error("invalid value for `{path}`: {message}")]
    #[diagnostic(
        code(smartconfig::unmarshal),
        help("check the value in the configuration file or on the command line")
    )]
    Unmarshal {
        /// Dotted path of the offending field.
        path: String,

        /// Deserializer message.
        message: String,
    },

    /// The record could not be serialized.
    #[error("failed to generate {format}: {message}")]
    #[diagnostic(
        code(smartconfig::serialize),
        help("every field of the configuration record must be serializable")
    )]
    Serialize {
        /// Output format (YAML, JSON).
        format: &'static str,

        /// Serializer message.
        message: String,
    },

    /// An annotation default does not parse as the field's kind.
    #[error("default value {value:?} of option --{name} is not a valid {kind}")]
    #[diagnostic(
        code(smartconfig::invalid_default),
        help("fix the default in the #[flag(...)] annotation")
    )]
    InvalidDefault {
        /// Flag name.
        name: String,

        /// The default text as written.
        value: String,

        /// Expected kind.
        kind: Kind,
    },

    /// The file watcher failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Watch(#[from] WatchError),
}

impl Error {
    /// Build an [`Error::Unmarshal`] from a path-tracking deserializer error.
    pub(crate) fn unmarshal(err: &serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();

        Self::Unmarshal {
            path: if path == "." { "<root>".to_string() } else { path },
            message: err.inner().to_string(),
        }
    }

    /// Build an [`Error::Serialize`].
    pub(crate) fn serialize(format: &'static str, message: impl ToString) -> Self {
        Self::Serialize {
            format,
            message: message.to_string(),
        }
    }
}
