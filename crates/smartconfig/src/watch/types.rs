//! Reload errors and causes.

use std::fmt;
use std::path::{Path, PathBuf};

use miette::Diagnostic;

/// Failure of the watcher or of a single reload.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[non_exhaustive]
pub enum WatchError {
    /// The notification backend or its thread could not be started.
    #[error("file watcher unavailable: {message}")]
    #[diagnostic(
        code(smartconfig::watch::backend),
        help("the process may have hit its limit of watched files")
    )]
    Backend {
        /// Backend message.
        message: String,
    },

    /// The directory holding the configuration file cannot be watched.
    #[error("cannot watch {}: {message}", path.display())]
    #[diagnostic(code(smartconfig::watch::unwatchable))]
    Unwatchable {
        /// Directory or file involved.
        path: PathBuf,
        /// Backend message.
        message: String,
    },

    /// Loading the next record failed. The live record is unchanged.
    #[error("configuration reload failed: {message}")]
    #[diagnostic(
        code(smartconfig::watch::reload_failed),
        help("the previous configuration stays active until the file is fixed")
    )]
    ReloadFailed {
        /// Rendered load error.
        message: String,

        /// Load error behind the failure.
        #[related]
        errors: Vec<crate::Error>,
    },

    /// [`ConfigHandle::stop`](super::ConfigHandle::stop) was called.
    #[error("configuration handle is stopped")]
    #[diagnostic(code(smartconfig::watch::stopped))]
    Stopped,
}

impl WatchError {
    /// Build a [`WatchError::Backend`].
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Build a [`WatchError::Unwatchable`].
    pub fn unwatchable(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Unwatchable {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Wrap a load error.
    pub fn reload_failed(error: crate::Error) -> Self {
        Self::ReloadFailed {
            message: error.to_string(),
            errors: vec![error],
        }
    }
}

/// Why a reload ran. Logged with every reload.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ReloadCause {
    /// Contents of the file were written in place.
    Written(PathBuf),

    /// A file appeared at the path, e.g. an editor renamed its save over it.
    Replaced(PathBuf),

    /// [`ConfigHandle::reload`](super::ConfigHandle::reload).
    Requested,
}

impl ReloadCause {
    /// File behind the event, `None` for a requested reload.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Written(path) | Self::Replaced(path) => Some(path),
            Self::Requested => None,
        }
    }
}

impl fmt::Display for ReloadCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Written(path) => write!(f, "{} written", path.display()),
            Self::Replaced(path) => write!(f, "{} replaced", path.display()),
            Self::Requested => f.write_str("reload requested"),
        }
    }
}
