//! User-facing handle for the live configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::Receiver;

use super::reloader::Reloader;
use super::types::{ReloadCause, WatchError};

#[cfg(feature = "watch")]
use super::watcher::ConfigWatcher;

/// Handle to a loaded configuration.
///
/// Gives access to the current snapshot and to the change notification
/// slot, and keeps the file watcher (if one was installed) alive. Clones
/// share the same snapshot, slot, and watcher; the watcher stops when the
/// last clone is dropped or [`stop`](Self::stop) is called.
///
/// Binding the handle to `_` drops it at once, which stops the watcher
/// before the first change arrives.
///
/// ```ignore
/// let handle = match session.run(Config::default())? {
///     Outcome::Running(handle) => handle,
///     Outcome::Exit(terminal) => terminal.exit(),
/// };
///
/// println!("listening on port {}", handle.read(|c| c.one.port));
///
/// for config in handle.changed() {
///     println!("reloaded: port {}", config.one.port);
/// }
/// ```
#[must_use = "the watcher stops when the last handle is dropped"]
pub struct ConfigHandle<T> {
    reloader: Arc<Reloader<T>>,

    config_file: Option<PathBuf>,

    #[cfg(feature = "watch")]
    watcher: Option<Arc<ConfigWatcher>>,
}

impl<T> ConfigHandle<T> {
    pub(crate) const fn new(reloader: Arc<Reloader<T>>, config_file: Option<PathBuf>) -> Self {
        Self {
            reloader,
            config_file,
            #[cfg(feature = "watch")]
            watcher: None,
        }
    }

    #[cfg(feature = "watch")]
    pub(crate) fn with_watcher(mut self, watcher: ConfigWatcher) -> Self {
        self.watcher = Some(Arc::new(watcher));
        self
    }

    /// Current configuration snapshot.
    ///
    /// Old snapshots stay valid after a reload; they are simply no longer
    /// current.
    #[must_use]
    pub fn get(&self) -> Arc<T> {
        self.reloader.config().get()
    }

    /// Read the current configuration via a closure.
    pub fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.reloader.config().read(f)
    }

    /// Number of successful reloads so far.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.reloader.config().epoch()
    }

    /// Check if the configuration has been reloaded since `epoch`.
    #[must_use]
    pub fn has_changed_since(&self, epoch: u64) -> bool {
        self.epoch() != epoch
    }

    /// The configuration file in use, if one was found.
    #[must_use]
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Receive side of the change notification slot.
    ///
    /// Holds at most one value: the most recently reloaded configuration
    /// that has not been received yet.
    #[must_use]
    pub fn changed(&self) -> &Receiver<Arc<T>> {
        self.reloader.slot().receiver()
    }

    /// Returns `true` while a file watcher is running.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        #[cfg(feature = "watch")]
        {
            !self.reloader.is_stopped()
                && self.watcher.as_ref().is_some_and(|w| w.is_running())
        }

        #[cfg(not(feature = "watch"))]
        {
            false
        }
    }

    /// Reload now, on the calling thread.
    ///
    /// On success the new snapshot is swapped in and published to
    /// [`changed`](Self::changed), exactly like a file-triggered reload.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Stopped`] after [`stop`](Self::stop), or
    /// [`WatchError::ReloadFailed`] if the configuration no longer loads; the
    /// previous snapshot is kept in that case.
    pub fn reload(&self) -> Result<Arc<T>, WatchError> {
        self.reloader.reload(&ReloadCause::Requested)
    }

    /// Stop watching. The last snapshot remains readable.
    pub fn stop(&self) {
        self.reloader.stop();

        #[cfg(feature = "watch")]
        if let Some(watcher) = &self.watcher {
            watcher.stop();
        }
    }
}

impl<T> Clone for ConfigHandle<T> {
    fn clone(&self) -> Self {
        Self {
            reloader: self.reloader.clone(),
            config_file: self.config_file.clone(),
            #[cfg(feature = "watch")]
            watcher: self.watcher.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ConfigHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigHandle")
            .field("config_file", &self.config_file)
            .field("epoch", &self.epoch())
            .field("watching", &self.is_watching())
            .finish()
    }
}
