//! File watcher thread.
//!
//! [`ConfigWatcher`] watches the configuration file's parent directory with
//! the `notify` crate, filters events for the file itself, debounces them,
//! and runs the reload on its own thread.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded, select};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::reloader::Reloader;
use super::types::{ReloadCause, WatchError};

/// Name of the background thread.
pub const WATCHER_THREAD_NAME: &str = "smartconfig-watcher";

/// Handle to a running watcher thread. Dropping it stops the thread.
pub(crate) struct ConfigWatcher {
    stop_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
    path: PathBuf,
}

impl ConfigWatcher {
    /// Start watching `path`; events drive `reloader`.
    pub(crate) fn start<T>(
        reloader: Arc<Reloader<T>>,
        path: &Path,
        debounce: Duration,
    ) -> Result<Self, WatchError>
    where
        T: Send + Sync + 'static,
    {
        let path = std::path::absolute(path)
            .map_err(|e| WatchError::unwatchable(path, format!("cannot resolve path: {e}")))?;
        let parent = path
            .parent()
            .filter(|p| p.is_dir())
            .ok_or_else(|| WatchError::unwatchable(&path, "parent directory does not exist"))?
            .to_path_buf();

        let (notify_tx, notify_rx) = bounded::<notify::Result<Event>>(100);
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })
        .map_err(|e| WatchError::backend(format!("failed to create file watcher: {e}")))?;

        // Editors often replace the file by renaming over it, which would
        // detach a watch on the file itself.
        watcher
            .watch(&parent, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::unwatchable(&parent, format!("failed to watch: {e}")))?;

        let targets = Targets::new(&path);
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let thread_handle = thread::Builder::new()
            .name(WATCHER_THREAD_NAME.to_string())
            .spawn(move || {
                watcher_loop(&reloader, &stop_rx, &notify_rx, debounce, &targets, watcher);
            })
            .map_err(|e| WatchError::backend(format!("failed to spawn watcher thread: {e}")))?;

        tracing::info!(path = %path.display(), debounce_ms = debounce.as_millis(), "watching configuration file");

        Ok(Self {
            stop_tx,
            thread_handle: Some(thread_handle),
            path,
        })
    }

    /// The watched file.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub(crate) fn stop(&self) {
        let _ = self.stop_tx.try_send(());
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl std::fmt::Debug for ConfigWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigWatcher")
            .field("path", &self.path())
            .field("running", &self.is_running())
            .finish()
    }
}

/// Paths under which the watched file may show up in events.
struct Targets {
    paths: HashSet<PathBuf>,
}

impl Targets {
    fn new(path: &Path) -> Self {
        let mut paths = HashSet::from([path.to_path_buf()]);

        // Backends may report either the path as given or its canonical form.
        if let Some(canonical) = path
            .parent()
            .and_then(|p| p.canonicalize().ok())
            .zip(path.file_name())
            .map(|(dir, name)| dir.join(name))
        {
            paths.insert(canonical);
        }

        Self { paths }
    }

    fn matches(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    fn cause(&self, event: &Event) -> Option<ReloadCause> {
        let path = event.paths.iter().find(|p| self.matches(p))?;

        match event.kind {
            EventKind::Create(_) => Some(ReloadCause::Replaced(path.clone())),
            EventKind::Modify(_) => Some(ReloadCause::Written(path.clone())),
            _ => None,
        }
    }
}

fn watcher_loop<T>(
    reloader: &Reloader<T>,
    stop_rx: &Receiver<()>,
    notify_rx: &Receiver<notify::Result<Event>>,
    debounce: Duration,
    targets: &Targets,
    _watcher: RecommendedWatcher,
) {
    let mut pending: Option<ReloadCause> = None;
    let mut last_event = Instant::now();

    loop {
        select! {
            recv(stop_rx) -> _ => break,

            recv(notify_rx) -> event => match event {
                Ok(Ok(event)) => {
                    if let Some(cause) = targets.cause(&event) {
                        tracing::debug!(%cause, "configuration file event");
                        pending = Some(cause);
                        last_event = Instant::now();
                    }
                }
                Ok(Err(err)) => tracing::warn!(error = %err, "file watcher error"),
                Err(_) => break,
            },

            default(debounce) => {
                if let Some(cause) = pending.take() {
                    if last_event.elapsed() >= debounce {
                        // Failures are logged by the reloader.
                        let _ = reloader.reload(&cause);
                    } else {
                        pending = Some(cause);
                    }
                }
            }
        }

        if reloader.is_stopped() {
            break;
        }
    }

    tracing::debug!("configuration watcher stopped");
}
