//! Live configuration and hot reload.
//!
//! After the initial load the configuration lives in a [`ConfigHandle`].
//! When a configuration file was found (and the `watch` feature is on), a
//! background thread watches it and, on each create or modify event:
//!
//! 1. waits for events to settle (debounce, 100 ms by default),
//! 2. loads a fresh record from the current one, the file, and the
//!    command-line flags,
//! 3. swaps the new snapshot in,
//! 4. publishes it to the change notification slot.
//!
//! A reload that fails is logged and the previous snapshot stays active.
//! Removing the file does not trigger a reload.
//!
//! # Architecture
//!
//! ```text
//! notify ──events──> smartconfig-watcher thread ──debounce──> Reloader
//!                                                             │
//!                    ConfigHandle::reload() ─────────────────>│
//!                                                             ├─ LiveRecord::swap
//!                                                             └─ ChangeSlot::publish
//! ```
//!
//! The slot holds one value: publishing replaces a value the consumer has
//! not received yet, so a slow consumer sees only the latest change.

mod handle;
mod live;
mod reloader;
mod slot;
mod types;

#[cfg(feature = "watch")]
mod watcher;

pub use handle::ConfigHandle;
pub use live::LiveRecord;
pub use slot::ChangeSlot;
pub use types::{ReloadCause, WatchError};

pub(crate) use reloader::Reloader;

#[cfg(feature = "watch")]
pub use watcher::WATCHER_THREAD_NAME;

#[cfg(feature = "watch")]
pub(crate) use watcher::ConfigWatcher;

/// Default debounce between the last file event and the reload.
pub const DEFAULT_DEBOUNCE: std::time::Duration = std::time::Duration::from_millis(100);
