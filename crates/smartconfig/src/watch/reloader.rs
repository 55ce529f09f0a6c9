//! Reload-swap-publish step shared by the watcher thread and manual reloads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::live::LiveRecord;
use super::slot::ChangeSlot;
use super::types::{ReloadCause, WatchError};
use crate::Error;

/// Builds the next record from the current one.
pub(crate) type ReloadFn<T> = dyn Fn(&T) -> Result<T, Error> + Send + Sync;

/// Owns the live snapshot, the change slot, and the load function.
pub(crate) struct Reloader<T> {
    config: Arc<LiveRecord<T>>,
    slot: ChangeSlot<Arc<T>>,
    reload_fn: Box<ReloadFn<T>>,

    /// Serializes read-current / load / swap so two reloads never interleave.
    lock: Mutex<()>,
    stopped: AtomicBool,
}

impl<T> Reloader<T> {
    pub(crate) fn new<F>(initial: T, reload_fn: F) -> Self
    where
        F: Fn(&T) -> Result<T, Error> + Send + Sync + 'static,
    {
        Self {
            config: Arc::new(LiveRecord::new(initial)),
            slot: ChangeSlot::new(),
            reload_fn: Box::new(reload_fn),
            lock: Mutex::new(()),
            stopped: AtomicBool::new(false),
        }
    }

    pub(crate) const fn config(&self) -> &Arc<LiveRecord<T>> {
        &self.config
    }

    pub(crate) const fn slot(&self) -> &ChangeSlot<Arc<T>> {
        &self.slot
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub(crate) fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// Load a fresh record, swap it in, and publish it.
    ///
    /// On failure the current snapshot stays in place and nothing is
    /// published.
    pub(crate) fn reload(&self, cause: &ReloadCause) -> Result<Arc<T>, WatchError> {
        if self.is_stopped() {
            return Err(WatchError::Stopped);
        }

        let _guard = self.lock.lock();
        let current = self.config.get();

        match (self.reload_fn)(&current) {
            Ok(next) => {
                let next = Arc::new(next);
                self.config.swap(next.clone());
                self.slot.publish(next.clone());

                tracing::info!(%cause, epoch = self.config.epoch(), "configuration reloaded");

                Ok(next)
            }
            Err(err) => {
                tracing::warn!(
                    %cause,
                    error = %err,
                    "configuration reload failed, keeping previous configuration"
                );

                Err(WatchError::reload_failed(err))
            }
        }
    }
}
