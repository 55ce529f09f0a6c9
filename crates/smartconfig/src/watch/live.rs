//! The live record behind a [`ConfigHandle`](super::ConfigHandle).

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Current configuration record plus a reload counter.
///
/// Every reload builds a whole new record and installs it in one step.
/// A reader holds either the record from before or the one from after.
///
/// ```ignore
/// let live = LiveRecord::new(Config::default());
/// let seen = live.epoch();
///
/// let port = live.read(|cfg| cfg.one.port);
///
/// if live.epoch() != seen {
///     restart_listener(live.get().one.port);
/// }
/// ```
pub struct LiveRecord<T> {
    current: RwLock<Arc<T>>,
    swaps: AtomicU64,
}

impl<T> LiveRecord<T> {
    /// Start at epoch 0 with `record`.
    pub fn new(record: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(record)),
            swaps: AtomicU64::new(0),
        }
    }

    /// Shared pointer to the current record.
    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.current.read())
    }

    /// Run `f` against the current record while holding the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(self.current.read().as_ref())
    }

    /// How many records have replaced the initial one.
    pub fn epoch(&self) -> u64 {
        self.swaps.load(Ordering::Acquire)
    }

    /// Install `next`, returning the record it replaces.
    pub(crate) fn swap(&self, next: Arc<T>) -> Arc<T> {
        let mut current = self.current.write();
        // Counted under the lock: a new epoch implies the new record.
        self.swaps.fetch_add(1, Ordering::Release);
        std::mem::replace(&mut *current, next)
    }
}

impl<T: Default> Default for LiveRecord<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for LiveRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveRecord")
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}
