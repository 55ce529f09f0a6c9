//! Single-slot change notification.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

/// Capacity-one, latest-value handoff between the reloader and a consumer.
///
/// Publishing never blocks. If the consumer has not drained the previous
/// value, it is replaced, so a slow consumer only ever sees the most recent
/// change and never a backlog.
///
/// ```ignore
/// let slot = ChangeSlot::new();
/// slot.publish(1);
/// slot.publish(2);
///
/// assert_eq!(slot.receiver().try_recv(), Ok(2));
/// assert!(slot.receiver().try_recv().is_err());
/// ```
pub struct ChangeSlot<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> ChangeSlot<T> {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self { tx, rx }
    }

    /// Put `value` in the slot, evicting a pending value if there is one.
    pub fn publish(&self, value: T) {
        let mut value = value;

        loop {
            match self.tx.try_send(value) {
                Ok(()) => return,
                Err(TrySendError::Full(returned)) => {
                    // The consumer may drain concurrently; either way the
                    // slot has room on the next attempt.
                    let _ = self.rx.try_recv();
                    value = returned;
                }
                // Unreachable while `self.rx` is alive.
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    /// Receive side of the slot.
    #[must_use]
    pub const fn receiver(&self) -> &Receiver<T> {
        &self.rx
    }
}

impl<T> Default for ChangeSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ChangeSlot<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ChangeSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeSlot")
            .field("pending", &!self.rx.is_empty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    #[test]
    fn test_empty_slot() {
        let slot: ChangeSlot<u32> = ChangeSlot::new();
        assert!(slot.receiver().try_recv().is_err());
    }

    #[test]
    fn test_latest_value_wins() {
        let slot = ChangeSlot::new();
        slot.publish(1);
        slot.publish(2);
        slot.publish(3);

        assert_eq!(slot.receiver().try_recv(), Ok(3));
        assert!(slot.receiver().try_recv().is_err());
    }

    #[test]
    fn test_publish_after_drain() {
        let slot = ChangeSlot::new();
        slot.publish("a");
        assert_eq!(slot.receiver().try_recv(), Ok("a"));

        slot.publish("b");
        assert_eq!(slot.receiver().try_recv(), Ok("b"));
    }

    #[test]
    fn test_publish_from_another_thread() {
        let slot = ChangeSlot::new();
        let publisher = slot.clone();

        let handle = std::thread::spawn(move || {
            for i in 0..100 {
                publisher.publish(i);
            }
        });
        handle.join().unwrap();

        assert_eq!(
            slot.receiver().recv_timeout(Duration::from_secs(1)),
            Ok(99)
        );
    }
}
