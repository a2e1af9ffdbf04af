use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

use super::lock;

/// A lock + condition pair guarding an optional value.
///
/// The producer publishes under the lock and signals; the consumer waits
/// with a bound. If the bound elapses first the consumer gets `None` and the
/// value may still arrive later. That race is inherent to the pattern;
/// prefer [`CountdownLatch`](super::CountdownLatch) or a result handle when
/// completion must be guaranteed.
#[derive(Debug)]
pub struct Monitor<T> {
    value: Mutex<Option<T>>,
    signal: Condvar,
}

impl<T> Monitor<T> {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
            signal: Condvar::new(),
        }
    }

    /// Store `value` and wake all waiters. A later publish overwrites.
    pub fn publish(&self, value: T) {
        let mut slot = lock(&self.value);
        *slot = Some(value);
        self.signal.notify_all();
    }

    pub fn is_set(&self) -> bool {
        lock(&self.value).is_some()
    }
}

impl<T: Clone> Monitor<T> {
    /// Wait up to `timeout` for a value.
    ///
    /// Spurious wakeups are absorbed; a value published before the call
    /// returns immediately.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<T> {
        let slot = lock(&self.value);
        let (slot, _) = self
            .signal
            .wait_timeout_while(slot, timeout, |value| value.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        slot.clone()
    }

    pub fn peek(&self) -> Option<T> {
        lock(&self.value).clone()
    }
}

impl<T> Default for Monitor<T> {
    fn default() -> Self {
        Self::new()
    }
}
