use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

use super::lock;

/// A one-shot countdown barrier.
///
/// Waiters block until `count_down` has been called `count` times. Once the
/// count reaches zero the latch stays open: late waiters return immediately.
#[derive(Debug)]
pub struct CountdownLatch {
    count: Mutex<usize>,
    zero: Condvar,
}

impl CountdownLatch {
    pub fn new(count: usize) -> Self {
        Self {
            count: Mutex::new(count),
            zero: Condvar::new(),
        }
    }

    /// Decrement the count, releasing all waiters when it reaches zero.
    ///
    /// Saturates at zero. Returns the remaining count.
    pub fn count_down(&self) -> usize {
        let mut count = lock(&self.count);
        if *count > 0 {
            *count -= 1;
            if *count == 0 {
                self.zero.notify_all();
            }
        }
        *count
    }

    pub fn count(&self) -> usize {
        *lock(&self.count)
    }

    pub fn wait(&self) {
        let count = lock(&self.count);
        let _released = self
            .zero
            .wait_while(count, |count| *count > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Returns `true` if the latch opened before `timeout` elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let count = lock(&self.count);
        let (count, _) = self
            .zero
            .wait_timeout_while(count, timeout, |count| *count > 0)
            .unwrap_or_else(PoisonError::into_inner);
        *count == 0
    }
}

/// Counts a latch down when dropped, so a panicking task still releases
/// whoever is waiting on it.
pub(crate) struct CountDownOnDrop<'a>(pub(crate) &'a CountdownLatch);

impl Drop for CountDownOnDrop<'_> {
    fn drop(&mut self) {
        self.0.count_down();
    }
}
