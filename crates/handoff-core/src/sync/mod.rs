//! Blocking synchronization wrappers.
//!
//! - **CountdownLatch**: releases every waiter once its count reaches zero
//! - **Monitor**: lock + condition pair with a bounded wait
//!
//! Both are thin wrappers over `Mutex` + `Condvar`. A poisoned lock is
//! recovered rather than propagated: every critical section here leaves the
//! guarded value consistent before anything that can panic runs.

mod latch;
mod monitor;

pub use latch::CountdownLatch;
pub(crate) use latch::CountDownOnDrop;
pub use monitor::Monitor;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
