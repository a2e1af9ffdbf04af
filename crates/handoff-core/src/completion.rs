//! Completion - single-assignment result cell
//!
//! Every handle the runner hands out is backed by one of these.
//!
//! # 学習ポイント
//! - write-once / read-many: `complete` succeeds exactly once
//! - Mutex + Condvar による blocking wait
//! - `tokio::sync::Notify` による async wait
//! - 完了時に observer（callback / chain）をその場で実行

use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;

use crate::domain::{TaskId, TaskState};
use crate::error::{RunnerError, TaskFailure};
use crate::sync::lock;

/// Terminal value of a task: what the task body returned.
pub type Outcome<T> = Result<T, TaskFailure>;

type Observer<T> = Box<dyn FnOnce(&Outcome<T>) + Send + 'static>;

enum Slot<T> {
    Pending(Vec<Observer<T>>),
    Done(Outcome<T>),
}

struct Shared<T> {
    task_id: TaskId,
    slot: Mutex<Slot<T>>,
    ready: Condvar,
    notify: Notify,
}

impl<T: Clone + Send + 'static> Shared<T> {
    fn complete(&self, outcome: Outcome<T>) -> bool {
        let observers = {
            let mut slot = lock(&self.slot);
            let observers = match &mut *slot {
                Slot::Done(_) => return false,
                Slot::Pending(observers) => mem::take(observers),
            };
            *slot = Slot::Done(outcome.clone());
            observers
        };

        self.ready.notify_all();
        self.notify.notify_waiters();

        for observer in observers {
            run_observer(self.task_id, observer, &outcome);
        }
        true
    }
}

/// Observers never unwind into whoever completed the cell.
fn run_observer<T>(task_id: TaskId, observer: Observer<T>, outcome: &Outcome<T>) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| observer(outcome))) {
        let failure = TaskFailure::from_panic(payload);
        tracing::error!(%task_id, error = %failure, "completion observer panicked");
    }
}

/// Create a linked writer/reader pair for `task_id`.
pub fn pair<T: Clone + Send + 'static>(task_id: TaskId) -> (Completer<T>, Completion<T>) {
    let shared = Arc::new(Shared {
        task_id,
        slot: Mutex::new(Slot::Pending(Vec::new())),
        ready: Condvar::new(),
        notify: Notify::new(),
    });
    (
        Completer {
            shared: Arc::clone(&shared),
        },
        Completion { shared },
    )
}

/// Write side of a completion. Owned by whoever runs the task.
///
/// Dropping a completer that never completed fails the result as abandoned,
/// so waiters are never left blocked on a producer that is gone.
pub struct Completer<T: Clone + Send + 'static> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + 'static> Completer<T> {
    /// Publish the terminal outcome and run registered observers on the
    /// calling thread.
    ///
    /// Returns `false` (and changes nothing) if an outcome was already
    /// published.
    pub fn complete(&self, outcome: Outcome<T>) -> bool {
        self.shared.complete(outcome)
    }

    pub fn task_id(&self) -> TaskId {
        self.shared.task_id
    }
}

impl<T: Clone + Send + 'static> Drop for Completer<T> {
    fn drop(&mut self) {
        self.shared.complete(Err(TaskFailure::abandoned()));
    }
}

/// Read side of a completion (the "pending result" handle).
///
/// Cheap to clone; every clone observes the same terminal outcome.
pub struct Completion<T> {
    shared: Arc<Shared<T>>,
}

/// The handle returned by `TaskRunner::submit`.
pub type PendingResult<T> = Completion<T>;

impl<T: Clone + Send + 'static> Completion<T> {
    pub fn task_id(&self) -> TaskId {
        self.shared.task_id
    }

    /// `Queued` until the outcome is published, then `Completed` or `Failed`.
    pub fn state(&self) -> TaskState {
        match &*lock(&self.shared.slot) {
            Slot::Pending(_) => TaskState::Queued,
            Slot::Done(Ok(_)) => TaskState::Completed,
            Slot::Done(Err(_)) => TaskState::Failed,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state().is_terminal()
    }

    /// Non-blocking peek: `None` while pending.
    pub fn try_get(&self) -> Option<Result<T, RunnerError>> {
        match &*lock(&self.shared.slot) {
            Slot::Pending(_) => None,
            Slot::Done(outcome) => Some(outcome.clone().map_err(RunnerError::from)),
        }
    }

    /// Block the calling thread until the task reaches a terminal state.
    ///
    /// Never call this from inside a task or observer running on the same
    /// worker that is supposed to complete it.
    pub fn wait(&self) -> Result<T, RunnerError> {
        let mut slot = lock(&self.shared.slot);
        loop {
            if let Slot::Done(outcome) = &*slot {
                return outcome.clone().map_err(RunnerError::from);
            }
            slot = self
                .shared
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`wait`](Self::wait), but gives up with `AwaitTimeout` after
    /// `timeout`. The task keeps running.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<T, RunnerError> {
        let slot = lock(&self.shared.slot);
        let (slot, _) = self
            .shared
            .ready
            .wait_timeout_while(slot, timeout, |slot| matches!(slot, Slot::Pending(_)))
            .unwrap_or_else(PoisonError::into_inner);
        match &*slot {
            Slot::Done(outcome) => outcome.clone().map_err(RunnerError::from),
            Slot::Pending(_) => Err(RunnerError::AwaitTimeout(timeout)),
        }
    }

    /// Wait without blocking an async executor thread.
    pub async fn wait_async(&self) -> Result<T, RunnerError> {
        loop {
            // register before checking, otherwise a completion between the
            // check and the await is lost
            let notified = self.shared.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(result) = self.try_get() {
                return result;
            }
            notified.await;
        }
    }

    /// Run `observer` once the outcome is known.
    ///
    /// If the completion is still pending the observer runs on the thread
    /// that completes it (the worker); otherwise it runs right here. A
    /// panicking observer is logged and swallowed.
    pub fn on_complete<F>(&self, observer: F)
    where
        F: FnOnce(&Outcome<T>) + Send + 'static,
    {
        let outcome = {
            let mut slot = lock(&self.shared.slot);
            match &mut *slot {
                Slot::Pending(observers) => {
                    observers.push(Box::new(observer));
                    return;
                }
                Slot::Done(outcome) => outcome.clone(),
            }
        };
        run_observer(self.shared.task_id, Box::new(observer), &outcome);
    }
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Send + 'static> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("task_id", &self.task_id())
            .field("state", &self.state())
            .finish()
    }
}
