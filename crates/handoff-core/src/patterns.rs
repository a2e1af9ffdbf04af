//! Five ways to wait for a task run on a [`TaskRunner`].
//!
//! | pattern | waiting discipline |
//! |---|---|
//! | [`blocking_wait`] | block on the result handle |
//! | [`with_callback`] | callback on the worker at completion |
//! | [`composable`] | chainable handle, awaited |
//! | [`countdown`] | latch + write-once slot |
//! | [`monitor`] | lock/condition with a bounded wait |
//!
//! The first three use the result handle directly. The latch and monitor
//! variants rebuild the same handoff out of bare primitives and exist to
//! show how they compare. [`monitor`] in particular can give up before the
//! task finishes; [`countdown`] cannot.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::completion::Outcome;
use crate::error::{RunnerError, TaskFailure};
use crate::runner::TaskRunner;
use crate::sync::{CountDownOnDrop, CountdownLatch, Monitor};

/// Run `task` on the current thread, turning a panic into a failed outcome.
/// The latch and monitor variants bypass the result handle, so they have to
/// capture panics themselves.
fn run_captured<T, F>(task: F) -> Outcome<T>
where
    F: FnOnce() -> Outcome<T>,
{
    panic::catch_unwind(AssertUnwindSafe(task))
        .unwrap_or_else(|payload| Err(TaskFailure::from_panic(payload)))
}

/// Submit and block until the result is available.
pub fn blocking_wait<T, F>(runner: &TaskRunner, task: F) -> Result<T, RunnerError>
where
    T: Clone + Send + 'static,
    F: FnOnce() -> Outcome<T> + Send + 'static,
{
    let handle = runner.submit(task)?;
    let value = handle.wait()?;
    tracing::info!(task_id = %handle.task_id(), "blocking_wait finished");
    Ok(value)
}

/// Submit with a completion callback, then read the value back through the
/// handle.
///
/// Waiters are woken before observers run, so this also waits for the
/// callback itself (panicking or not) before returning.
pub fn with_callback<T, F, C>(runner: &TaskRunner, task: F, callback: C) -> Result<T, RunnerError>
where
    T: Clone + Send + 'static,
    F: FnOnce() -> Outcome<T> + Send + 'static,
    C: FnOnce(&Outcome<T>) + Send + 'static,
{
    let callback_done = Arc::new(CountdownLatch::new(1));
    let handle = {
        let callback_done = Arc::clone(&callback_done);
        runner.submit_with_callback(task, move |outcome| {
            let _release = CountDownOnDrop(&callback_done);
            callback(outcome);
        })?
    };

    let value = handle.wait();
    callback_done.wait();
    tracing::info!(task_id = %handle.task_id(), "with_callback finished");
    value
}

/// Submit through the composable API and await it.
pub async fn composable<T, F>(runner: &TaskRunner, task: F) -> Result<T, RunnerError>
where
    T: Clone + Send + 'static,
    F: FnOnce() -> Outcome<T> + Send + 'static,
{
    let handle = runner.submit_async(task)?;
    let task_id = handle.task_id();
    let value = handle.await?;
    tracing::info!(%task_id, "composable finished");
    Ok(value)
}

/// The worker stores the outcome in a shared slot and counts a one-shot
/// latch down; the caller waits on the latch and reads the slot.
pub fn countdown<T, F>(runner: &TaskRunner, task: F) -> Result<T, RunnerError>
where
    T: Send + Sync + 'static,
    F: FnOnce() -> Outcome<T> + Send + 'static,
{
    let mut values = countdown_all(runner, vec![task])?;
    values
        .pop()
        .ok_or_else(|| TaskFailure::new("task finished without storing a result").into())
}

/// [`countdown`] generalized to N tasks: one latch with count N, one slot
/// per task. Returns the values in submission order, or the first failure.
pub fn countdown_all<T, F>(runner: &TaskRunner, tasks: Vec<F>) -> Result<Vec<T>, RunnerError>
where
    T: Send + Sync + 'static,
    F: FnOnce() -> Outcome<T> + Send + 'static,
{
    let latch = Arc::new(CountdownLatch::new(tasks.len()));
    let slots: Vec<Arc<OnceLock<Outcome<T>>>> =
        tasks.iter().map(|_| Arc::new(OnceLock::new())).collect();

    for (task, slot) in tasks.into_iter().zip(&slots) {
        let latch = Arc::clone(&latch);
        let slot = Arc::clone(slot);
        runner.execute(move || {
            let _release = CountDownOnDrop(&latch);
            let _ = slot.set(run_captured(task));
            // give up our reference before the latch opens
            drop(slot);
        })?;
    }

    latch.wait();
    tracing::info!(tasks = slots.len(), "countdown released");

    slots
        .into_iter()
        .map(|slot| {
            let slot = Arc::into_inner(slot).and_then(OnceLock::into_inner);
            match slot {
                Some(outcome) => outcome.map_err(RunnerError::from),
                None => Err(TaskFailure::new("task finished without storing a result").into()),
            }
        })
        .collect()
}

/// The worker publishes under the monitor's lock and signals; the caller
/// waits at most `bound`.
///
/// Returns `AwaitTimeout(bound)` if the task is slower than the bound. The
/// task still runs to completion afterwards and its value is discarded.
pub fn monitor<T, F>(runner: &TaskRunner, task: F, bound: Duration) -> Result<T, RunnerError>
where
    T: Clone + Send + 'static,
    F: FnOnce() -> Outcome<T> + Send + 'static,
{
    let monitor = Arc::new(Monitor::new());
    {
        let monitor = Arc::clone(&monitor);
        runner.execute(move || monitor.publish(run_captured(task)))?;
    }

    match monitor.wait_timeout(bound) {
        Some(outcome) => Ok(outcome?),
        None => {
            tracing::warn!(?bound, "monitor wait elapsed before the task published");
            Err(RunnerError::AwaitTimeout(bound))
        }
    }
}

/// [`monitor`] with the bound from the runner's config.
pub fn monitor_with_configured_bound<T, F>(runner: &TaskRunner, task: F) -> Result<T, RunnerError>
where
    T: Clone + Send + 'static,
    F: FnOnce() -> Outcome<T> + Send + 'static,
{
    monitor(runner, task, runner.config().monitor_timeout)
}
