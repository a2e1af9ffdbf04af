use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::completion::{Completer, Outcome};
use crate::error::TaskFailure;
use crate::runner::ledger::Ledger;
use crate::runner::queue::JobQueue;

/// A queued unit of work, type-erased over its result type.
///
/// The worker owns the job and must call `execute` then `publish`.
/// Splitting the two lets the worker record the outcome before any waiter
/// can observe it.
pub(crate) trait Job: Send {
    /// Run the task body. Errors and panics are captured, never propagated.
    fn execute(&mut self) -> Result<(), TaskFailure>;

    /// Publish the captured outcome to waiters and observers.
    fn publish(self: Box<Self>);
}

/// A task together with the completer for its result.
pub(crate) struct Packaged<T, F>
where
    T: Clone + Send + 'static,
{
    task: Option<F>,
    outcome: Option<Outcome<T>>,
    completer: Completer<T>,
}

impl<T, F> Packaged<T, F>
where
    T: Clone + Send + 'static,
    F: FnOnce() -> Outcome<T> + Send + 'static,
{
    pub(crate) fn new(task: F, completer: Completer<T>) -> Self {
        Self {
            task: Some(task),
            outcome: None,
            completer,
        }
    }
}

impl<T, F> Job for Packaged<T, F>
where
    T: Clone + Send + 'static,
    F: FnOnce() -> Outcome<T> + Send + 'static,
{
    fn execute(&mut self) -> Result<(), TaskFailure> {
        let Some(task) = self.task.take() else {
            return Err(TaskFailure::new("task already executed"));
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(task))
            .unwrap_or_else(|payload| Err(TaskFailure::from_panic(payload)));
        let status = match &outcome {
            Ok(_) => Ok(()),
            Err(failure) => Err(failure.clone()),
        };
        self.outcome = Some(outcome);
        status
    }

    fn publish(self: Box<Self>) {
        // an unexecuted job drops its completer, which abandons the result
        if let Some(outcome) = self.outcome {
            self.completer.complete(outcome);
        }
    }
}

pub(crate) fn spawn(
    name: String,
    queue: Arc<JobQueue>,
    ledger: Arc<Ledger>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(name.clone())
        .spawn(move || worker_loop(&name, &queue, &ledger))
}

fn worker_loop(worker: &str, queue: &JobQueue, ledger: &Ledger) {
    tracing::info!(worker, "worker started");

    while let Some(queued) = queue.pop() {
        let task_id = queued.id;
        let mut job = queued.job;

        ledger.start(task_id);
        tracing::debug!(worker, %task_id, "executing task");

        let status = job.execute();
        if let Err(failure) = &status {
            tracing::warn!(worker, %task_id, error = %failure, "task failed");
        }
        ledger.finish(task_id, &status);

        // observers (callbacks, chained closures) run here, on the worker
        job.publish();
    }

    tracing::info!(worker, "worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::pair;
    use crate::domain::{TaskId, TaskState};
    use crate::error::RunnerError;

    #[test]
    fn packaged_captures_panics() {
        let (completer, completion) = pair::<u32>(TaskId::new(1));
        let mut job: Box<dyn Job> = Box::new(Packaged::new(
            || -> Outcome<u32> { panic!("kaboom") },
            completer,
        ));

        let status = job.execute();
        assert!(matches!(&status, Err(f) if f.is_panic()));
        assert_eq!(completion.state(), TaskState::Queued);

        job.publish();
        assert!(matches!(
            completion.wait(),
            Err(RunnerError::TaskFailed(f)) if f.message() == "panicked: kaboom"
        ));
    }

    #[test]
    fn unexecuted_job_abandons_result() {
        let (completer, completion) = pair::<u32>(TaskId::new(1));
        let job: Box<dyn Job> = Box::new(Packaged::new(|| Ok(1), completer));
        job.publish();
        assert_eq!(completion.state(), TaskState::Failed);
        assert_eq!(completion.wait(), Err(RunnerError::Abandoned));
    }
}
