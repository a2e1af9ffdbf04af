//! TaskRunner - 単一ワーカーでのタスク実行
//!
//! # フロー
//! 1. `submit*()` で id を採番し、キューに積む（即座に handle を返す）
//! 2. ワーカースレッドが FIFO で 1 件ずつ取り出して実行
//! 3. 結果を ledger に記録してから handle を完了させる
//! 4. `shutdown()` 後はキューを drain してワーカーが終了

mod ledger;
mod queue;
mod worker;

pub(crate) use self::worker::Job;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::completion::{self, Completion, Outcome};
use crate::composable::ComposableResult;
use crate::config::RunnerConfig;
use crate::domain::{ExecutionRecord, TaskId};
use crate::error::RunnerError;
use crate::observability::RunnerCounts;
use crate::sync::lock;

use self::ledger::Ledger;
use self::queue::JobQueue;
use self::worker::Packaged;

/// Process-wide worker numbering, starting at 1.
static WORKER_SEQ: AtomicUsize = AtomicUsize::new(1);

/// Runs submitted tasks one at a time, in submission order, on a single
/// background thread.
///
/// Dropping the runner requests shutdown but does not wait for queued
/// tasks; call [`join`](Self::join) for that.
pub struct TaskRunner {
    queue: Arc<JobQueue>,
    ledger: Arc<Ledger>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_name: String,
    config: RunnerConfig,
}

impl TaskRunner {
    /// Spawn the worker thread.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let worker_name = format!(
            "{}{}",
            config.thread_name_prefix,
            WORKER_SEQ.fetch_add(1, Ordering::Relaxed)
        );
        let queue = Arc::new(JobQueue::new());
        let ledger = Arc::new(Ledger::new(config.history_limit));

        let handle = worker::spawn(
            worker_name.clone(),
            Arc::clone(&queue),
            Arc::clone(&ledger),
        )
        .map_err(|e| RunnerError::WorkerSpawn(e.to_string()))?;

        Ok(Self {
            queue,
            ledger,
            worker: Mutex::new(Some(handle)),
            worker_name,
            config,
        })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Name of the worker thread, e.g. `handoff - 1`.
    pub fn worker_name(&self) -> &str {
        &self.worker_name
    }

    /// Enqueue `task` and return its pending result without waiting.
    pub fn submit<T, F>(&self, task: F) -> Result<Completion<T>, RunnerError>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> Outcome<T> + Send + 'static,
    {
        self.queue.push(|id| {
            let (completer, completion) = completion::pair(id);
            (Box::new(Packaged::new(task, completer)) as Box<dyn Job>, completion)
        })
    }

    /// Enqueue `task` and call `callback` on the worker thread as soon as
    /// the task reaches a terminal state.
    ///
    /// A panicking callback is logged and swallowed; the worker carries on
    /// with the next task.
    pub fn submit_with_callback<T, F, C>(
        &self,
        task: F,
        callback: C,
    ) -> Result<Completion<T>, RunnerError>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> Outcome<T> + Send + 'static,
        C: FnOnce(&Outcome<T>) + Send + 'static,
    {
        self.queue.push(|id| {
            let (completer, completion) = completion::pair(id);
            // registered before the job is visible to the worker
            completion.on_complete(callback);
            (Box::new(Packaged::new(task, completer)) as Box<dyn Job>, completion)
        })
    }

    /// Like [`submit`](Self::submit), returning a handle that supports
    /// `map` / `then` and `.await`.
    pub fn submit_async<T, F>(&self, task: F) -> Result<ComposableResult<T>, RunnerError>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> Outcome<T> + Send + 'static,
    {
        self.submit(task).map(ComposableResult::from)
    }

    /// Fire-and-forget: run `work` on the worker with no result handle.
    pub fn execute<F>(&self, work: F) -> Result<TaskId, RunnerError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(move || {
            work();
            Ok(())
        })
        .map(|completion| completion.task_id())
    }

    /// Stop accepting new tasks. Already queued tasks still run.
    ///
    /// Idempotent; only the first call logs.
    pub fn shutdown(&self) {
        if self.queue.close() {
            tracing::info!(worker = %self.worker_name, queued = self.queue.len(), "shutdown requested");
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.queue.is_closed()
    }

    /// Shut down and wait for the worker to drain the queue and exit.
    ///
    /// Called from the worker itself (e.g. inside a callback) this only
    /// requests shutdown, since waiting would deadlock.
    pub fn join(&self) {
        self.shutdown();

        let handle = {
            let mut worker = lock(&self.worker);
            let on_worker = worker
                .as_ref()
                .is_some_and(|handle| handle.thread().id() == thread::current().id());
            if on_worker {
                return;
            }
            worker.take()
        };
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            tracing::error!(worker = %self.worker_name, "worker thread panicked");
        }
    }

    pub fn counts(&self) -> RunnerCounts {
        self.ledger.counts(self.queue.len())
    }

    /// Execution records in the order the worker started them.
    pub fn history(&self) -> Vec<ExecutionRecord> {
        self.ledger.history()
    }
}

impl Drop for TaskRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}
