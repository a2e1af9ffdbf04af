//! FIFO job queue shared by submitters and the worker.
//!
//! # 学習ポイント
//! - Mutex + Condvar による blocking pop
//! - id の採番を push と同じロック内で行う（採番順 = 実行順）
//! - close 後の push はエラー、pop は残りを drain してから None

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, PoisonError};

use crate::domain::TaskId;
use crate::error::RunnerError;
use crate::runner::Job;
use crate::sync::lock;

pub(crate) struct QueuedJob {
    pub(crate) id: TaskId,
    pub(crate) job: Box<dyn Job>,
}

struct QueueState {
    jobs: VecDeque<QueuedJob>,
    closed: bool,
    next_id: TaskId,
}

pub(crate) struct JobQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl JobQueue {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                closed: false,
                next_id: TaskId::new(1),
            }),
            available: Condvar::new(),
        }
    }

    /// Allocate the next id, let `make` build the job for it, and enqueue.
    ///
    /// `make` runs under the queue lock and must not block.
    pub(crate) fn push<R>(
        &self,
        make: impl FnOnce(TaskId) -> (Box<dyn Job>, R),
    ) -> Result<R, RunnerError> {
        let mut state = lock(&self.state);
        if state.closed {
            return Err(RunnerError::SubmissionAfterShutdown);
        }

        let id = state.next_id;
        state.next_id = id.next();
        let (job, handle) = make(id);
        state.jobs.push_back(QueuedJob { id, job });

        self.available.notify_one();
        Ok(handle)
    }

    /// Next job in submission order.
    ///
    /// Blocks while the queue is empty and open. Returns `None` once the
    /// queue is closed and drained.
    pub(crate) fn pop(&self) -> Option<QueuedJob> {
        let state = lock(&self.state);
        let mut state = self
            .available
            .wait_while(state, |state| state.jobs.is_empty() && !state.closed)
            .unwrap_or_else(PoisonError::into_inner);
        state.jobs.pop_front()
    }

    /// Stop accepting jobs. Returns `true` for the call that actually closed it.
    pub(crate) fn close(&self) -> bool {
        let mut state = lock(&self.state);
        if state.closed {
            return false;
        }
        state.closed = true;
        self.available.notify_all();
        true
    }

    pub(crate) fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.state).jobs.len()
    }
}
