//! Execution record: one entry per task the worker has picked up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{TaskId, TaskState};
use crate::error::TaskFailure;

/// What the worker did with one task.
///
/// Records are appended when the worker starts a task, so the history is the
/// worker's own view of execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub task_id: TaskId,
    pub state: TaskState,

    /// Last error message (if any).
    pub error: Option<String>,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ExecutionRecord {
    /// Mark as running.
    pub fn started(task_id: TaskId) -> Self {
        Self {
            task_id,
            state: TaskState::Running,
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn mark_completed(&mut self) {
        self.state = TaskState::Completed;
        self.finished_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, failure: &TaskFailure) {
        self.state = TaskState::Failed;
        self.error = Some(failure.message().to_string());
        self.finished_at = Some(Utc::now());
    }
}
