//! Task state machine.

use serde::{Deserialize, Serialize};

/// Task state.
///
/// State transitions:
/// - Queued -> Running -> Completed
/// - Queued -> Running -> Failed
///
/// A result handle only ever reports `Queued`, `Completed` or `Failed`.
/// The worker's execution records additionally use `Running` while the
/// task body is on the worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Submitted, no outcome yet.
    Queued,

    /// Currently being executed by the worker.
    Running,

    /// Produced a value.
    Completed,

    /// Returned an error or panicked.
    Failed,
}

impl TaskState {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}
