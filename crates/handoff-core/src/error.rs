use std::any::Any;
use std::time::Duration;

use thiserror::Error;

/// Why a task did not produce a value.
///
/// Cloneable so that every observer of a result reads the same failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task failed: {message}")]
pub struct TaskFailure {
    message: String,
    kind: FailureKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureKind {
    Returned,
    Panicked,
    Abandoned,
}

impl TaskFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: FailureKind::Returned,
        }
    }

    /// Build a failure from a payload caught by `catch_unwind`.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self {
            message: format!("panicked: {message}"),
            kind: FailureKind::Panicked,
        }
    }

    /// The producer side went away without ever publishing an outcome.
    pub(crate) fn abandoned() -> Self {
        Self {
            message: "result abandoned before completion".to_string(),
            kind: FailureKind::Abandoned,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_panic(&self) -> bool {
        self.kind == FailureKind::Panicked
    }

    pub fn is_abandoned(&self) -> bool {
        self.kind == FailureKind::Abandoned
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunnerError {
    #[error("task submitted after shutdown")]
    SubmissionAfterShutdown,

    #[error(transparent)]
    TaskFailed(TaskFailure),

    /// The result was dropped without ever being completed, e.g. a chained
    /// closure panicked or the job never ran.
    #[error("result abandoned before completion")]
    Abandoned,

    #[error("no result within {0:?}")]
    AwaitTimeout(Duration),

    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(String),
}

impl From<TaskFailure> for RunnerError {
    fn from(failure: TaskFailure) -> Self {
        if failure.is_abandoned() {
            RunnerError::Abandoned
        } else {
            RunnerError::TaskFailed(failure)
        }
    }
}
