//! ComposableResult - chaining on top of a completion.
//!
//! Each combinator registers an observer on the upstream completion and
//! returns a fresh downstream one, so chained closures run on whichever
//! thread publishes the upstream outcome (normally the worker).

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::time::Duration;

use crate::completion::{self, Completion, Outcome};
use crate::domain::{TaskId, TaskState};
use crate::error::RunnerError;

pub struct ComposableResult<T> {
    inner: Completion<T>,
}

impl<T: Clone + Send + 'static> ComposableResult<T> {
    pub fn task_id(&self) -> TaskId {
        self.inner.task_id()
    }

    pub fn state(&self) -> TaskState {
        self.inner.state()
    }

    pub fn is_done(&self) -> bool {
        self.inner.is_done()
    }

    pub fn try_get(&self) -> Option<Result<T, RunnerError>> {
        self.inner.try_get()
    }

    pub fn wait(&self) -> Result<T, RunnerError> {
        self.inner.wait()
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Result<T, RunnerError> {
        self.inner.wait_timeout(timeout)
    }

    pub async fn wait_async(&self) -> Result<T, RunnerError> {
        self.inner.wait_async().await
    }

    pub fn on_complete<F>(&self, observer: F)
    where
        F: FnOnce(&Outcome<T>) + Send + 'static,
    {
        self.inner.on_complete(observer);
    }

    /// Transform the value once it is available. Failures pass through
    /// untouched; a panicking `f` fails the downstream result.
    pub fn map<U, F>(self, f: F) -> ComposableResult<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let (completer, downstream) = completion::pair(self.task_id());
        self.inner.on_complete(move |outcome| {
            completer.complete(outcome.clone().map(f));
        });
        downstream.into()
    }

    /// Chain a step that itself produces a result handle, typically another
    /// `submit_async` on the same runner.
    ///
    /// `f` runs on the worker: it may submit more work but must not wait on
    /// it.
    pub fn then<U, F>(self, f: F) -> ComposableResult<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> ComposableResult<U> + Send + 'static,
    {
        let (completer, downstream) = completion::pair(self.task_id());
        self.inner.on_complete(move |outcome| match outcome {
            Ok(value) => {
                let next = f(value.clone());
                next.inner.on_complete(move |outcome| {
                    completer.complete(outcome.clone());
                });
            }
            Err(failure) => {
                completer.complete(Err(failure.clone()));
            }
        });
        downstream.into()
    }

    /// Fallible transform: an `Err` from `f` fails the downstream result.
    pub fn and_then<U, F>(self, f: F) -> ComposableResult<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Outcome<U> + Send + 'static,
    {
        let (completer, downstream) = completion::pair(self.task_id());
        self.inner.on_complete(move |outcome| {
            completer.complete(outcome.clone().and_then(f));
        });
        downstream.into()
    }

    pub fn into_completion(self) -> Completion<T> {
        self.inner
    }
}

impl<T> From<Completion<T>> for ComposableResult<T> {
    fn from(inner: Completion<T>) -> Self {
        Self { inner }
    }
}

impl<T> Clone for ComposableResult<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> IntoFuture for ComposableResult<T> {
    type Output = Result<T, RunnerError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.inner.wait_async().await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::Completer;
    use crate::error::TaskFailure;

    fn pending() -> (Completer<u32>, ComposableResult<u32>) {
        let (completer, completion) = completion::pair(TaskId::new(1));
        (completer, completion.into())
    }

    #[test]
    fn map_applies_after_completion() {
        let (completer, result) = pending();
        let doubled = result.map(|v| v * 2).map(|v| format!("value={v}"));
        assert_eq!(doubled.state(), TaskState::Queued);

        completer.complete(Ok(21));
        assert_eq!(doubled.wait().unwrap(), "value=42");
    }

    #[test]
    fn map_skips_failures() {
        let (completer, result) = pending();
        let mapped = result.map(|_| -> u32 { panic!("must not run") });
        completer.complete(Err(TaskFailure::new("upstream")));

        assert_eq!(
            mapped.wait(),
            Err(RunnerError::TaskFailed(TaskFailure::new("upstream")))
        );
    }

    #[test]
    fn panicking_map_fails_downstream() {
        let (completer, result) = pending();
        let mapped = result.map(|_| -> u32 { panic!("bad map") });
        completer.complete(Ok(1));

        assert_eq!(mapped.wait(), Err(RunnerError::Abandoned));
    }

    #[test]
    fn then_flattens_nested_result() {
        let (first, result) = pending();
        let (second, next) = pending();

        let chained = result.then(move |v| next.map(move |w| v + w));
        first.complete(Ok(1));
        assert_eq!(chained.state(), TaskState::Queued);

        second.complete(Ok(10));
        assert_eq!(chained.wait().unwrap(), 11);
    }

    #[test]
    fn and_then_can_fail() {
        let (completer, result) = pending();
        let checked = result.and_then(|v| {
            if v > 50 {
                Err(TaskFailure::new("too large"))
            } else {
                Ok(v)
            }
        });
        completer.complete(Ok(70));
        assert!(matches!(
            checked.wait(),
            Err(RunnerError::TaskFailed(f)) if f.message() == "too large"
        ));
    }

    #[tokio::test]
    async fn can_be_awaited_directly() {
        let (completer, result) = pending();
        completer.complete(Ok(4));
        assert_eq!(result.map(|v| v + 1).await.unwrap(), 5);
    }
}
