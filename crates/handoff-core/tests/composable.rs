use std::sync::Arc;

use handoff_core::{ComposableResult, Outcome, RunnerConfig, RunnerError, TaskFailure, TaskRunner};

fn runner() -> Arc<TaskRunner> {
    Arc::new(TaskRunner::new(RunnerConfig::default()).unwrap())
}

#[tokio::test]
async fn map_runs_after_task() {
    let runner = runner();
    let label = runner
        .submit_async(|| Ok(6u32))
        .unwrap()
        .map(|v| v * 7)
        .map(|v| format!("answer={v}"));
    assert_eq!(label.await.unwrap(), "answer=42");
}

#[tokio::test]
async fn then_submits_follow_up_on_same_runner() {
    let runner = runner();
    let chained_runner = Arc::clone(&runner);

    let total: ComposableResult<u32> = runner
        .submit_async(|| Ok(5u32))
        .unwrap()
        .then(move |first| {
            chained_runner
                .submit_async(move || Ok(first + 10))
                .expect("runner still accepts work")
        });

    assert_eq!(total.await.unwrap(), 15);
    let history = runner.history();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn failure_skips_the_rest_of_the_chain() {
    let runner = runner();
    let result = runner
        .submit_async(|| -> Outcome<u32> { Err(TaskFailure::new("first step")) })
        .unwrap()
        .map(|v| v + 1)
        .and_then(|v| Ok(v * 2))
        .await;

    assert_eq!(
        result,
        Err(RunnerError::TaskFailed(TaskFailure::new("first step")))
    );
}

#[test]
fn composable_handle_also_blocks() {
    let runner = runner();
    let handle = runner.submit_async(|| Ok("sync")).unwrap();
    assert_eq!(handle.wait().unwrap(), "sync");
    assert!(handle.is_done());
}
