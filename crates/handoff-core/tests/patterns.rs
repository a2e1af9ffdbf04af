use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use handoff_core::tasks::{RANDOM_UPPER_BOUND, random_value};
use handoff_core::{Outcome, RunnerConfig, RunnerError, TaskRunner, patterns};

#[tokio::test(flavor = "multi_thread")]
async fn all_five_patterns_share_one_worker() {
    let runner = TaskRunner::new(RunnerConfig::default()).unwrap();
    let callback_value = Arc::new(Mutex::new(None));

    let first = patterns::blocking_wait(&runner, random_value).unwrap();

    let seen = Arc::clone(&callback_value);
    let second = patterns::with_callback(&runner, random_value, move |outcome| {
        *seen.lock().unwrap() = outcome.clone().ok();
    })
    .unwrap();

    let third = patterns::composable(&runner, random_value).await.unwrap();
    let fourth = patterns::countdown(&runner, random_value).unwrap();
    let fifth = patterns::monitor(&runner, random_value, Duration::from_secs(10)).unwrap();

    for value in [first, second, third, fourth, fifth] {
        assert!(value < RANDOM_UPPER_BOUND);
    }
    assert_eq!(*callback_value.lock().unwrap(), Some(second));

    runner.join();
    let counts = runner.counts();
    assert_eq!(counts.completed, 5);
    assert_eq!(counts.failed, 0);
}

/// The monitor gives up after its bound even though the task would have
/// produced a value; the latch pattern waits it out.
#[test]
fn monitor_bound_elapses_before_slow_task() {
    let runner = TaskRunner::new(RunnerConfig::default()).unwrap();
    let bound = Duration::from_millis(10);

    let slow = || -> Outcome<u32> {
        thread::sleep(Duration::from_millis(150));
        Ok(1)
    };

    assert_eq!(
        patterns::monitor(&runner, slow, bound),
        Err(RunnerError::AwaitTimeout(bound))
    );
    assert_eq!(patterns::countdown(&runner, slow).unwrap(), 1);
}

#[test]
fn countdown_all_reports_first_failure() {
    let runner = TaskRunner::new(RunnerConfig::default()).unwrap();
    let tasks: Vec<Box<dyn FnOnce() -> Outcome<u32> + Send>> = vec![
        Box::new(|| Ok(1)),
        Box::new(|| Err(handoff_core::TaskFailure::new("second"))),
        Box::new(|| Ok(3)),
    ];

    assert!(matches!(
        patterns::countdown_all(&runner, tasks),
        Err(RunnerError::TaskFailed(f)) if f.message() == "second"
    ));

    // the failure lives in the slot; the worker saw three finished jobs
    runner.join();
    assert_eq!(runner.counts().completed, 3);
}
