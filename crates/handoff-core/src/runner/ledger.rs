//! Execution bookkeeping: counters plus the worker-order history.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::domain::{ExecutionRecord, TaskId};
use crate::error::TaskFailure;
use crate::observability::RunnerCounts;
use crate::sync::lock;

#[derive(Default)]
struct LedgerState {
    running: usize,
    completed: usize,
    failed: usize,
    history: VecDeque<ExecutionRecord>,
}

pub(crate) struct Ledger {
    state: Mutex<LedgerState>,
    history_limit: usize,
}

impl Ledger {
    pub(crate) fn new(history_limit: usize) -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            history_limit,
        }
    }

    pub(crate) fn start(&self, task_id: TaskId) {
        let mut state = lock(&self.state);
        state.running += 1;
        if self.history_limit == 0 {
            return;
        }
        if state.history.len() == self.history_limit {
            state.history.pop_front();
        }
        state.history.push_back(ExecutionRecord::started(task_id));
    }

    pub(crate) fn finish(&self, task_id: TaskId, status: &Result<(), TaskFailure>) {
        let mut state = lock(&self.state);
        state.running = state.running.saturating_sub(1);
        match status {
            Ok(()) => state.completed += 1,
            Err(_) => state.failed += 1,
        }

        // the worker is serial, so the running record is always the newest
        if let Some(record) = state
            .history
            .back_mut()
            .filter(|record| record.task_id == task_id)
        {
            match status {
                Ok(()) => record.mark_completed(),
                Err(failure) => record.mark_failed(failure),
            }
        }
    }

    pub(crate) fn counts(&self, queued: usize) -> RunnerCounts {
        let state = lock(&self.state);
        RunnerCounts {
            queued,
            running: state.running,
            completed: state.completed,
            failed: state.failed,
        }
    }

    pub(crate) fn history(&self) -> Vec<ExecutionRecord> {
        lock(&self.state).history.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskState;

    #[test]
    fn counts_follow_start_and_finish() {
        let ledger = Ledger::new(8);
        ledger.start(TaskId::new(1));
        assert_eq!(ledger.counts(2).running, 1);

        ledger.finish(TaskId::new(1), &Ok(()));
        ledger.start(TaskId::new(2));
        ledger.finish(TaskId::new(2), &Err(TaskFailure::new("x")));

        let counts = ledger.counts(0);
        assert_eq!(counts.running, 0);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.failed, 1);

        let history = ledger.history();
        assert_eq!(history[0].state, TaskState::Completed);
        assert_eq!(history[1].state, TaskState::Failed);
        assert_eq!(history[1].error.as_deref(), Some("x"));
    }

    #[test]
    fn history_is_bounded() {
        let ledger = Ledger::new(2);
        for n in 1..=3 {
            ledger.start(TaskId::new(n));
            ledger.finish(TaskId::new(n), &Ok(()));
        }
        let ids: Vec<_> = ledger.history().iter().map(|r| r.task_id).collect();
        assert_eq!(ids, vec![TaskId::new(2), TaskId::new(3)]);
        assert_eq!(ledger.counts(0).completed, 3);
    }

    #[test]
    fn zero_limit_keeps_no_history() {
        let ledger = Ledger::new(0);
        ledger.start(TaskId::new(1));
        ledger.finish(TaskId::new(1), &Ok(()));
        assert!(ledger.history().is_empty());
        assert_eq!(ledger.counts(0).completed, 1);
    }
}
