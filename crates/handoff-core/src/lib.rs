//! handoff-core
//!
//! A single-worker task runner and five ways of waiting for its results.
//!
//! # モジュール構成
//! - **completion**: single-assignment promise（wait / callback / chain の土台）
//! - **runner**: TaskRunner（FIFO キュー + ワーカースレッド 1 本）
//! - **composable**: `map` / `then` / `.await` できる handle
//! - **sync**: CountdownLatch, Monitor（素の Mutex + Condvar ラッパー）
//! - **patterns**: 5 つの待ち方（blocking / callback / composable / latch / monitor）
//! - **domain**: TaskId, TaskState, ExecutionRecord
//! - **config**: RunnerConfig
//!
//! # Example
//! ```no_run
//! use handoff_core::{RunnerConfig, TaskRunner, patterns, tasks};
//!
//! let runner = TaskRunner::new(RunnerConfig::default())?;
//! let value = patterns::blocking_wait(&runner, tasks::random_value)?;
//! assert!(value < tasks::RANDOM_UPPER_BOUND);
//! runner.join();
//! # Ok::<(), handoff_core::RunnerError>(())
//! ```

pub mod completion;
pub mod composable;
pub mod config;
pub mod domain;
pub mod error;
pub mod observability;
pub mod patterns;
pub mod runner;
pub mod sync;
pub mod tasks;

pub use completion::{Completer, Completion, Outcome, PendingResult};
pub use composable::ComposableResult;
pub use config::{ConfigError, RunnerConfig};
pub use domain::{ExecutionRecord, TaskId, TaskState};
pub use error::{RunnerError, TaskFailure};
pub use observability::RunnerCounts;
pub use runner::TaskRunner;
pub use sync::{CountdownLatch, Monitor};
