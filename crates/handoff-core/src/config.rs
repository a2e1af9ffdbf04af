//! RunnerConfig - ランナーの設定
//!
//! Every field has a default, so a partial (or empty) JSON document is a
//! valid config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid runner config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Worker thread name prefix; a process-wide sequence number is appended.
    pub thread_name_prefix: String,

    /// Bound for the monitor wait/notify pattern.
    #[serde(rename = "monitor_timeout_ms", with = "duration_ms")]
    pub monitor_timeout: Duration,

    /// Number of execution records kept; 0 disables the history.
    pub history_limit: usize,
}

impl RunnerConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub fn with_monitor_timeout(mut self, timeout: Duration) -> Self {
        self.monitor_timeout = timeout;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: "handoff - ".to_string(),
            monitor_timeout: Duration::from_secs(10),
            history_limit: 1024,
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
