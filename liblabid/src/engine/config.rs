// liblabid/src/engine/config.rs

use crate::utils::{DEFAULT_READ_TIMEOUT_MS, DEFAULT_RETRIES};

/// Timeout and retry policy of a [`ProtocolEngine`](crate::engine::ProtocolEngine).
///
/// Both are deployment settings. A transient failure is retried `retries`
/// times, so one exchange makes at most `retries + 1` attempts, each bounded
/// by `timeout_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EngineConfig {
    /// Read timeout per attempt.
    pub timeout_ms: u64,
    /// Extra attempts after a transient failure.
    pub retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            retries: DEFAULT_RETRIES,
        }
    }
}

impl EngineConfig {
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}
