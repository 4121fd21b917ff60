//! Timeout helpers used by the engine configuration and the stream transports.

use std::time::Duration;

/// Default read timeout in milliseconds for one request/response exchange.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

/// Default number of additional attempts after a transient failure.
pub const DEFAULT_RETRIES: u32 = 3;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Convenience: default read timeout as Duration.
pub fn default_read_timeout() -> Duration {
    ms(DEFAULT_READ_TIMEOUT_MS)
}

/// Milliseconds left of `budget_ms` since `start`, or `None` once spent.
pub fn remaining_ms(start: std::time::Instant, budget_ms: u64) -> Option<u64> {
    let elapsed = start.elapsed().as_millis() as u64;
    budget_ms.checked_sub(elapsed).filter(|&left| left > 0)
}
