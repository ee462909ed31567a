//! # Domain Errors
//!
//! Error types for the raffle sync core.
//!
//! Only `ClockMisconfigured` and `InvalidConfig` are fatal, and only at
//! construction time. Everything raised inside a fetch cycle is downgraded
//! to the Degraded indicator by the controller.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Raffle sync error types.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RaffleSyncError {
    /// Epoch window with `end <= start`.
    #[error("Clock misconfigured: epoch end {end} is not after start {start}")]
    ClockMisconfigured {
        /// Configured start instant
        start: DateTime<Utc>,
        /// Configured end instant
        end: DateTime<Utc>,
    },

    /// A remote endpoint could not be read.
    #[error("Fetch failed ({endpoint}): {reason}")]
    FetchFailed {
        /// Logical endpoint name (prize, participants, ...)
        endpoint: &'static str,
        /// Underlying cause
        reason: String,
    },

    /// The whole fetch cycle exceeded its deadline.
    #[error("Fetch cycle timed out after {after_ms}ms")]
    FetchTimedOut {
        /// Deadline in milliseconds
        after_ms: u64,
    },

    /// An entry record is missing a required field or carries an invalid value.
    #[error("Malformed entry at index {index}: {reason}")]
    MalformedEntry {
        /// Position in the payload
        index: usize,
        /// What was wrong
        reason: String,
    },

    /// Configuration values that cannot be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// `start()` called on a controller that is already running.
    #[error("Live sync controller is already running")]
    AlreadyRunning,

    /// The controller was shut down and cannot be restarted.
    #[error("Live sync controller has been shut down")]
    ShutDown,

    /// No tokio runtime available to spawn the sync tasks on.
    #[error("No async runtime: {0}")]
    NoRuntime(String),
}

impl RaffleSyncError {
    /// Build a `FetchFailed` for the given endpoint.
    pub fn fetch_failed(endpoint: &'static str, reason: impl ToString) -> Self {
        Self::FetchFailed {
            endpoint,
            reason: reason.to_string(),
        }
    }

    /// Transient errors are retried on the next scheduled fetch.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::FetchFailed { .. } | Self::FetchTimedOut { .. })
    }
}
