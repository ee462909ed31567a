//! # Raffle Telemetry
//!
//! Structured logging for the Epok raffle tools.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use raffle_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // events are now written to stderr
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RAFFLE_SERVICE_NAME` | `raffle-status` | Logged at startup and shutdown |
//! | `RAFFLE_LOG_LEVEL` / `RUST_LOG` | `info` | Level filter |
//! | `RAFFLE_JSON_LOGS` | `false` (`true` in containers) | JSON lines output |
//! | `RAFFLE_CONSOLE_OUTPUT` | `true` | Write events at all |

#![warn(missing_docs)]

mod config;
mod logging;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::{build_filter, TracingGuard};

#[doc(hidden)]
pub use tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber was already installed, or installation failed.
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    /// Unusable configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let tracing_guard = tracing_setup::init_tracing(&config)?;
    Ok(TelemetryGuard {
        tracing: tracing_guard,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    tracing: TracingGuard,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.tracing.service_name(), "Shutting down telemetry...");
    }
}
