//! # Raffle Sync Configuration
//!
//! Configuration for the live-sync controller and the HTTP data source.
//!
//! ## Environment Variables
//!
//! | Variable                    | Field                      |
//! |-----------------------------|----------------------------|
//! | `RAFFLE_EPOCH_ID`           | `epoch_id`                 |
//! | `RAFFLE_EPOCH_START`        | window start (with `END`)  |
//! | `RAFFLE_EPOCH_END`          | window end (with `START`)  |
//! | `RAFFLE_EPOCH_ANCHOR`       | fixed-cycle anchor         |
//! | `RAFFLE_CYCLE_DAYS`         | fixed-cycle length         |
//! | `RAFFLE_CLOCK_TICK_MS`      | `clock_tick_ms`            |
//! | `RAFFLE_REFRESH_SECS`       | `refresh_interval_secs`    |
//! | `RAFFLE_FETCH_TIMEOUT_MS`   | `fetch_timeout_ms`         |
//! | `RAFFLE_WINNER_ENABLED`     | `winner_enabled`           |
//! | `RAFFLE_BOUNDS_ENABLED`     | `epoch_bounds_enabled`     |
//! | `RAFFLE_UTC_OFFSET_SECS`    | `display_utc_offset_secs`  |
//! | `RAFFLE_API_URL`            | `HttpSourceConfig::base_url` |
//!
//! Unparseable values are ignored and the default is kept.

use std::env;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{
    invariant_cycle_length, invariant_window_ordered, parse_instant, EpochWindow, RaffleSyncError,
    DEFAULT_CLOCK_TICK_MS, DEFAULT_CYCLE_DAYS, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_REFRESH_SECS,
    SECS_PER_DAY,
};

/// Epoch number shown when nothing else is configured.
pub const DEFAULT_EPOCH_ID: u64 = 535;

/// Largest accepted display offset, in seconds either side of UTC.
const MAX_UTC_OFFSET_SECS: i32 = 86_399;

/// How the epoch window is determined.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EpochSchedule {
    /// One explicit window.
    Window {
        /// Window start.
        start: DateTime<Utc>,
        /// Window end.
        end: DateTime<Utc>,
    },
    /// Back-to-back cycles of equal length from an anchor.
    FixedCycle {
        /// Start of the first cycle.
        anchor: DateTime<Utc>,
        /// Cycle length in seconds.
        cycle_length_secs: u64,
    },
}

impl Default for EpochSchedule {
    fn default() -> Self {
        Self::FixedCycle {
            anchor: default_anchor(),
            cycle_length_secs: DEFAULT_CYCLE_DAYS as u64 * SECS_PER_DAY,
        }
    }
}

fn default_anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 25, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Live-sync controller configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    /// Epoch number to display.
    pub epoch_id: u64,

    /// Window source.
    pub schedule: EpochSchedule,

    /// Clock tick period in milliseconds.
    pub clock_tick_ms: u64,

    /// Fetch cycle period in seconds.
    pub refresh_interval_secs: u64,

    /// Upper bound for one whole fetch cycle.
    pub fetch_timeout_ms: u64,

    /// Also fetch the latest winner each cycle.
    pub winner_enabled: bool,

    /// Also fetch the backend's epoch bounds each cycle.
    pub epoch_bounds_enabled: bool,

    /// Offset east of UTC used to render entry times.
    pub display_utc_offset_secs: i32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            epoch_id: DEFAULT_EPOCH_ID,
            schedule: EpochSchedule::default(),
            clock_tick_ms: DEFAULT_CLOCK_TICK_MS,
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            winner_enabled: false,
            epoch_bounds_enabled: false,
            display_utc_offset_secs: 0,
        }
    }
}

impl SyncConfig {
    /// Create a config for testing: explicit five-day window starting
    /// 2025-01-20, one-second tick, five-second refresh.
    pub fn for_testing() -> Self {
        let start = Utc
            .with_ymd_and_hms(2025, 1, 20, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Self {
            epoch_id: DEFAULT_EPOCH_ID,
            schedule: EpochSchedule::Window {
                start,
                end: start + chrono::Duration::days(DEFAULT_CYCLE_DAYS),
            },
            clock_tick_ms: 1_000,
            refresh_interval_secs: 5,
            fetch_timeout_ms: 2_000,
            winner_enabled: false,
            epoch_bounds_enabled: false,
            display_utc_offset_secs: 0,
        }
    }

    /// Load from environment variables over the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup over the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let flag = |key: &str| lookup(key).map(|v| v.to_lowercase() == "true" || v == "1");

        if let Some(id) = parsed("RAFFLE_EPOCH_ID") {
            config.epoch_id = id;
        }

        let instant = |key: &str| {
            let raw = lookup(key)?;
            let parsed = parse_instant(&raw);
            if parsed.is_none() {
                warn!(key, value = %raw, "Ignoring unparseable timestamp");
            }
            parsed
        };

        let start = instant("RAFFLE_EPOCH_START");
        let end = instant("RAFFLE_EPOCH_END");
        if start.is_some() != end.is_some() {
            warn!(
                start = ?start,
                end = ?end,
                "Epoch start and end must be set together; using the fixed cycle"
            );
        }
        if let (Some(start), Some(end)) = (start, end) {
            config.schedule = EpochSchedule::Window { start, end };
        } else if let EpochSchedule::FixedCycle {
            anchor,
            cycle_length_secs,
        } = &mut config.schedule
        {
            if let Some(a) = instant("RAFFLE_EPOCH_ANCHOR") {
                *anchor = a;
            }
            if let Some(days) = parsed("RAFFLE_CYCLE_DAYS") {
                *cycle_length_secs = days.saturating_mul(SECS_PER_DAY);
            }
        }

        if let Some(ms) = parsed("RAFFLE_CLOCK_TICK_MS") {
            config.clock_tick_ms = ms;
        }
        if let Some(secs) = parsed("RAFFLE_REFRESH_SECS") {
            config.refresh_interval_secs = secs;
        }
        if let Some(ms) = parsed("RAFFLE_FETCH_TIMEOUT_MS") {
            config.fetch_timeout_ms = ms;
        }
        if let Some(enabled) = flag("RAFFLE_WINNER_ENABLED") {
            config.winner_enabled = enabled;
        }
        if let Some(enabled) = flag("RAFFLE_BOUNDS_ENABLED") {
            config.epoch_bounds_enabled = enabled;
        }
        if let Some(offset) = lookup("RAFFLE_UTC_OFFSET_SECS").and_then(|v| v.trim().parse().ok()) {
            config.display_utc_offset_secs = offset;
        }

        config
    }

    /// Reject values the controller cannot run with.
    pub fn validate(&self) -> Result<(), RaffleSyncError> {
        match &self.schedule {
            EpochSchedule::Window { start, end } => invariant_window_ordered(*start, *end)?,
            EpochSchedule::FixedCycle {
                cycle_length_secs, ..
            } => invariant_cycle_length(*cycle_length_secs)?,
        }
        if self.clock_tick_ms == 0 {
            return Err(RaffleSyncError::InvalidConfig(
                "clock_tick_ms must be positive".to_string(),
            ));
        }
        if self.refresh_interval_secs == 0 {
            return Err(RaffleSyncError::InvalidConfig(
                "refresh_interval_secs must be positive".to_string(),
            ));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(RaffleSyncError::InvalidConfig(
                "fetch_timeout_ms must be positive".to_string(),
            ));
        }
        if self.display_utc_offset_secs.abs() > MAX_UTC_OFFSET_SECS {
            return Err(RaffleSyncError::InvalidConfig(format!(
                "display_utc_offset_secs {} out of range",
                self.display_utc_offset_secs
            )));
        }
        Ok(())
    }

    /// The concrete window to run against.
    ///
    /// A fixed cycle resolves to the cycle containing `now`.
    pub fn resolve_window(&self, now: DateTime<Utc>) -> Result<EpochWindow, RaffleSyncError> {
        match &self.schedule {
            EpochSchedule::Window { start, end } => EpochWindow::new(*start, *end),
            EpochSchedule::FixedCycle {
                anchor,
                cycle_length_secs,
            } => {
                let cycle_length = i64::try_from(*cycle_length_secs)
                    .ok()
                    .and_then(chrono::Duration::try_seconds)
                    .ok_or_else(|| {
                        RaffleSyncError::InvalidConfig(format!(
                            "cycle_length_secs {cycle_length_secs} is not representable"
                        ))
                    })?;
                EpochWindow::containing(*anchor, cycle_length, now)
            }
        }
    }

    /// Clock tick period.
    pub fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms)
    }

    /// Fetch cycle period.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Fetch cycle timeout.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

/// HTTP data source configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HttpSourceConfig {
    /// Backend base URL, without trailing `/api`.
    pub base_url: String,

    /// Per-request timeout.
    pub request_timeout_ms: u64,

    /// TCP connect timeout.
    pub connect_timeout_ms: u64,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
        }
    }
}

impl HttpSourceConfig {
    /// Config pointing at `base_url` with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load from environment variables over the defaults.
    pub fn from_env() -> Self {
        match env::var("RAFFLE_API_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }
}
