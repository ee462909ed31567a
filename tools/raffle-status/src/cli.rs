//! Command-line arguments.
//!
//! Every flag is optional and overrides the value loaded from the
//! environment, which in turn overrides the built-in default.

use anyhow::{bail, Result};
use clap::Parser;
use raffle_sync::domain::{parse_instant, SECS_PER_DAY};
use raffle_sync::{EpochSchedule, HttpSourceConfig, SyncConfig};
use raffle_telemetry::TelemetryConfig;

/// Epok raffle live status
#[derive(Parser, Debug, Clone)]
#[command(name = "raffle-status")]
#[command(about = "Live countdown, prize and participants of the Epok raffle")]
pub struct Args {
    /// Raffle backend base URL (env: RAFFLE_API_URL)
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Epoch number to display (env: RAFFLE_EPOCH_ID)
    #[arg(long)]
    pub epoch_id: Option<u64>,

    /// Epoch window start, RFC 3339 or naive UTC (needs --epoch-end)
    #[arg(long, requires = "epoch_end")]
    pub epoch_start: Option<String>,

    /// Epoch window end, RFC 3339 or naive UTC (needs --epoch-start)
    #[arg(long, requires = "epoch_start")]
    pub epoch_end: Option<String>,

    /// Fixed-cycle anchor instant
    #[arg(long, conflicts_with = "epoch_start")]
    pub anchor: Option<String>,

    /// Fixed-cycle length in days
    #[arg(long, conflicts_with = "epoch_start")]
    pub cycle_days: Option<u64>,

    /// Fetch interval in seconds
    #[arg(short, long)]
    pub refresh: Option<u64>,

    /// Clock tick in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Timeout for one fetch cycle in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Also show the latest winner
    #[arg(long)]
    pub winner: bool,

    /// Also show the backend's epoch bounds
    #[arg(long)]
    pub bounds: bool,

    /// Render entry times at this offset east of UTC, in seconds
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<i32>,

    /// Raffle wallet address shown in the header (env: RAFFLE_WALLET_ADDRESS)
    #[arg(long)]
    pub wallet: Option<String>,

    /// Number of participant rows to print
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Order participants by tickets instead of entry order
    #[arg(long)]
    pub leaderboard: bool,

    /// Run in demo mode with fake data (no backend required)
    #[arg(long)]
    pub demo: bool,

    /// Fetch once, print, and exit
    #[arg(long)]
    pub once: bool,

    /// Print snapshots and views as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Log filter, e.g. `info` or `raffle_sync=debug`
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Layer the flags over `base`.
    pub fn sync_config(&self, base: SyncConfig) -> Result<SyncConfig> {
        let mut config = base;

        if let Some(id) = self.epoch_id {
            config.epoch_id = id;
        }

        if let (Some(start), Some(end)) = (&self.epoch_start, &self.epoch_end) {
            config.schedule = EpochSchedule::Window {
                start: instant(start, "--epoch-start")?,
                end: instant(end, "--epoch-end")?,
            };
        } else if self.anchor.is_some() || self.cycle_days.is_some() {
            // A window base turns into a cycle of the same length from its start.
            let (mut anchor, mut cycle_length_secs) = match &config.schedule {
                EpochSchedule::FixedCycle {
                    anchor,
                    cycle_length_secs,
                } => (*anchor, *cycle_length_secs),
                EpochSchedule::Window { start, end } => {
                    (*start, (*end - *start).num_seconds().max(0) as u64)
                }
            };
            if let Some(raw) = &self.anchor {
                anchor = instant(raw, "--anchor")?;
            }
            if let Some(days) = self.cycle_days {
                cycle_length_secs = days.saturating_mul(SECS_PER_DAY);
            }
            config.schedule = EpochSchedule::FixedCycle {
                anchor,
                cycle_length_secs,
            };
        }

        if let Some(secs) = self.refresh {
            config.refresh_interval_secs = secs;
        }
        if let Some(ms) = self.tick_ms {
            config.clock_tick_ms = ms;
        }
        if let Some(ms) = self.timeout_ms {
            config.fetch_timeout_ms = ms;
        }
        if self.winner {
            config.winner_enabled = true;
        }
        if self.bounds {
            config.epoch_bounds_enabled = true;
        }
        if let Some(offset) = self.utc_offset {
            config.display_utc_offset_secs = offset;
        }

        config.validate()?;
        Ok(config)
    }

    /// Layer the endpoint flag over `base`.
    pub fn http_config(&self, base: HttpSourceConfig) -> HttpSourceConfig {
        match &self.endpoint {
            Some(url) => HttpSourceConfig {
                base_url: url.clone(),
                ..base
            },
            None => base,
        }
    }

    /// Layer the logging flags over `base`.
    pub fn telemetry_config(&self, base: TelemetryConfig) -> TelemetryConfig {
        let mut config = base;
        if self.json_logs {
            config.json_logs = true;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config
    }
}

fn instant(raw: &str, flag: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    match parse_instant(raw) {
        Some(t) => Ok(t),
        None => bail!("{flag}: cannot parse {raw:?} as a timestamp"),
    }
}
