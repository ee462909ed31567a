//! # Domain Value Objects
//!
//! Immutable values produced by the core and handed to the presentation
//! layer. Each is replaced as a whole, never mutated in place.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::errors::RaffleSyncError;
use super::invariants::{invariant_window_ordered, SECS_PER_DAY, SECS_PER_HOUR, SECS_PER_MINUTE};

/// One concrete raffle cycle, `[start, end)`.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct EpochWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl EpochWindow {
    /// Create a window, rejecting `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, RaffleSyncError> {
        invariant_window_ordered(start, end)?;
        Ok(Self { start, end })
    }

    /// Fixed-length cycle beginning at `anchor`: `end = anchor + cycle_length`.
    ///
    /// An end instant past chrono's range is `InvalidConfig`.
    pub fn fixed_cycle(
        anchor: DateTime<Utc>,
        cycle_length: Duration,
    ) -> Result<Self, RaffleSyncError> {
        let end = anchor.checked_add_signed(cycle_length).ok_or_else(|| {
            RaffleSyncError::InvalidConfig(format!(
                "cycle of {}s from {anchor} is out of range",
                cycle_length.num_seconds()
            ))
        })?;
        Self::new(anchor, end)
    }

    /// The fixed-length cycle that contains `now`.
    ///
    /// Cycles repeat every `cycle_length` from `anchor`. When `now` precedes
    /// the anchor the first cycle is returned.
    pub fn containing(
        anchor: DateTime<Utc>,
        cycle_length: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, RaffleSyncError> {
        let first = Self::fixed_cycle(anchor, cycle_length)?;
        let since_anchor = now - anchor;
        if since_anchor < Duration::zero() {
            return Ok(first);
        }

        let cycle_ms = cycle_length.num_milliseconds();
        if cycle_ms <= 0 {
            return Err(RaffleSyncError::InvalidConfig(
                "cycle length must be at least one millisecond".to_string(),
            ));
        }
        let index = since_anchor.num_milliseconds() / cycle_ms;
        let start = Duration::try_milliseconds(index.saturating_mul(cycle_ms))
            .and_then(|offset| anchor.checked_add_signed(offset))
            .ok_or_else(|| {
                let reason = format!("no cycle containing {now} is representable");
                RaffleSyncError::InvalidConfig(reason)
            })?;
        Self::fixed_cycle(start, cycle_length)
    }

    /// Start instant.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// End instant (the draw).
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// `end - start`, always positive.
    pub fn cycle_length(&self) -> Duration {
        self.end - self.start
    }

    /// True when `now` lies inside `[start, end)`.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }
}

/// Remaining time split into calendar-free components.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemainingTime {
    /// Whole days.
    pub days: u64,
    /// Hours, `< 24`.
    pub hours: u64,
    /// Minutes, `< 60`.
    pub minutes: u64,
    /// Seconds, `< 60`.
    pub seconds: u64,
}

impl RemainingTime {
    /// Nothing left.
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Decompose by successive division: 86400, 3600, 60, 1.
    pub fn from_total_seconds(total: u64) -> Self {
        let days = total / SECS_PER_DAY;
        let rest = total % SECS_PER_DAY;
        let hours = rest / SECS_PER_HOUR;
        let rest = rest % SECS_PER_HOUR;
        Self {
            days,
            hours,
            minutes: rest / SECS_PER_MINUTE,
            seconds: rest % SECS_PER_MINUTE,
        }
    }

    /// Reconstruct the total number of seconds.
    pub fn total_seconds(&self) -> u64 {
        self.days * SECS_PER_DAY
            + self.hours * SECS_PER_HOUR
            + self.minutes * SECS_PER_MINUTE
            + self.seconds
    }

    /// All components zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {}h {}m {}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Clock output for one tick.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct EpochSnapshot {
    /// Epoch number being displayed.
    pub epoch_id: u64,
    /// Elapsed share of the cycle, `[0, 100]`.
    pub progress_percent: f64,
    /// Time left until the window end.
    pub remaining: RemainingTime,
}

impl EpochSnapshot {
    /// Snapshot for a closed window.
    pub fn terminal(epoch_id: u64) -> Self {
        Self {
            epoch_id,
            progress_percent: 100.0,
            remaining: RemainingTime::ZERO,
        }
    }

    /// The cycle is over.
    pub fn is_complete(&self) -> bool {
        self.remaining.is_zero() && self.progress_percent >= 100.0
    }

    /// Progress with two decimals, e.g. `"20.00%"`.
    pub fn progress_display(&self) -> String {
        format!("{:.2}%", self.progress_percent)
    }
}

/// One participant row ready for display.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DisplayRow {
    /// Full wallet address.
    pub wallet_address: String,
    /// `first8...last8`, or the full address when shorter than 16 chars.
    pub short_address: String,
    /// Entry instant.
    pub entry_time: DateTime<Utc>,
    /// Entry instant rendered for display.
    pub formatted_time: String,
    /// Primary deposit (ADA).
    pub primary_amount: f64,
    /// Secondary deposit (EPOK).
    pub secondary_amount: f64,
    /// Tickets earned.
    pub tickets: u64,
}

/// Aggregated participant list.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AggregateView {
    /// Sum of tickets over all rows.
    pub total_tickets: u64,
    /// Rows in input order.
    pub rows: Vec<DisplayRow>,
    /// Records dropped as malformed.
    pub skipped_entries: usize,
    /// `total_entries` as reported by the data source, if any.
    pub reported_total: Option<u64>,
}

impl AggregateView {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// No rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Current prize.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PrizeView {
    /// Prize amount, `None` for NFT prizes.
    pub amount: Option<f64>,
    /// Prize name (NFT name for NFT prizes).
    pub name: Option<String>,
    /// On-chain asset id.
    pub asset_id: Option<String>,
    /// Prize kind, e.g. `"NFT"`.
    pub prize_type: Option<String>,
}

/// Most recent completed draw.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WinnerView {
    /// Winning address, `None` when no draw has completed yet.
    pub winner_address: Option<String>,
    /// Name of the prize won.
    pub prize_name: Option<String>,
    /// End of the epoch the draw closed.
    pub epoch_end: Option<DateTime<Utc>>,
}

impl WinnerView {
    /// A winner has been drawn.
    pub fn has_winner(&self) -> bool {
        self.winner_address.is_some()
    }
}

/// Epoch boundaries as reported by the data source.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct EpochBoundsView {
    /// Reported start.
    pub start: DateTime<Utc>,
    /// Reported end.
    pub end: DateTime<Utc>,
    /// Reported remaining seconds at fetch time.
    pub reported_remaining_secs: Option<f64>,
}

impl EpochBoundsView {
    /// Reported bounds equal the configured window.
    pub fn matches(&self, window: &EpochWindow) -> bool {
        self.start == window.start() && self.end == window.end()
    }
}

/// Controller state.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SyncState {
    /// Not started.
    #[default]
    Idle,
    /// Last fetch cycle committed.
    Polling,
    /// Last fetch cycle failed; previous data still displayed.
    Degraded,
}

/// Everything the fetch loop publishes, committed as one value.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RemoteView {
    /// Sequence token of the cycle that produced the data.
    pub sequence: u64,
    /// Current prize.
    pub prize: Option<PrizeView>,
    /// Participant aggregate.
    pub aggregate: AggregateView,
    /// Latest winner (winner feature only).
    pub winner: Option<WinnerView>,
    /// Reported epoch bounds (bounds feature only).
    pub epoch_bounds: Option<EpochBoundsView>,
    /// The most recent cycle failed.
    pub last_fetch_failed: bool,
    /// Message of the most recent failure.
    pub last_error: Option<String>,
    /// Controller state.
    pub state: SyncState,
    /// When the data was last committed.
    pub last_success_at: Option<DateTime<Utc>>,
}

/// Result of one fetch cycle.
#[derive(Clone, Debug, PartialEq)]
pub enum CycleOutcome {
    /// Data committed to the remote view.
    Committed {
        /// Cycle sequence token
        sequence: u64,
    },
    /// Cycle failed; previous data retained, Degraded published.
    Failed {
        /// Cycle sequence token
        sequence: u64,
        /// Cause
        error: RaffleSyncError,
    },
    /// A newer cycle was issued while this one was in flight; result dropped.
    Stale {
        /// Cycle sequence token
        sequence: u64,
    },
    /// Controller was shut down; result dropped.
    Disposed,
}

impl CycleOutcome {
    /// The cycle's data reached the remote view.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Counters kept by the controller.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncStats {
    /// Snapshots published.
    pub clock_ticks: u64,
    /// Fetch cycles issued.
    pub cycles_started: u64,
    /// Cycles whose data was committed.
    pub cycles_committed: u64,
    /// Cycles that failed.
    pub cycles_failed: u64,
    /// Cycles discarded because a newer one was issued.
    pub cycles_stale: u64,
}
