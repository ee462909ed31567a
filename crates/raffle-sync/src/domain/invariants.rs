//! # Domain Invariants
//!
//! Rules that must always hold for windows, snapshots and aggregates.

use chrono::{DateTime, Utc};

use super::errors::RaffleSyncError;
use super::value_objects::{EpochSnapshot, RemainingTime};

/// Seconds per day.
pub const SECS_PER_DAY: u64 = 86_400;

/// Seconds per hour.
pub const SECS_PER_HOUR: u64 = 3_600;

/// Seconds per minute.
pub const SECS_PER_MINUTE: u64 = 60;

/// Length of one raffle cycle in days.
pub const DEFAULT_CYCLE_DAYS: i64 = 5;

/// Clock tick period.
pub const DEFAULT_CLOCK_TICK_MS: u64 = 1_000;

/// Remote refresh period.
pub const DEFAULT_REFRESH_SECS: u64 = 30;

/// Deadline for a whole fetch cycle.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Characters kept on each side of a shortened address.
pub const ADDRESS_EDGE_CHARS: usize = 8;

/// Longest accepted fixed-cycle length: one hundred years.
pub const MAX_CYCLE_SECS: u64 = 100 * 366 * SECS_PER_DAY;

/// Invariant: an epoch window must end strictly after it starts.
pub fn invariant_window_ordered(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), RaffleSyncError> {
    if end <= start {
        return Err(RaffleSyncError::ClockMisconfigured { start, end });
    }
    Ok(())
}

/// Invariant: a fixed cycle is non-empty and short enough to add to any
/// realistic anchor.
pub fn invariant_cycle_length(cycle_length_secs: u64) -> Result<(), RaffleSyncError> {
    if cycle_length_secs == 0 {
        return Err(RaffleSyncError::InvalidConfig(
            "cycle_length_secs must be positive".to_string(),
        ));
    }
    if cycle_length_secs > MAX_CYCLE_SECS {
        return Err(RaffleSyncError::InvalidConfig(format!(
            "cycle_length_secs {cycle_length_secs} exceeds {MAX_CYCLE_SECS}"
        )));
    }
    Ok(())
}

/// Invariant: progress is always within `[0, 100]`.
pub fn invariant_progress_bounds(snapshot: &EpochSnapshot) -> bool {
    (0.0..=100.0).contains(&snapshot.progress_percent)
}

/// Invariant: the decomposed remaining time reconstructs exactly.
pub fn invariant_remaining_reconstructs(remaining: &RemainingTime, total_seconds: u64) -> bool {
    remaining.total_seconds() == total_seconds
        && remaining.hours < 24
        && remaining.minutes < 60
        && remaining.seconds < 60
}

/// Invariant: once the window has closed the snapshot is terminal.
pub fn invariant_terminal_clamp(
    snapshot: &EpochSnapshot,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    if now < end {
        return true;
    }
    snapshot.progress_percent == 100.0 && snapshot.remaining.is_zero()
}
