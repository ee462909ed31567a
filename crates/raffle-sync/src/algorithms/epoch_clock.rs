//! # Epoch Clock
//!
//! Progress and remaining time of an epoch window at a query instant.
//!
//! ## Rules
//!
//! | Query instant        | Progress                       | Remaining               |
//! |----------------------|--------------------------------|-------------------------|
//! | `now >= end`         | 100                            | `0d 0h 0m 0s`           |
//! | `start <= now < end` | `elapsed / cycle * 100`        | `floor(end - now)`      |
//! | `now < start`        | 0                              | `floor(end - now)`      |
//!
//! Remaining time before the start can exceed the cycle length: the window
//! is one concrete cycle, not a repeating offset.

use chrono::{DateTime, Utc};

use crate::domain::{EpochSnapshot, EpochWindow, RemainingTime};
use crate::ports::TimeSource;

/// Compute the snapshot for `now`.
///
/// Pure and infallible; the window invariant (`start < end`) was checked
/// when the window was built.
pub fn compute_snapshot(window: &EpochWindow, epoch_id: u64, now: DateTime<Utc>) -> EpochSnapshot {
    if now >= window.end() {
        return EpochSnapshot::terminal(epoch_id);
    }

    EpochSnapshot {
        epoch_id,
        progress_percent: progress_percent(window, now),
        remaining: RemainingTime::from_total_seconds(remaining_seconds(window, now)),
    }
}

/// Elapsed share of the window in percent, clamped to `[0, 100]`.
pub fn progress_percent(window: &EpochWindow, now: DateTime<Utc>) -> f64 {
    if now <= window.start() {
        return 0.0;
    }
    if now >= window.end() {
        return 100.0;
    }

    let elapsed = secs_f64(now - window.start());
    let cycle = secs_f64(window.cycle_length());
    (elapsed * 100.0 / cycle).clamp(0.0, 100.0)
}

/// Whole seconds until the window end, floored, never negative.
pub fn remaining_seconds(window: &EpochWindow, now: DateTime<Utc>) -> u64 {
    // num_seconds truncates toward zero, which is floor for positive spans
    (window.end() - now).num_seconds().max(0) as u64
}

fn secs_f64(span: chrono::Duration) -> f64 {
    span.to_std().map(|d| d.as_secs_f64()).unwrap_or(0.0)
}

/// An epoch window bound to its epoch number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpochClock {
    window: EpochWindow,
    epoch_id: u64,
}

impl EpochClock {
    /// Create a clock for one epoch.
    pub fn new(window: EpochWindow, epoch_id: u64) -> Self {
        Self { window, epoch_id }
    }

    /// The configured window.
    pub fn window(&self) -> &EpochWindow {
        &self.window
    }

    /// The configured epoch number.
    pub fn epoch_id(&self) -> u64 {
        self.epoch_id
    }

    /// Snapshot at an explicit instant.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> EpochSnapshot {
        compute_snapshot(&self.window, self.epoch_id, now)
    }

    /// Snapshot at the time source's current instant.
    pub fn snapshot_now<S: TimeSource + ?Sized>(&self, time: &S) -> EpochSnapshot {
        self.snapshot_at(time.now())
    }
}
