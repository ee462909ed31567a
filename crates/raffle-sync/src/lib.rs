//! # Raffle Sync
//!
//! Epoch timing and live data sync for the Epok raffle dashboard.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Keep a raffle display current without ever blocking the countdown on
//! the network:
//! - Epoch clock: progress and remaining time of the current draw window
//! - Entry aggregation: ticket totals and display rows from raw entries
//! - Live sync: one fast clock tick plus one slower fetch cycle, with
//!   stale and post-shutdown results discarded
//!
//! ## Guarantees
//!
//! | Guarantee | How |
//! |-----------|-----|
//! | Clock never waits on I/O | Separate task, reads only the time source |
//! | No torn views | `RemoteView` replaced as a whole through a watch channel |
//! | Newest data wins | Monotonic sequence token checked at commit |
//! | Silent after teardown | Disposed flag checked under the channel lock |
//! | Failures are visible | Degraded state, previous data kept |
//!
//! ## Module Structure
//!
//! ```text
//! raffle-sync/
//! ├── domain/          # Entries, payloads, views, errors, invariants
//! ├── algorithms/      # Epoch clock, entry aggregator
//! ├── ports/           # LiveSyncApi (inbound) + RaffleDataSource, TimeSource (outbound)
//! ├── application/     # LiveSyncController driving both triggers
//! ├── adapters/        # HTTP data source, system clock
//! └── config.rs        # SyncConfig, HttpSourceConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{HttpRaffleSource, SystemTimeSource};
pub use algorithms::{
    aggregate, compute_snapshot, format_entry_time, progress_percent, rank_by_tickets,
    remaining_seconds, shorten_address, EntryAggregator, EpochClock, Ranked, ENTRY_TIME_FORMAT,
};
pub use application::LiveSyncController;
pub use config::{EpochSchedule, HttpSourceConfig, SyncConfig, DEFAULT_EPOCH_ID};
pub use domain::{
    AggregateView, CycleOutcome, DisplayRow, EntryRecord, EpochBoundsPayload, EpochBoundsView,
    EpochSnapshot, EpochWindow, ParticipantsPayload, PrizePayload, PrizeView, RaffleSyncError,
    RawEntry, RemainingTime, RemoteView, SyncState, SyncStats, WinnerPayload, WinnerView,
};
pub use ports::{LiveSyncApi, ManualTimeSource, MockRaffleSource, RaffleDataSource, TimeSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
