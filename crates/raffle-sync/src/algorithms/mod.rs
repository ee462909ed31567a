//! # Algorithms Module
//!
//! Epoch clock arithmetic and entry aggregation. Neither does I/O.

pub mod aggregator;
pub mod epoch_clock;

pub use aggregator::{
    aggregate, format_entry_time, rank_by_tickets, shorten_address, EntryAggregator, Ranked,
    ENTRY_TIME_FORMAT,
};
pub use epoch_clock::{compute_snapshot, progress_percent, remaining_seconds, EpochClock};
