//! Cross-module scenarios for the raffle sync crate.

pub mod clock_and_aggregation;
pub mod live_sync;
