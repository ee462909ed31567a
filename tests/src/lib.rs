//! # Epok Raffle Sync Test Suite
//!
//! End-to-end scenarios run against the in-memory data source and a manual
//! time source.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── clock_and_aggregation.rs  # Epoch clock + aggregator scenarios
//! │   └── live_sync.rs              # Controller lifecycle, failures, races
//! └── benches/
//!     └── sync_benchmarks.rs        # Snapshot and aggregation throughput
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p raffle-sync-tests
//! cargo test -p raffle-sync-tests integration::live_sync
//!
//! # Benchmarks
//! cargo bench -p raffle-sync-tests
//! ```

pub mod integration;
