//! # Inbound Ports
//!
//! API trait defining what the live-sync controller offers to a
//! presentation layer.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::{CycleOutcome, EpochSnapshot, RaffleSyncError, RemoteView, SyncState, SyncStats};

/// Live raffle sync API - inbound port.
///
/// Views are published as whole values. Subscribers never observe a
/// partially updated view.
#[async_trait]
pub trait LiveSyncApi: Send + Sync {
    /// Begin ticking and polling. Requires a running tokio runtime.
    fn start(&self) -> Result<(), RaffleSyncError>;

    /// Stop both triggers. No value is published afterwards.
    fn shutdown(&self);

    /// Both triggers are active.
    fn is_running(&self) -> bool;

    /// Run one fetch cycle now, outside the schedule.
    async fn refresh_now(&self) -> CycleOutcome;

    /// Latest clock snapshot.
    fn snapshot(&self) -> EpochSnapshot;

    /// Latest remote view.
    fn remote_view(&self) -> RemoteView;

    /// Receiver notified on every clock tick.
    fn subscribe_snapshots(&self) -> watch::Receiver<EpochSnapshot>;

    /// Receiver notified on every committed fetch cycle.
    fn subscribe_remote(&self) -> watch::Receiver<RemoteView>;

    /// The most recent fetch cycle failed.
    fn last_fetch_failed(&self) -> bool {
        self.remote_view().last_fetch_failed
    }

    /// Current sync state.
    fn state(&self) -> SyncState {
        self.remote_view().state
    }

    /// Counters since construction.
    fn stats(&self) -> SyncStats;
}
