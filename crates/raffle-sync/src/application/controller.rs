//! # Live Sync Controller
//!
//! Drives the two independent triggers of the raffle display:
//!
//! - **Clock tick** (default 1 s): recomputes the epoch snapshot from the
//!   time source. Never waits on the network.
//! - **Fetch cycle** (default 30 s, first one immediate): reads prize and
//!   participants concurrently, plus winner and epoch bounds when enabled,
//!   and commits them as one [`RemoteView`]. Any failed read discards the
//!   whole cycle.
//!
//! ## Commit Rules
//!
//! Every fetch cycle takes a sequence token from a monotonic counter. A
//! result is committed only if its token is still the latest issued and the
//! controller has not been shut down. Failed cycles keep the previous data
//! and publish the Degraded state instead.
//!
//! Scheduled cycles never overlap each other: the fetch loop awaits each
//! cycle before the next tick and missed ticks are skipped. Overlap only
//! happens with [`LiveSyncController::refresh_now`], where the newer token
//! wins.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::algorithms::{EntryAggregator, EpochClock};
use crate::config::SyncConfig;
use crate::domain::{
    AggregateView, CycleOutcome, EpochBoundsPayload, EpochBoundsView, EpochSnapshot,
    ParticipantsPayload, PrizePayload, PrizeView, RaffleSyncError, RemoteView, SyncState,
    SyncStats, WinnerPayload, WinnerView,
};
use crate::ports::{LiveSyncApi, RaffleDataSource, TimeSource};

/// Live raffle sync controller.
pub struct LiveSyncController<D: ?Sized, T: ?Sized> {
    core: Arc<SyncCore<D, T>>,
    tasks: Mutex<Option<RunningTasks>>,
}

struct RunningTasks {
    shutdown_tx: watch::Sender<bool>,
    clock: JoinHandle<()>,
    fetch: JoinHandle<()>,
}

/// State shared between the controller and its spawned tasks.
struct SyncCore<D: ?Sized, T: ?Sized> {
    config: SyncConfig,
    clock: EpochClock,
    aggregator: EntryAggregator,
    source: Arc<D>,
    time: Arc<T>,
    snapshot_tx: watch::Sender<EpochSnapshot>,
    view_tx: watch::Sender<RemoteView>,
    latest_seq: AtomicU64,
    disposed: AtomicBool,
    counters: Counters,
}

#[derive(Default)]
struct Counters {
    clock_ticks: AtomicU64,
    cycles_started: AtomicU64,
    cycles_committed: AtomicU64,
    cycles_failed: AtomicU64,
    cycles_stale: AtomicU64,
}

/// Everything one fetch cycle read.
struct FetchedData {
    prize: PrizePayload,
    participants: ParticipantsPayload,
    winner: Option<WinnerPayload>,
    bounds: Option<EpochBoundsPayload>,
}

/// A cycle's data, converted and ready to commit.
struct Update {
    prize: PrizeView,
    aggregate: AggregateView,
    winner: Option<WinnerView>,
    bounds: Option<EpochBoundsView>,
}

impl<D, T> LiveSyncController<D, T>
where
    D: RaffleDataSource + ?Sized + 'static,
    T: TimeSource + ?Sized + 'static,
{
    /// Create a controller. Nothing runs until [`start`](Self::start).
    ///
    /// The epoch window is resolved once, here, against the time source.
    pub fn new(config: SyncConfig, source: Arc<D>, time: Arc<T>) -> Result<Self, RaffleSyncError> {
        config.validate()?;
        let window = config.resolve_window(time.now())?;
        let clock = EpochClock::new(window, config.epoch_id);
        let aggregator = EntryAggregator::from_offset_secs(config.display_utc_offset_secs);

        let (snapshot_tx, _) = watch::channel(clock.snapshot_now(&*time));
        let (view_tx, _) = watch::channel(RemoteView::default());

        info!(
            epoch_id = config.epoch_id,
            window_start = %window.start(),
            window_end = %window.end(),
            source = source.source_id(),
            "Live sync controller created"
        );

        Ok(Self {
            core: Arc::new(SyncCore {
                config,
                clock,
                aggregator,
                source,
                time,
                snapshot_tx,
                view_tx,
                latest_seq: AtomicU64::new(0),
                disposed: AtomicBool::new(false),
                counters: Counters::default(),
            }),
            tasks: Mutex::new(None),
        })
    }

    /// The clock this controller ticks.
    pub fn clock(&self) -> &EpochClock {
        &self.core.clock
    }

    /// Active configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.core.config
    }

    /// Publish a snapshot immediately, then spawn the clock and fetch loops
    /// on the current tokio runtime.
    pub fn start(&self) -> Result<(), RaffleSyncError> {
        if self.core.is_disposed() {
            return Err(RaffleSyncError::ShutDown);
        }
        let mut tasks = self.tasks.lock();
        if tasks.is_some() {
            return Err(RaffleSyncError::AlreadyRunning);
        }
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| RaffleSyncError::NoRuntime(e.to_string()))?;

        self.core.publish_snapshot();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let clock = handle.spawn(clock_loop(Arc::clone(&self.core), shutdown_rx.clone()));
        let fetch = handle.spawn(fetch_loop(Arc::clone(&self.core), shutdown_rx));
        *tasks = Some(RunningTasks {
            shutdown_tx,
            clock,
            fetch,
        });

        info!(
            clock_tick_ms = self.core.config.clock_tick_ms,
            refresh_interval_secs = self.core.config.refresh_interval_secs,
            "Live sync started"
        );
        Ok(())
    }

    /// Stop both loops. Idempotent.
    ///
    /// When this returns no snapshot or view will be published again, even
    /// by a fetch cycle that is still in flight.
    pub fn shutdown(&self) {
        if self.core.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        // Wait out any commit holding a channel lock.
        self.core.snapshot_tx.send_if_modified(|_| false);
        self.core.view_tx.send_if_modified(|_| false);

        if let Some(tasks) = self.tasks.lock().take() {
            let _ = tasks.shutdown_tx.send(true);
            tasks.clock.abort();
            tasks.fetch.abort();
        }
        info!("Live sync stopped");
    }

    /// Both loops are active.
    pub fn is_running(&self) -> bool {
        !self.core.is_disposed() && self.tasks.lock().is_some()
    }

    /// Run one fetch cycle now, outside the schedule.
    pub async fn refresh_now(&self) -> CycleOutcome {
        self.core.run_cycle().await
    }

    /// Latest clock snapshot.
    pub fn snapshot(&self) -> EpochSnapshot {
        *self.core.snapshot_tx.borrow()
    }

    /// Latest remote view.
    pub fn remote_view(&self) -> RemoteView {
        self.core.view_tx.borrow().clone()
    }

    /// Receiver notified on every clock tick.
    pub fn subscribe_snapshots(&self) -> watch::Receiver<EpochSnapshot> {
        self.core.snapshot_tx.subscribe()
    }

    /// Receiver notified on every committed fetch cycle.
    pub fn subscribe_remote(&self) -> watch::Receiver<RemoteView> {
        self.core.view_tx.subscribe()
    }

    /// Counters since construction.
    pub fn stats(&self) -> SyncStats {
        self.core.counters.snapshot()
    }
}

impl<D: ?Sized, T: ?Sized> Drop for LiveSyncController<D, T> {
    fn drop(&mut self) {
        self.core.disposed.store(true, Ordering::SeqCst);
        if let Some(tasks) = self.tasks.get_mut().take() {
            tasks.clock.abort();
            tasks.fetch.abort();
        }
    }
}

#[async_trait]
impl<D, T> LiveSyncApi for LiveSyncController<D, T>
where
    D: RaffleDataSource + ?Sized + 'static,
    T: TimeSource + ?Sized + 'static,
{
    fn start(&self) -> Result<(), RaffleSyncError> {
        LiveSyncController::start(self)
    }

    fn shutdown(&self) {
        LiveSyncController::shutdown(self)
    }

    fn is_running(&self) -> bool {
        LiveSyncController::is_running(self)
    }

    async fn refresh_now(&self) -> CycleOutcome {
        LiveSyncController::refresh_now(self).await
    }

    fn snapshot(&self) -> EpochSnapshot {
        LiveSyncController::snapshot(self)
    }

    fn remote_view(&self) -> RemoteView {
        LiveSyncController::remote_view(self)
    }

    fn subscribe_snapshots(&self) -> watch::Receiver<EpochSnapshot> {
        LiveSyncController::subscribe_snapshots(self)
    }

    fn subscribe_remote(&self) -> watch::Receiver<RemoteView> {
        LiveSyncController::subscribe_remote(self)
    }

    fn stats(&self) -> SyncStats {
        LiveSyncController::stats(self)
    }
}

// =============================================================================
// Loops
// =============================================================================

async fn clock_loop<D, T>(core: Arc<SyncCore<D, T>>, mut shutdown: watch::Receiver<bool>)
where
    D: RaffleDataSource + ?Sized,
    T: TimeSource + ?Sized,
{
    let mut ticker = interval(core.config.clock_tick());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // start() already published the first snapshot
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => core.publish_snapshot(),
        }
    }
    debug!("Clock loop exited");
}

async fn fetch_loop<D, T>(core: Arc<SyncCore<D, T>>, mut shutdown: watch::Receiver<bool>)
where
    D: RaffleDataSource + ?Sized,
    T: TimeSource + ?Sized,
{
    let mut ticker = interval(core.config.refresh_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = core.run_cycle() => {}
        }
    }
    debug!("Fetch loop exited");
}

// =============================================================================
// Core
// =============================================================================

impl<D, T> SyncCore<D, T>
where
    D: RaffleDataSource + ?Sized,
    T: TimeSource + ?Sized,
{
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn publish_snapshot(&self) {
        let snapshot = self.clock.snapshot_now(&*self.time);
        let published = self.snapshot_tx.send_if_modified(|current| {
            if self.is_disposed() {
                return false;
            }
            *current = snapshot;
            true
        });
        if published {
            self.counters.clock_ticks.fetch_add(1, Ordering::Relaxed);
            trace!(
                progress = snapshot.progress_percent,
                remaining = %snapshot.remaining,
                "Clock tick"
            );
        }
    }

    async fn run_cycle(&self) -> CycleOutcome {
        if self.is_disposed() {
            return CycleOutcome::Disposed;
        }
        let sequence = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.cycles_started.fetch_add(1, Ordering::Relaxed);
        debug!(sequence, source = self.source.source_id(), "Fetch cycle started");

        let deadline = self.config.fetch_timeout();
        let result = match tokio::time::timeout(deadline, self.fetch_all()).await {
            Ok(result) => result,
            Err(_) => Err(RaffleSyncError::FetchTimedOut {
                after_ms: self.config.fetch_timeout_ms,
            }),
        };

        let outcome = match result.and_then(|fetched| self.prepare(fetched)) {
            Ok(update) => self.commit(sequence, update),
            Err(error) => self.record_failure(sequence, error),
        };

        match &outcome {
            CycleOutcome::Committed { .. } => {
                self.counters.cycles_committed.fetch_add(1, Ordering::Relaxed);
            }
            CycleOutcome::Failed { .. } => {
                self.counters.cycles_failed.fetch_add(1, Ordering::Relaxed);
            }
            CycleOutcome::Stale { .. } => {
                self.counters.cycles_stale.fetch_add(1, Ordering::Relaxed);
                debug!(
                    sequence,
                    latest = self.latest_seq.load(Ordering::SeqCst),
                    "Discarding stale fetch result"
                );
            }
            CycleOutcome::Disposed => {
                debug!(sequence, "Fetch result dropped after shutdown");
            }
        }
        outcome
    }

    async fn fetch_all(&self) -> Result<FetchedData, RaffleSyncError> {
        let winner = async {
            if self.config.winner_enabled {
                self.source.fetch_latest_winner().await.map(Some)
            } else {
                Ok(None)
            }
        };
        let bounds = async {
            if self.config.epoch_bounds_enabled {
                self.source.fetch_epoch_bounds().await.map(Some)
            } else {
                Ok(None)
            }
        };

        let (prize, participants, winner, bounds) = tokio::try_join!(
            self.source.fetch_prize(),
            self.source.fetch_participants(),
            winner,
            bounds,
        )?;

        Ok(FetchedData {
            prize,
            participants,
            winner,
            bounds,
        })
    }

    fn prepare(&self, fetched: FetchedData) -> Result<Update, RaffleSyncError> {
        let bounds = fetched
            .bounds
            .map(EpochBoundsPayload::into_view)
            .transpose()?;
        if let Some(bounds) = bounds {
            self.check_bounds(bounds);
        }
        Ok(Update {
            prize: fetched.prize.into(),
            aggregate: self.aggregator.aggregate_payload(&fetched.participants),
            winner: fetched.winner.map(WinnerView::from),
            bounds,
        })
    }

    fn commit(&self, sequence: u64, update: Update) -> CycleOutcome {
        let now = self.time.now();
        let rows = update.aggregate.len();
        let total_tickets = update.aggregate.total_tickets;

        let mut outcome = CycleOutcome::Stale { sequence };
        self.view_tx.send_if_modified(|view| {
            if self.is_disposed() {
                outcome = CycleOutcome::Disposed;
                return false;
            }
            if self.latest_seq.load(Ordering::SeqCst) != sequence {
                return false;
            }
            *view = RemoteView {
                sequence,
                prize: Some(update.prize),
                aggregate: update.aggregate,
                winner: update.winner,
                epoch_bounds: update.bounds,
                last_fetch_failed: false,
                last_error: None,
                state: SyncState::Polling,
                last_success_at: Some(now),
            };
            outcome = CycleOutcome::Committed { sequence };
            true
        });

        if outcome.is_committed() {
            debug!(sequence, rows, total_tickets, "Fetch cycle committed");
        }
        outcome
    }

    fn record_failure(&self, sequence: u64, error: RaffleSyncError) -> CycleOutcome {
        warn!(sequence, error = %error, "Fetch cycle failed; keeping previous data");

        let message = error.to_string();
        let mut outcome = CycleOutcome::Stale { sequence };
        self.view_tx.send_if_modified(|view| {
            if self.is_disposed() {
                outcome = CycleOutcome::Disposed;
                return false;
            }
            if self.latest_seq.load(Ordering::SeqCst) != sequence {
                return false;
            }
            *view = RemoteView {
                last_fetch_failed: true,
                last_error: Some(message),
                state: SyncState::Degraded,
                ..view.clone()
            };
            outcome = CycleOutcome::Failed {
                sequence,
                error: error.clone(),
            };
            true
        });
        outcome
    }

    /// The configured window stays authoritative. A differing backend
    /// window is only reported, once per distinct value.
    fn check_bounds(&self, bounds: EpochBoundsView) {
        let window = self.clock.window();
        if bounds.matches(window) || self.view_tx.borrow().epoch_bounds == Some(bounds) {
            return;
        }
        warn!(
            reported_start = %bounds.start,
            reported_end = %bounds.end,
            configured_start = %window.start(),
            configured_end = %window.end(),
            "Backend epoch bounds differ from configured window"
        );
    }
}

impl Counters {
    fn snapshot(&self) -> SyncStats {
        SyncStats {
            clock_ticks: self.clock_ticks.load(Ordering::Relaxed),
            cycles_started: self.cycles_started.load(Ordering::Relaxed),
            cycles_committed: self.cycles_committed.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            cycles_stale: self.cycles_stale.load(Ordering::Relaxed),
        }
    }
}
