//! # Outbound Ports
//!
//! Traits for external dependencies: the raffle data source and the wall
//! clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::domain::{
    EntryRecord, EpochBoundsPayload, ParticipantsPayload, PrizePayload, RaffleSyncError,
    WinnerPayload,
};

/// Raffle data source - outbound port.
///
/// One fallible call per endpoint; transport is up to the adapter.
#[async_trait]
pub trait RaffleDataSource: Send + Sync {
    /// Current prize.
    async fn fetch_prize(&self) -> Result<PrizePayload, RaffleSyncError>;

    /// Participants of the current epoch.
    async fn fetch_participants(&self) -> Result<ParticipantsPayload, RaffleSyncError>;

    /// Latest completed draw.
    async fn fetch_latest_winner(&self) -> Result<WinnerPayload, RaffleSyncError>;

    /// Epoch boundaries as known to the backend.
    async fn fetch_epoch_bounds(&self) -> Result<EpochBoundsPayload, RaffleSyncError>;

    /// Identifier for logging.
    fn source_id(&self) -> &str;
}

/// Wall clock - outbound port.
pub trait TimeSource: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// In-memory data source with scriptable failures and delays.
pub struct MockRaffleSource {
    id: String,
    prize: Mutex<Result<PrizePayload, String>>,
    participants: Mutex<Result<ParticipantsPayload, String>>,
    winner: Mutex<Result<WinnerPayload, String>>,
    bounds: Mutex<Result<EpochBoundsPayload, String>>,
    participant_delays: Mutex<VecDeque<Duration>>,
    prize_calls: AtomicUsize,
    participant_calls: AtomicUsize,
    winner_calls: AtomicUsize,
    bounds_calls: AtomicUsize,
}

impl Default for MockRaffleSource {
    fn default() -> Self {
        Self {
            id: "mock-raffle-source".to_string(),
            prize: Mutex::new(Ok(PrizePayload::amount(0.0))),
            participants: Mutex::new(Ok(ParticipantsPayload::default())),
            winner: Mutex::new(Ok(WinnerPayload::default())),
            bounds: Mutex::new(Err("epoch bounds not configured".to_string())),
            participant_delays: Mutex::new(VecDeque::new()),
            prize_calls: AtomicUsize::new(0),
            participant_calls: AtomicUsize::new(0),
            winner_calls: AtomicUsize::new(0),
            bounds_calls: AtomicUsize::new(0),
        }
    }
}

impl MockRaffleSource {
    /// Source serving a prize and a list of valid entries.
    pub fn new(prize_amount: f64, records: &[EntryRecord]) -> Self {
        let source = Self::default();
        source.set_prize(PrizePayload::amount(prize_amount));
        source.set_records(records);
        source
    }

    /// Serve this prize.
    pub fn set_prize(&self, prize: PrizePayload) {
        *self.prize.lock() = Ok(prize);
    }

    /// Serve these entries.
    pub fn set_records(&self, records: &[EntryRecord]) {
        *self.participants.lock() = Ok(ParticipantsPayload::from_records(records));
    }

    /// Serve this raw participants payload.
    pub fn set_participants(&self, payload: ParticipantsPayload) {
        *self.participants.lock() = Ok(payload);
    }

    /// Serve this winner.
    pub fn set_winner(&self, winner: WinnerPayload) {
        *self.winner.lock() = Ok(winner);
    }

    /// Serve these epoch bounds.
    pub fn set_bounds(&self, bounds: EpochBoundsPayload) {
        *self.bounds.lock() = Ok(bounds);
    }

    /// Make the prize endpoint fail.
    pub fn fail_prize(&self, reason: &str) {
        *self.prize.lock() = Err(reason.to_string());
    }

    /// Make the participants endpoint fail.
    pub fn fail_participants(&self, reason: &str) {
        *self.participants.lock() = Err(reason.to_string());
    }

    /// Make the winner endpoint fail.
    pub fn fail_winner(&self, reason: &str) {
        *self.winner.lock() = Err(reason.to_string());
    }

    /// Delay the next participants call. Delays queue up, one per call.
    ///
    /// The response is captured when the call starts, so a delayed call
    /// returns the data that was current when it was issued.
    pub fn push_participants_delay(&self, delay: Duration) {
        self.participant_delays.lock().push_back(delay);
    }

    /// Number of prize calls so far.
    pub fn prize_calls(&self) -> usize {
        self.prize_calls.load(Ordering::SeqCst)
    }

    /// Number of participants calls so far.
    pub fn participant_calls(&self) -> usize {
        self.participant_calls.load(Ordering::SeqCst)
    }

    /// Number of winner calls so far.
    pub fn winner_calls(&self) -> usize {
        self.winner_calls.load(Ordering::SeqCst)
    }

    /// Number of epoch bounds calls so far.
    pub fn bounds_calls(&self) -> usize {
        self.bounds_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RaffleDataSource for MockRaffleSource {
    async fn fetch_prize(&self) -> Result<PrizePayload, RaffleSyncError> {
        self.prize_calls.fetch_add(1, Ordering::SeqCst);
        self.prize
            .lock()
            .clone()
            .map_err(|e| RaffleSyncError::fetch_failed("current-prize", e))
    }

    async fn fetch_participants(&self) -> Result<ParticipantsPayload, RaffleSyncError> {
        self.participant_calls.fetch_add(1, Ordering::SeqCst);
        let response = self.participants.lock().clone();
        let delay = self.participant_delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response.map_err(|e| RaffleSyncError::fetch_failed("participants", e))
    }

    async fn fetch_latest_winner(&self) -> Result<WinnerPayload, RaffleSyncError> {
        self.winner_calls.fetch_add(1, Ordering::SeqCst);
        self.winner
            .lock()
            .clone()
            .map_err(|e| RaffleSyncError::fetch_failed("latest-winner", e))
    }

    async fn fetch_epoch_bounds(&self) -> Result<EpochBoundsPayload, RaffleSyncError> {
        self.bounds_calls.fetch_add(1, Ordering::SeqCst);
        self.bounds
            .lock()
            .clone()
            .map_err(|e| RaffleSyncError::fetch_failed("current-epoch", e))
    }

    fn source_id(&self) -> &str {
        &self.id
    }
}

/// Time source that only moves when told to.
pub struct ManualTimeSource {
    now: Mutex<DateTime<Utc>>,
}

impl ManualTimeSource {
    /// Start at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Jump to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
