//! # Domain Entities
//!
//! Entry records and the payloads delivered by the raffle data source.
//!
//! Entry fields on the wire are all `Option`: a single bad record surfaces
//! as `MalformedEntry` and is skipped, the rest of the participants response
//! still aggregates.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::RaffleSyncError;
use super::value_objects::{EpochBoundsView, PrizeView, WinnerView};

/// A validated raffle entry. Read-only input owned by the data source.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EntryRecord {
    /// Depositing wallet (non-empty).
    pub wallet_address: String,
    /// When the deposit was recorded.
    pub entry_time: DateTime<Utc>,
    /// Primary deposit amount (ADA), `>= 0`.
    pub primary_amount: f64,
    /// Secondary deposit amount (EPOK), `>= 0`.
    pub secondary_amount: f64,
    /// Tickets earned by the entry.
    pub tickets: u64,
}

impl EntryRecord {
    /// Create an entry record.
    pub fn new(
        wallet_address: impl Into<String>,
        entry_time: DateTime<Utc>,
        primary_amount: f64,
        secondary_amount: f64,
        tickets: u64,
    ) -> Self {
        Self {
            wallet_address: wallet_address.into(),
            entry_time,
            primary_amount,
            secondary_amount,
            tickets,
        }
    }
}

/// An entry as it arrives on the wire.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RawEntry {
    /// Depositing wallet.
    pub wallet_address: Option<String>,
    /// ISO-8601 timestamp, with or without offset.
    pub entry_time: Option<String>,
    /// Primary deposit amount.
    #[serde(rename = "ada_amount", alias = "primary_amount")]
    pub primary_amount: Option<f64>,
    /// Secondary deposit amount.
    #[serde(rename = "epok_amount", alias = "secondary_amount")]
    pub secondary_amount: Option<f64>,
    /// Tickets; signed so negative values can be reported instead of rejected by the decoder.
    pub tickets: Option<i64>,
}

impl RawEntry {
    /// Wire form of a valid record.
    pub fn from_record(record: &EntryRecord) -> Self {
        Self {
            wallet_address: Some(record.wallet_address.clone()),
            entry_time: Some(record.entry_time.to_rfc3339()),
            primary_amount: Some(record.primary_amount),
            secondary_amount: Some(record.secondary_amount),
            tickets: i64::try_from(record.tickets).ok(),
        }
    }

    /// Check required fields and ranges.
    pub fn validate(&self, index: usize) -> Result<EntryRecord, RaffleSyncError> {
        let wallet_address = match self.wallet_address.as_deref().map(str::trim) {
            Some(addr) if !addr.is_empty() => addr.to_string(),
            Some(_) => return Err(malformed(index, "empty wallet_address")),
            None => return Err(malformed(index, "missing wallet_address")),
        };

        let raw_time = self
            .entry_time
            .as_deref()
            .ok_or_else(|| malformed(index, "missing entry_time"))?;
        let entry_time = parse_instant(raw_time)
            .ok_or_else(|| malformed(index, format!("unparseable entry_time {raw_time:?}")))?;

        let primary_amount =
            non_negative(self.primary_amount, "ada_amount").map_err(|r| malformed(index, r))?;
        let secondary_amount =
            non_negative(self.secondary_amount, "epok_amount").map_err(|r| malformed(index, r))?;

        let tickets = match self.tickets {
            Some(t) if t >= 0 => t as u64,
            Some(t) => return Err(malformed(index, format!("negative tickets {t}"))),
            None => return Err(malformed(index, "missing tickets")),
        };

        Ok(EntryRecord {
            wallet_address,
            entry_time,
            primary_amount,
            secondary_amount,
            tickets,
        })
    }
}

fn malformed(index: usize, reason: impl Into<String>) -> RaffleSyncError {
    RaffleSyncError::MalformedEntry {
        index,
        reason: reason.into(),
    }
}

fn non_negative(value: Option<f64>, field: &str) -> Result<f64, String> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(format!("invalid {field} {v}")),
        None => Err(format!("missing {field}")),
    }
}

/// Parse an ISO-8601 instant.
///
/// Accepts RFC 3339 with an offset, and naive timestamps (no offset) which
/// are taken as UTC, since the backend serialises naive UTC datetimes.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// `/api/current-prize` response.
///
/// NFT prizes carry only `prize_type`, `name` and `asset_id`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PrizePayload {
    /// Prize amount, absent for NFT prizes.
    #[serde(default)]
    pub amount: Option<f64>,
    /// Prize name.
    #[serde(default)]
    pub name: Option<String>,
    /// Asset id.
    #[serde(default)]
    pub asset_id: Option<String>,
    /// Prize kind.
    #[serde(default)]
    pub prize_type: Option<String>,
}

impl PrizePayload {
    /// Plain amount-only prize.
    pub fn amount(amount: f64) -> Self {
        Self {
            amount: Some(amount),
            name: None,
            asset_id: None,
            prize_type: None,
        }
    }
}

impl From<PrizePayload> for PrizeView {
    fn from(payload: PrizePayload) -> Self {
        Self {
            amount: payload.amount,
            name: payload.name,
            asset_id: payload.asset_id,
            prize_type: payload.prize_type,
        }
    }
}

/// `/api/participants` response.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ParticipantsPayload {
    /// Entries for the current epoch.
    #[serde(default)]
    pub participants: Vec<RawEntry>,
    /// Total tickets as computed by the backend.
    #[serde(default)]
    pub total_entries: Option<u64>,
}

impl ParticipantsPayload {
    /// Payload built from valid records.
    pub fn from_records(records: &[EntryRecord]) -> Self {
        Self {
            participants: records.iter().map(RawEntry::from_record).collect(),
            total_entries: Some(records.iter().map(|r| r.tickets).sum()),
        }
    }
}

/// `/api/latest-winner` response.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WinnerPayload {
    /// Winning address; `null` before the first draw.
    #[serde(default)]
    pub winner_address: Option<String>,
    /// Prize won.
    #[serde(default)]
    pub prize_nft_name: Option<String>,
    /// End of the epoch that was drawn.
    #[serde(default)]
    pub epoch_end: Option<String>,
}

impl From<WinnerPayload> for WinnerView {
    fn from(payload: WinnerPayload) -> Self {
        Self {
            winner_address: payload.winner_address.filter(|a| !a.is_empty()),
            prize_name: payload.prize_nft_name,
            epoch_end: payload.epoch_end.as_deref().and_then(parse_instant),
        }
    }
}

/// `/api/current-epoch` response.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EpochBoundsPayload {
    /// Epoch start.
    pub epoch_start: String,
    /// Epoch end.
    pub epoch_end: String,
    /// Seconds remaining at response time.
    #[serde(default)]
    pub time_remaining: Option<f64>,
}

impl EpochBoundsPayload {
    /// Parse into a view.
    pub fn into_view(self) -> Result<EpochBoundsView, RaffleSyncError> {
        let bad = |field: &str, raw: &str| {
            RaffleSyncError::fetch_failed("current-epoch", format!("bad {field} {raw:?}"))
        };
        let start = parse_instant(&self.epoch_start)
            .ok_or_else(|| bad("epoch_start", &self.epoch_start))?;
        let end = parse_instant(&self.epoch_end).ok_or_else(|| bad("epoch_end", &self.epoch_end))?;
        Ok(EpochBoundsView {
            start,
            end,
            reported_remaining_secs: self.time_remaining,
        })
    }
}
