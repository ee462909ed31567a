//! # Entry Aggregator
//!
//! Turns entry records into display rows and a ticket total.
//!
//! Row order always follows the input. Leaderboard order is opt-in through
//! [`rank_by_tickets`], applied by the caller before aggregating.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use tracing::warn;

use crate::domain::{
    AggregateView, DisplayRow, EntryRecord, ParticipantsPayload, ADDRESS_EDGE_CHARS,
};

/// Display format for entry timestamps.
pub const ENTRY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shorten an address to `first8...last8`.
///
/// Addresses shorter than 16 characters come back unchanged. Works on
/// characters, so multi-byte input never splits a code point.
pub fn shorten_address(address: &str) -> String {
    let len = address.chars().count();
    if len < ADDRESS_EDGE_CHARS * 2 {
        return address.to_string();
    }

    let head: String = address.chars().take(ADDRESS_EDGE_CHARS).collect();
    let tail: String = address.chars().skip(len - ADDRESS_EDGE_CHARS).collect();
    format!("{head}...{tail}")
}

/// Render an entry time in the given offset.
pub fn format_entry_time(entry_time: DateTime<Utc>, offset: FixedOffset) -> String {
    entry_time
        .with_timezone(&offset)
        .format(ENTRY_TIME_FORMAT)
        .to_string()
}

/// Anything that can be placed on the leaderboard.
pub trait Ranked {
    /// Tickets held.
    fn tickets(&self) -> u64;
    /// When the entry was made.
    fn entry_time(&self) -> DateTime<Utc>;
}

impl Ranked for EntryRecord {
    fn tickets(&self) -> u64 {
        self.tickets
    }

    fn entry_time(&self) -> DateTime<Utc> {
        self.entry_time
    }
}

impl Ranked for DisplayRow {
    fn tickets(&self) -> u64 {
        self.tickets
    }

    fn entry_time(&self) -> DateTime<Utc> {
        self.entry_time
    }
}

/// Sort for a leaderboard: most tickets first, earliest entry breaks ties.
pub fn rank_by_tickets<R: Ranked>(entries: &mut [R]) {
    entries.sort_by(|a, b| {
        b.tickets()
            .cmp(&a.tickets())
            .then_with(|| a.entry_time().cmp(&b.entry_time()))
    });
}

/// Aggregate with UTC timestamps.
pub fn aggregate(entries: &[EntryRecord]) -> AggregateView {
    EntryAggregator::default().aggregate(entries)
}

/// Aggregator with a fixed display offset.
#[derive(Clone, Copy, Debug)]
pub struct EntryAggregator {
    offset: FixedOffset,
}

impl Default for EntryAggregator {
    fn default() -> Self {
        Self::utc()
    }
}

impl EntryAggregator {
    /// Aggregator rendering times in `offset`.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Aggregator rendering times in UTC.
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Build an aggregator from an offset in seconds east of UTC.
    ///
    /// Out-of-range offsets fall back to UTC.
    pub fn from_offset_secs(secs: i32) -> Self {
        FixedOffset::east_opt(secs).map(Self::new).unwrap_or_default()
    }

    /// Total tickets and one row per entry, in input order.
    pub fn aggregate(&self, entries: &[EntryRecord]) -> AggregateView {
        let rows: Vec<DisplayRow> = entries.iter().map(|e| self.display_row(e)).collect();
        let total_tickets = entries
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.tickets));

        AggregateView {
            total_tickets,
            rows,
            skipped_entries: 0,
            reported_total: None,
        }
    }

    /// Validate a participants payload, skip malformed records, then aggregate.
    pub fn aggregate_payload(&self, payload: &ParticipantsPayload) -> AggregateView {
        let mut records = Vec::with_capacity(payload.participants.len());
        let mut skipped = 0usize;

        for (index, raw) in payload.participants.iter().enumerate() {
            match raw.validate(index) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed entry");
                    skipped += 1;
                }
            }
        }

        let mut view = self.aggregate(&records);
        view.skipped_entries = skipped;
        view.reported_total = payload.total_entries;

        if let Some(reported) = payload.total_entries {
            if reported != view.total_tickets {
                warn!(
                    reported,
                    computed = view.total_tickets,
                    skipped,
                    "Reported total_entries differs from computed ticket total"
                );
            }
        }

        view
    }

    fn display_row(&self, entry: &EntryRecord) -> DisplayRow {
        DisplayRow {
            wallet_address: entry.wallet_address.clone(),
            short_address: shorten_address(&entry.wallet_address),
            entry_time: entry.entry_time,
            formatted_time: format_entry_time(entry.entry_time, self.offset),
            primary_amount: entry.primary_amount,
            secondary_amount: entry.secondary_amount,
            tickets: entry.tickets,
        }
    }
}
