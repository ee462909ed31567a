//! Plain-text rendering of snapshots and remote views.

use raffle_sync::{
    rank_by_tickets, DisplayRow, EpochSnapshot, PrizeView, RemoteView, SyncState,
};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Rendering options.
#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    /// Maximum participant rows.
    pub top: usize,
    /// Sort rows by tickets.
    pub leaderboard: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            top: 10,
            leaderboard: false,
        }
    }
}

/// Header printed once at startup.
pub fn header(epoch_id: u64, wallet: Option<&str>, source: &str) -> Vec<String> {
    let mut lines = vec![format!("Epok raffle, epoch {epoch_id} ({source})")];
    if let Some(wallet) = wallet {
        lines.push(format!("Send ADA to enter: {wallet}"));
    }
    lines
}

/// One-line countdown.
pub fn clock_line(snapshot: &EpochSnapshot) -> String {
    if snapshot.is_complete() {
        return format!("Epoch {} | 100.00% | draw closed", snapshot.epoch_id);
    }
    format!(
        "Epoch {} | {} | {} remaining",
        snapshot.epoch_id,
        snapshot.progress_display(),
        snapshot.remaining
    )
}

/// Prize summary. NFT prizes have no amount and show their name only.
pub fn prize_line(prize: &PrizeView) -> String {
    let mut parts = Vec::new();
    if let Some(amount) = prize.amount {
        parts.push(format!("{amount:.2}"));
    }
    if let Some(name) = &prize.name {
        parts.push(name.clone());
    }
    if let Some(kind) = &prize.prize_type {
        parts.push(format!("({kind})"));
    }
    if parts.is_empty() {
        return "Prize: unknown".to_string();
    }
    format!("Prize: {}", parts.join(" "))
}

/// Multi-line block for a remote view.
pub fn remote_block(view: &RemoteView, options: RenderOptions) -> Vec<String> {
    let mut lines = vec![sync_line(view)];

    if let Some(prize) = &view.prize {
        lines.push(prize_line(prize));
    }

    let aggregate = &view.aggregate;
    let mut summary = format!(
        "Participants: {} | Tickets: {}",
        aggregate.len(),
        aggregate.total_tickets
    );
    if let Some(reported) = aggregate.reported_total {
        if reported != aggregate.total_tickets {
            summary.push_str(&format!(" (backend reports {reported})"));
        }
    }
    if aggregate.skipped_entries > 0 {
        summary.push_str(&format!(" ({} malformed skipped)", aggregate.skipped_entries));
    }
    lines.push(summary);

    let mut rows: Vec<DisplayRow> = aggregate.rows.clone();
    if options.leaderboard {
        rank_by_tickets(&mut rows);
    }
    lines.extend(rows.iter().take(options.top).map(row_line));
    if rows.len() > options.top {
        lines.push(format!("  ... {} more", rows.len() - options.top));
    }

    if let Some(winner) = &view.winner {
        lines.push(match (&winner.winner_address, &winner.prize_name) {
            (Some(address), Some(prize)) => format!("Latest winner: {address} won {prize}"),
            (Some(address), None) => format!("Latest winner: {address}"),
            (None, _) => "Latest winner: none yet".to_string(),
        });
    }

    if let Some(bounds) = &view.epoch_bounds {
        lines.push(format!(
            "Backend epoch: {} to {}",
            bounds.start.format(TIME_FORMAT),
            bounds.end.format(TIME_FORMAT)
        ));
    }

    lines
}

fn sync_line(view: &RemoteView) -> String {
    let last = view
        .last_success_at
        .map(|t| t.format(TIME_FORMAT).to_string());
    match (view.state, last) {
        (SyncState::Idle, _) => "Sync: waiting for first fetch".to_string(),
        (SyncState::Polling, Some(at)) => format!("Sync: ok, updated {at}"),
        (SyncState::Polling, None) => "Sync: ok".to_string(),
        (SyncState::Degraded, last) => {
            let reason = view.last_error.as_deref().unwrap_or("unknown error");
            match last {
                Some(at) => format!("Sync: FAILED ({reason}), showing data from {at}"),
                None => format!("Sync: FAILED ({reason}), no data yet"),
            }
        }
    }
}

fn row_line(row: &DisplayRow) -> String {
    format!(
        "  {:<19} {}  {:>10.2} ADA {:>12.2} EPOK {:>5} tickets",
        row.short_address, row.formatted_time, row.primary_amount, row.secondary_amount, row.tickets
    )
}
