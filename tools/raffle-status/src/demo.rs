//! Demo data for running without a backend.

use chrono::{DateTime, Duration, Utc};
use raffle_sync::{
    EntryRecord, EpochBoundsPayload, EpochWindow, MockRaffleSource, PrizePayload, WinnerPayload,
};

const DEMO_WALLETS: [&str; 5] = [
    "addr1qx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3n0d3vllmyqwsx5wktcd8cc3sq835lu7drv2xwl2wywfgse35a3x",
    "addr1q9f4n7kz3l5m0w8c2j6h7d9s4a1e3r5t7y9u2i4o6p8q0w2e4r6t8y0u2i4o6p",
    "addr1qy8ac7qqy0vtulyl7wntmsxc6wex80gvcyjy33qffrhm7sh927ysx5sftuw0dlft05dz3c7revpf7jx0xnlcjz3g69mq4afdhv",
    "addr1v8z5l2x7c3k9m4n6b1q0w8e7r5t3y2u4i6o9p1a3s5d7f9g2h4j6k8",
    "addr1qxck9xhj3d4s7t2m5n8b1v6c9x3z7l2k5j8h1g4f7d0s3a6q9w2e5r8t",
];

/// Entries spread over the first part of the window.
pub fn demo_records(window: &EpochWindow) -> Vec<EntryRecord> {
    DEMO_WALLETS
        .iter()
        .enumerate()
        .map(|(i, wallet)| {
            let i = i as i64;
            let tickets = [4u64, 12, 1, 7, 20][i as usize];
            EntryRecord::new(
                *wallet,
                window.start() + Duration::hours(3 + i * 11) + Duration::minutes(i * 7),
                tickets as f64 * 5.0,
                if i % 2 == 0 { 0.0 } else { 2_500.0 * i as f64 },
                tickets,
            )
        })
        .collect()
}

/// Mock source serving demo data for `window`.
pub fn demo_source(window: &EpochWindow, now: DateTime<Utc>) -> MockRaffleSource {
    let source = MockRaffleSource::new(0.0, &demo_records(window));
    source.set_prize(PrizePayload {
        amount: None,
        name: Some("Epok Genesis #042".to_string()),
        asset_id: Some("asset1epokgenesis042".to_string()),
        prize_type: Some("NFT".to_string()),
    });
    source.set_winner(WinnerPayload {
        winner_address: Some(DEMO_WALLETS[1].to_string()),
        prize_nft_name: Some("Epok Genesis #041".to_string()),
        epoch_end: Some(window.start().to_rfc3339()),
    });
    source.set_bounds(EpochBoundsPayload {
        epoch_start: window.start().to_rfc3339(),
        epoch_end: window.end().to_rfc3339(),
        time_remaining: Some((window.end() - now).num_seconds().max(0) as f64),
    });
    source
}
