//! Raffle-Status: live status of the Epok raffle.
//!
//! Prints the epoch countdown on every clock tick and a prize and
//! participants block whenever a fetch cycle commits.
//!
//! ```text
//! Epok raffle, epoch 535 (http://localhost:8000)
//! Send ADA to enter: addr1...
//! Sync: ok, updated 2025-01-21 08:00:00 UTC
//! Prize: Epok Genesis #042 (NFT)
//! Participants: 2 | Tickets: 14
//!   addr1qxy...fjhx0wlh 2025-01-21 08:00:00       10.00 ADA         0.00 EPOK     2 tickets
//! Epoch 535 | 20.00% | 4d 0h 0m 0s remaining
//! ```

pub mod cli;
pub mod demo;
pub mod render;

pub use cli::Args;
pub use render::RenderOptions;
