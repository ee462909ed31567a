//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound port traits against real infrastructure.

mod http_source;
mod system_clock;

pub use http_source::HttpRaffleSource;
pub use system_clock::SystemTimeSource;
