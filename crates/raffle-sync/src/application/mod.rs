//! # Application Module
//!
//! Application services orchestrating the domain and outbound ports.

pub mod controller;

pub use controller::LiveSyncController;
