//! Refreshsparse - finds sparse catalog items and refreshes their metadata
//!
//! This library crate exposes the core functionality for integration testing.

pub mod catalog;
pub mod config;
pub mod jellyfin;
pub mod scheduler;
pub mod sparse;
