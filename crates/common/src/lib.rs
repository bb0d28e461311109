//! Cutframe Common Utilities
//!
//! Shared infrastructure for all Cutframe crates:
//! - Error types and result aliases
//! - Wall-clock sources and update throttling for the playback clock
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
