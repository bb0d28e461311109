//! Cutframe Editor State
//!
//! The single source of truth for an editing session:
//! - **State:** Immutable snapshots of tracks, playback and selection
//! - **Actions:** The closed set of named transitions
//! - **Reducer:** A pure function enforcing invariants at the boundary
//! - **Store:** Owns the current snapshot and reports side effects
//!
//! Transitions that target unknown tracks are no-ops, never errors.
//! The editor favours staying interactive over rejecting input.

pub mod action;
pub mod reducer;
pub mod state;
pub mod store;

pub use action::*;
pub use reducer::*;
pub use state::*;
pub use store::*;
