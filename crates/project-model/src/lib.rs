//! Cutframe Project Model
//!
//! Defines the core data contracts for the timeline compositor:
//! - **Tracks:** Timed video, image, text and audio elements
//! - **Transforms:** Fullscreen fitting and custom affine placement
//! - **Projects:** Declarative mount-time input and its conversion to tracks
//! - **Playlists:** Back-to-back media items with subtitles, lowered onto tracks
//!
//! All times are in seconds; all geometry is in canvas pixels.

pub mod playlist;
pub mod project;
pub mod track;
pub mod transform;

pub use playlist::*;
pub use project::*;
pub use track::*;
pub use transform::*;
