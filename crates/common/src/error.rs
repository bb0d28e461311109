//! Error types shared across Cutframe crates.
//!
//! The interactive control surface never surfaces these: playback and
//! editing failures are absorbed where they happen. These errors cover
//! configuration loading and frame serialization; project files carry
//! their own `ProjectError`.

use std::path::PathBuf;

/// Top-level error type for Cutframe operations.
#[derive(Debug, thiserror::Error)]
pub enum CutframeError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using CutframeError.
pub type CutframeResult<T> = Result<T, CutframeError>;

impl CutframeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
