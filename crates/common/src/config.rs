//! Editor configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::clock::DEFAULT_UPDATE_INTERVAL_MS;
use crate::error::{CutframeError, CutframeResult};

/// Global editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Canvas size used when no project output size is supplied.
    pub canvas: CanvasDefaults,

    /// Playback clock and transport tuning.
    pub playback: PlaybackConfig,

    /// Media resource settings.
    pub media: MediaConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Fallback canvas dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasDefaults {
    pub width: u32,
    pub height: u32,
}

/// Playback clock parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Timeline duration (seconds) when nothing else supplies one.
    pub default_duration_secs: f64,

    /// Minimum wall-clock gap between emitted time updates.
    pub time_update_interval_ms: f64,

    /// Emit one update per output frame instead of using the fixed interval.
    pub scale_interval_with_frame_rate: bool,

    /// Drift (seconds) beyond which a playing media element is re-seeked.
    pub resync_tolerance_secs: f64,

    /// Frame rate used for frame stepping when the project has none.
    pub frame_step_fps: f64,
}

/// Media resource settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Origin of the hosting document (e.g. `https://app.example.com`).
    /// Sources on any other origin are loaded with anonymous CORS.
    pub document_origin: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "cutframe=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for CanvasDefaults {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_duration_secs: 10.0,
            time_update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            scale_interval_with_frame_rate: false,
            resync_tolerance_secs: 0.1,
            frame_step_fps: 30.0,
        }
    }
}

impl PlaybackConfig {
    /// Effective update interval for a project rendering at `frame_rate`.
    pub fn update_interval_ms(&self, frame_rate: Option<f64>) -> f64 {
        match frame_rate {
            Some(fps) if self.scale_interval_with_frame_rate && fps.is_finite() && fps > 0.0 => {
                1000.0 / fps
            }
            _ => self.time_update_interval_ms,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl EditorConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path.
    pub fn load_from(path: impl AsRef<Path>) -> CutframeResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CutframeError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CutframeError::config(format!("{}: {e}", path.display())))
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), std::io::Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("cutframe").join("config.json")
}
