//! Declarative project input and its conversion into tracks.
//!
//! A project describes what the editor shows at mount: total duration,
//! output canvas, the ordered initial tracks and a few settings. It is
//! consumed once; afterwards the state store owns the tracks.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::track::{
    AudioMetadata, TextAlign, TextBaseline, TextMetadata, Track, TrackContent, TrackId, TrackKind,
    VisualMetadata,
};
use crate::transform::{Layout, ObjectFit, Transform};

/// Default text size when a track does not set one.
pub const DEFAULT_FONT_SIZE: f64 = 32.0;
/// Default text family when a track does not set one.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
/// Default text colour when a track does not set one.
pub const DEFAULT_TEXT_COLOR: &str = "#ffffff";

/// Top-level project description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProject {
    /// Human-readable project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Total timeline duration in seconds.
    pub duration: f64,

    /// Output canvas settings.
    pub output: OutputSettings,

    /// Initial tracks, in paint order.
    #[serde(default)]
    pub tracks: Vec<InitialTrack>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<ProjectSettings>,
}

/// Output canvas configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSettings {
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<VideoFormat>,
}

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    Mp4,
    Webm,
    Gif,
}

/// Render quality hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    High,
}

/// Project-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectSettings {
    /// CSS colour painted behind all tracks.
    pub background_color: Option<String>,
    pub audio_sample_rate: Option<u32>,
    pub quality: Option<Quality>,
}

/// Fields shared by every initial track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackTiming {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl TrackTiming {
    pub fn new(start_time: f64, end_time: f64) -> Self {
        Self {
            name: None,
            start_time,
            end_time,
            enabled: None,
            locked: None,
        }
    }
}

/// A text overlay in the project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialTextTrack {
    #[serde(flatten)]
    pub timing: TrackTiming,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<TextBaseline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

/// A video clip in the project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialVideoTrack {
    #[serde(flatten)]
    pub timing: TrackTiming,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_fit: Option<ObjectFit>,
}

/// A still image in the project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialImageTrack {
    #[serde(flatten)]
    pub timing: TrackTiming,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_fit: Option<ObjectFit>,
}

/// An audio marker in the project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialAudioTrack {
    #[serde(flatten)]
    pub timing: TrackTiming,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
}

/// One initial track, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InitialTrack {
    Text(InitialTextTrack),
    Video(InitialVideoTrack),
    Image(InitialImageTrack),
    Audio(InitialAudioTrack),
}

impl InitialTrack {
    pub fn kind(&self) -> TrackKind {
        match self {
            InitialTrack::Text(_) => TrackKind::Text,
            InitialTrack::Video(_) => TrackKind::Video,
            InitialTrack::Image(_) => TrackKind::Image,
            InitialTrack::Audio(_) => TrackKind::Audio,
        }
    }

    pub fn timing(&self) -> &TrackTiming {
        match self {
            InitialTrack::Text(t) => &t.timing,
            InitialTrack::Video(t) => &t.timing,
            InitialTrack::Image(t) => &t.timing,
            InitialTrack::Audio(t) => &t.timing,
        }
    }

    fn source(&self) -> Option<&str> {
        match self {
            InitialTrack::Text(_) => None,
            InitialTrack::Video(t) => Some(&t.source),
            InitialTrack::Image(t) => Some(&t.source),
            InitialTrack::Audio(t) => Some(&t.source),
        }
    }

    /// Check the per-track constraints of the project schema.
    pub fn validate(&self, index: usize) -> Result<(), ProjectError> {
        let invalid = |message: String| ProjectError::InvalidTrack { index, message };
        let timing = self.timing();

        if !(timing.start_time >= 0.0) {
            return Err(invalid(format!("startTime must be >= 0, got {}", timing.start_time)));
        }
        if !(timing.end_time >= 0.0) {
            return Err(invalid(format!("endTime must be >= 0, got {}", timing.end_time)));
        }
        if let Some(source) = self.source() {
            if source.trim().is_empty() {
                return Err(invalid(format!("{} track requires a source", self.kind())));
            }
        }

        let check_unit = |label: &str, value: Option<f64>| match value {
            Some(v) if !(0.0..=1.0).contains(&v) => {
                Err(invalid(format!("{label} must be within [0, 1], got {v}")))
            }
            _ => Ok(()),
        };
        let check_positive = |label: &str, value: Option<f64>| match value {
            Some(v) if !(v > 0.0) => Err(invalid(format!("{label} must be positive, got {v}"))),
            _ => Ok(()),
        };

        match self {
            InitialTrack::Text(t) => check_positive("fontSize", t.font_size),
            InitialTrack::Video(t) => {
                check_unit("volume", t.volume)?;
                check_positive("playbackRate", t.playback_rate)?;
                check_unit("opacity", t.transform.map(|tr| tr.opacity))
            }
            InitialTrack::Image(t) => check_unit("opacity", t.transform.map(|tr| tr.opacity)),
            InitialTrack::Audio(t) => check_unit("volume", t.volume),
        }
    }
}

impl VideoProject {
    /// Create an empty project.
    pub fn new(name: impl Into<String>, width: u32, height: u32, duration: f64) -> Self {
        Self {
            name: Some(name.into()),
            duration,
            output: OutputSettings {
                width,
                height,
                frame_rate: Some(30.0),
                format: Some(VideoFormat::Mp4),
            },
            tracks: vec![],
            settings: None,
        }
    }

    /// Parse and validate a project from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        let project: VideoProject = serde_json::from_str(json)?;
        project.validate()?;
        Ok(project)
    }

    /// Load and validate a project file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref().to_path_buf();
        let json = std::fs::read_to_string(&path).map_err(|e| ProjectError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let project: VideoProject =
            serde_json::from_str(&json).map_err(|e| ProjectError::ParseError {
                path: path.clone(),
                source: e,
            })?;
        project.validate()?;
        Ok(project)
    }

    /// Save the project as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ProjectError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| ProjectError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        std::fs::write(&path, json).map_err(|e| ProjectError::IoError { path, source: e })
    }

    /// Check project-level and per-track constraints.
    pub fn validate(&self) -> Result<(), ProjectError> {
        if !(self.duration > 0.0) || !self.duration.is_finite() {
            return Err(ProjectError::ValidationError {
                message: format!("duration must be positive, got {}", self.duration),
            });
        }
        if self.output.width == 0 || self.output.height == 0 {
            return Err(ProjectError::ValidationError {
                message: format!(
                    "output size must be positive, got {}x{}",
                    self.output.width, self.output.height
                ),
            });
        }
        if let Some(fps) = self.output.frame_rate {
            if !(fps > 0.0) {
                return Err(ProjectError::ValidationError {
                    message: format!("frameRate must be positive, got {fps}"),
                });
            }
        }
        for (index, track) in self.tracks.iter().enumerate() {
            track.validate(index)?;
        }
        Ok(())
    }

    pub fn background_color(&self) -> Option<&str> {
        self.settings
            .as_ref()
            .and_then(|s| s.background_color.as_deref())
    }
}

/// Hard defaults used when neither a project nor legacy values are given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountDefaults {
    pub width: u32,
    pub height: u32,
    pub duration: f64,
}

impl Default for MountDefaults {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            duration: 10.0,
        }
    }
}

/// Everything the editor may be mounted with.
///
/// The flat `width`/`height`/`duration`/`initial_tracks` fields are the
/// deprecated interface, consulted only where `project` is absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountOptions {
    pub project: Option<VideoProject>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration: Option<f64>,
    pub initial_tracks: Option<Vec<InitialTrack>>,
}

impl MountOptions {
    pub fn from_project(project: VideoProject) -> Self {
        Self {
            project: Some(project),
            ..Self::default()
        }
    }

    /// Resolve each value as: structured project, then legacy field, then default.
    pub fn resolve(&self, defaults: MountDefaults) -> EffectiveProject {
        let project = self.project.as_ref();
        EffectiveProject {
            name: project.and_then(|p| p.name.clone()),
            width: project
                .map(|p| p.output.width)
                .or(self.width)
                .unwrap_or(defaults.width),
            height: project
                .map(|p| p.output.height)
                .or(self.height)
                .unwrap_or(defaults.height),
            duration: project
                .map(|p| p.duration)
                .or(self.duration.filter(|d| d.is_finite() && *d > 0.0))
                .unwrap_or(defaults.duration),
            frame_rate: project.and_then(|p| p.output.frame_rate),
            background_color: project.and_then(|p| p.background_color().map(str::to_string)),
            tracks: project
                .map(|p| p.tracks.clone())
                .or_else(|| self.initial_tracks.clone())
                .unwrap_or_default(),
        }
    }
}

/// Mount values after fallback resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveProject {
    pub name: Option<String>,
    pub width: u32,
    pub height: u32,
    pub duration: f64,
    pub frame_rate: Option<f64>,
    pub background_color: Option<String>,
    pub tracks: Vec<InitialTrack>,
}

impl EffectiveProject {
    /// Convert every initial track, preserving order.
    pub fn converted_tracks(&self) -> Vec<Track> {
        self.tracks
            .iter()
            .enumerate()
            .map(|(index, t)| convert_initial_track(t, index, self.width as f64, self.height as f64))
            .collect()
    }
}

/// Convert one initial track into a model track.
///
/// Ids are `initial-<type>-<index>`; unnamed tracks become `<Type> <index+1>`.
pub fn convert_initial_track(
    initial: &InitialTrack,
    index: usize,
    canvas_width: f64,
    canvas_height: f64,
) -> Track {
    let kind = initial.kind();
    let timing = initial.timing();

    let (source, content) = match initial {
        InitialTrack::Text(t) => (
            None,
            TrackContent::Text(TextMetadata {
                text: Some(t.text.clone()),
                font_size: Some(t.font_size.unwrap_or(DEFAULT_FONT_SIZE)),
                font_family: Some(
                    t.font_family
                        .clone()
                        .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
                ),
                color: Some(
                    t.color
                        .clone()
                        .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
                ),
                x: Some(t.x.unwrap_or(canvas_width / 2.0)),
                y: Some(t.y.unwrap_or(canvas_height / 2.0)),
                text_align: Some(t.text_align.unwrap_or_default()),
                baseline: Some(t.baseline.unwrap_or_default()),
                background_color: t.background_color.clone(),
            }),
        ),
        InitialTrack::Video(t) => {
            let layout = t.layout.unwrap_or_default();
            (
                Some(t.source.clone()),
                TrackContent::Video(VisualMetadata {
                    layout,
                    transform: default_transform(layout, t.transform, canvas_width, canvas_height),
                    object_fit: t.object_fit.unwrap_or_default(),
                    volume: t.volume.unwrap_or(1.0),
                    muted: t.muted.unwrap_or(false),
                    playback_rate: t.playback_rate.unwrap_or(1.0),
                }),
            )
        }
        InitialTrack::Image(t) => {
            let layout = t.layout.unwrap_or_default();
            (
                Some(t.source.clone()),
                TrackContent::Image(VisualMetadata {
                    layout,
                    transform: default_transform(layout, t.transform, canvas_width, canvas_height),
                    object_fit: t.object_fit.unwrap_or_default(),
                    ..VisualMetadata::default()
                }),
            )
        }
        InitialTrack::Audio(t) => (
            Some(t.source.clone()),
            TrackContent::Audio(AudioMetadata {
                volume: t.volume.unwrap_or(1.0),
                muted: t.muted.unwrap_or(false),
            }),
        ),
    };

    Track {
        id: TrackId::new(format!("initial-{}-{index}", kind.as_str())),
        name: timing
            .name
            .clone()
            .unwrap_or_else(|| format!("{} {}", kind.label(), index + 1)),
        start_time: timing.start_time,
        end_time: timing.end_time,
        enabled: timing.enabled.unwrap_or(true),
        locked: timing.locked.unwrap_or(false),
        source,
        content,
    }
}

fn default_transform(
    layout: Layout,
    given: Option<Transform>,
    canvas_width: f64,
    canvas_height: f64,
) -> Option<Transform> {
    match (given, layout) {
        (Some(t), _) => Some(t),
        (None, Layout::Custom) => Some(Transform::identity(canvas_width, canvas_height)),
        (None, Layout::Fullscreen) => None,
    }
}

/// Errors that can occur when loading or validating projects.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid project JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid project: {message}")]
    ValidationError { message: String },

    #[error("Invalid track #{index}: {message}")]
    InvalidTrack { index: usize, message: String },
}
