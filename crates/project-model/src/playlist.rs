//! Sequential playlists: media items played back to back with subtitles.
//!
//! A playlist file lists `mediaItems` (images and videos with a duration
//! in milliseconds) and timed `subtitles`. It has no free track layout:
//! items run end to end, each fitted inside the canvas, and subtitles are
//! boxed captions near the bottom edge. [`PlaylistProject::to_video_project`]
//! lowers it onto the regular track model so the same editor plays both.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::project::{
    InitialImageTrack, InitialTextTrack, InitialTrack, InitialVideoTrack, OutputSettings,
    ProjectError, ProjectSettings, TrackTiming, VideoFormat, VideoProject,
};
use crate::track::{TextAlign, TextBaseline};
use crate::transform::{Layout, ObjectFit};

/// Subtitle size when the style does not set one.
pub const SUBTITLE_FONT_SIZE: f64 = 24.0;
pub const SUBTITLE_FONT_FAMILY: &str = "sans-serif";
pub const SUBTITLE_COLOR: &str = "#fff";
pub const SUBTITLE_BACKGROUND: &str = "rgba(0, 0, 0, 0.8)";
/// Distance from the bottom edge to the default subtitle baseline.
pub const SUBTITLE_BOTTOM_OFFSET: f64 = 50.0;

/// Whether an item is a still or a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaItemKind {
    Image,
    Video,
}

/// One entry of the playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MediaItemKind,
    pub src: String,
    /// Milliseconds.
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubtitlePosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubtitleStyle {
    pub font_size: Option<f64>,
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub font_family: Option<String>,
}

/// A caption shown while `start_time <= t <= end_time` (milliseconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtitle {
    pub id: String,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<SubtitlePosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<SubtitleStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSettings {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub background_color: String,
}

/// A playlist project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub media_items: Vec<MediaItem>,
    #[serde(default)]
    pub subtitles: Vec<Subtitle>,
    pub settings: PlaylistSettings,
}

/// The item shown at a playlist time, with the time inside that item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentItem<'a> {
    pub index: usize,
    pub item: &'a MediaItem,
    /// Milliseconds since the item started.
    pub local_time: f64,
}

impl PlaylistProject {
    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        let playlist: PlaylistProject = serde_json::from_str(json)?;
        playlist.validate()?;
        Ok(playlist)
    }

    pub fn validate(&self) -> Result<(), ProjectError> {
        let fail = |message: String| Err(ProjectError::ValidationError { message });

        if self.settings.width == 0 || self.settings.height == 0 {
            return fail(format!(
                "canvas size must be positive, got {}x{}",
                self.settings.width, self.settings.height
            ));
        }
        if !(self.settings.fps > 0.0) {
            return fail(format!("fps must be positive, got {}", self.settings.fps));
        }
        if self.media_items.is_empty() {
            return fail("playlist has no media items".to_string());
        }

        let mut seen = HashSet::new();
        for item in &self.media_items {
            if !seen.insert(item.id.as_str()) {
                return fail(format!("duplicate media item id {:?}", item.id));
            }
            if !(item.duration > 0.0) || !item.duration.is_finite() {
                return fail(format!(
                    "media item {:?} needs a positive duration, got {}",
                    item.id, item.duration
                ));
            }
            if item.src.trim().is_empty() {
                return fail(format!("media item {:?} has no src", item.id));
            }
        }

        for subtitle in &self.subtitles {
            if !(subtitle.start_time >= 0.0) || !(subtitle.end_time >= 0.0) {
                return fail(format!("subtitle {:?} has a negative time", subtitle.id));
            }
        }
        Ok(())
    }

    /// Sum of item durations, in milliseconds.
    pub fn total_duration_ms(&self) -> f64 {
        self.media_items.iter().map(|item| item.duration).sum()
    }

    /// The item covering `time_ms`, each item owning `[start, start + duration)`.
    pub fn item_at(&self, time_ms: f64) -> Option<CurrentItem<'_>> {
        let mut start = 0.0;
        for (index, item) in self.media_items.iter().enumerate() {
            if time_ms >= start && time_ms < start + item.duration {
                return Some(CurrentItem {
                    index,
                    item,
                    local_time: time_ms - start,
                });
            }
            start += item.duration;
        }
        None
    }

    /// Subtitles visible at `time_ms`, in file order.
    pub fn subtitles_at(&self, time_ms: f64) -> Vec<&Subtitle> {
        self.subtitles
            .iter()
            .filter(|s| time_ms >= s.start_time && time_ms <= s.end_time)
            .collect()
    }

    /// Lower the playlist onto timed tracks.
    ///
    /// Items become fullscreen `contain` tracks laid end to end; videos are
    /// muted. Subtitles follow as text tracks so they paint over the media.
    pub fn to_video_project(&self) -> VideoProject {
        let width = f64::from(self.settings.width);
        let height = f64::from(self.settings.height);
        let mut tracks = Vec::with_capacity(self.media_items.len() + self.subtitles.len());

        let mut start = 0.0;
        for item in &self.media_items {
            let end = start + item.duration;
            let timing = TrackTiming {
                name: Some(item.alt.clone().unwrap_or_else(|| item.id.clone())),
                ..TrackTiming::new(ms_to_secs(start), ms_to_secs(end))
            };
            tracks.push(match item.kind {
                MediaItemKind::Image => InitialTrack::Image(InitialImageTrack {
                    timing,
                    source: item.src.clone(),
                    layout: Some(Layout::Fullscreen),
                    transform: None,
                    object_fit: Some(ObjectFit::Contain),
                }),
                MediaItemKind::Video => InitialTrack::Video(InitialVideoTrack {
                    timing,
                    source: item.src.clone(),
                    layout: Some(Layout::Fullscreen),
                    transform: None,
                    volume: None,
                    muted: Some(true),
                    playback_rate: None,
                    object_fit: Some(ObjectFit::Contain),
                }),
            });
            start = end;
        }

        for subtitle in &self.subtitles {
            let style = subtitle.style.clone().unwrap_or_default();
            let position = subtitle.position.unwrap_or(SubtitlePosition {
                x: width / 2.0,
                y: height - SUBTITLE_BOTTOM_OFFSET,
            });
            tracks.push(InitialTrack::Text(InitialTextTrack {
                timing: TrackTiming {
                    name: Some(format!("Subtitle {}", subtitle.id)),
                    ..TrackTiming::new(ms_to_secs(subtitle.start_time), ms_to_secs(subtitle.end_time))
                },
                text: subtitle.text.clone(),
                font_size: Some(style.font_size.unwrap_or(SUBTITLE_FONT_SIZE)),
                color: Some(style.color.unwrap_or_else(|| SUBTITLE_COLOR.to_string())),
                x: Some(position.x),
                y: Some(position.y),
                font_family: Some(
                    style
                        .font_family
                        .unwrap_or_else(|| SUBTITLE_FONT_FAMILY.to_string()),
                ),
                text_align: Some(TextAlign::Center),
                baseline: Some(TextBaseline::Bottom),
                background_color: Some(
                    style
                        .background_color
                        .unwrap_or_else(|| SUBTITLE_BACKGROUND.to_string()),
                ),
            }));
        }

        VideoProject {
            name: Some(self.title.clone()),
            duration: ms_to_secs(self.total_duration_ms()),
            output: OutputSettings {
                width: self.settings.width,
                height: self.settings.height,
                frame_rate: Some(self.settings.fps),
                format: Some(VideoFormat::Mp4),
            },
            tracks,
            settings: Some(ProjectSettings {
                background_color: Some(self.settings.background_color.clone()),
                ..ProjectSettings::default()
            }),
        }
    }
}

/// Load either project shape; a top-level `mediaItems` key marks a playlist.
pub fn load_project_file(path: impl AsRef<Path>) -> Result<VideoProject, ProjectError> {
    let path = path.as_ref().to_path_buf();
    let json = std::fs::read_to_string(&path).map_err(|e| ProjectError::IoError {
        path: path.clone(),
        source: e,
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&json).map_err(|e| ProjectError::ParseError {
            path: path.clone(),
            source: e,
        })?;

    let project = if value.get("mediaItems").is_some() {
        let playlist: PlaylistProject = serde_json::from_value(value)
            .map_err(|e| ProjectError::ParseError { path, source: e })?;
        playlist.validate()?;
        playlist.to_video_project()
    } else {
        serde_json::from_value(value).map_err(|e| ProjectError::ParseError { path, source: e })?
    };
    project.validate()?;
    Ok(project)
}

fn ms_to_secs(ms: f64) -> f64 {
    ms / 1000.0
}
