//! Timed tracks: the entities the compositor paints.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::transform::{Layout, ObjectFit, Transform};

/// Stable track identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier of the form `<prefix>-<time>-<counter>`.
    pub fn generate(prefix: &str) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("{prefix}-{millis}-{seq:x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TrackId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Discriminant of a track's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Image,
    Text,
    Audio,
}

impl TrackKind {
    /// Whether tracks of this kind are backed by an off-screen decode element.
    pub fn uses_media_resource(self) -> bool {
        matches!(self, TrackKind::Video | TrackKind::Image)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Image => "image",
            TrackKind::Text => "text",
            TrackKind::Audio => "audio",
        }
    }

    /// Capitalized label used for default track names.
    pub fn label(self) -> &'static str {
        match self {
            TrackKind::Video => "Video",
            TrackKind::Image => "Image",
            TrackKind::Text => "Text",
            TrackKind::Audio => "Audio",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Text track settings. Unset fields fall back at render time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextMetadata {
    /// Text to draw; the track name is drawn when unset.
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    /// CSS colour string.
    pub color: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub text_align: Option<TextAlign>,
    pub baseline: Option<TextBaseline>,
    /// CSS colour of a padded box drawn behind the text.
    pub background_color: Option<String>,
}

impl TextMetadata {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Video and image track settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualMetadata {
    pub layout: Layout,
    /// Used only by [`Layout::Custom`]; fullscreen layout reads its opacity.
    pub transform: Option<Transform>,
    pub object_fit: ObjectFit,
    pub volume: f64,
    pub muted: bool,
    pub playback_rate: f64,
}

impl Default for VisualMetadata {
    fn default() -> Self {
        Self {
            layout: Layout::Fullscreen,
            transform: None,
            object_fit: ObjectFit::Cover,
            volume: 1.0,
            muted: false,
            playback_rate: 1.0,
        }
    }
}

impl VisualMetadata {
    /// Custom layout with the given transform.
    pub fn custom(transform: Transform) -> Self {
        Self {
            layout: Layout::Custom,
            transform: Some(transform),
            ..Self::default()
        }
    }

    /// Fullscreen layout with the given fit.
    pub fn fullscreen(object_fit: ObjectFit) -> Self {
        Self {
            object_fit,
            ..Self::default()
        }
    }

    /// Opacity applied in fullscreen layout.
    pub fn opacity(&self) -> f64 {
        self.transform
            .map(|t| t.opacity.clamp(0.0, 1.0))
            .unwrap_or(1.0)
    }
}

/// Audio track settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioMetadata {
    pub volume: f64,
    pub muted: bool,
}

impl Default for AudioMetadata {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
        }
    }
}

/// Type-specific track content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "metadata", rename_all = "lowercase")]
pub enum TrackContent {
    Video(VisualMetadata),
    Image(VisualMetadata),
    Text(TextMetadata),
    Audio(AudioMetadata),
}

impl TrackContent {
    pub fn kind(&self) -> TrackKind {
        match self {
            TrackContent::Video(_) => TrackKind::Video,
            TrackContent::Image(_) => TrackKind::Image,
            TrackContent::Text(_) => TrackKind::Text,
            TrackContent::Audio(_) => TrackKind::Audio,
        }
    }
}

/// A timed element on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    /// Start of the active window (seconds).
    pub start_time: f64,
    /// End of the active window (seconds, inclusive).
    pub end_time: f64,
    /// Visibility toggle.
    pub enabled: bool,
    /// Edit protection flag.
    pub locked: bool,
    /// Media URL; required for video, image and audio tracks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub content: TrackContent,
}

impl Track {
    fn build(
        id: impl Into<TrackId>,
        name: impl Into<String>,
        start_time: f64,
        end_time: f64,
        source: Option<String>,
        content: TrackContent,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_time,
            end_time,
            enabled: true,
            locked: false,
            source,
            content,
        }
    }

    pub fn text(
        id: impl Into<TrackId>,
        name: impl Into<String>,
        start_time: f64,
        end_time: f64,
        metadata: TextMetadata,
    ) -> Self {
        Self::build(id, name, start_time, end_time, None, TrackContent::Text(metadata))
    }

    pub fn video(
        id: impl Into<TrackId>,
        name: impl Into<String>,
        start_time: f64,
        end_time: f64,
        source: impl Into<String>,
        metadata: VisualMetadata,
    ) -> Self {
        Self::build(
            id,
            name,
            start_time,
            end_time,
            Some(source.into()),
            TrackContent::Video(metadata),
        )
    }

    pub fn image(
        id: impl Into<TrackId>,
        name: impl Into<String>,
        start_time: f64,
        end_time: f64,
        source: impl Into<String>,
        metadata: VisualMetadata,
    ) -> Self {
        Self::build(
            id,
            name,
            start_time,
            end_time,
            Some(source.into()),
            TrackContent::Image(metadata),
        )
    }

    pub fn audio(
        id: impl Into<TrackId>,
        name: impl Into<String>,
        start_time: f64,
        end_time: f64,
        source: impl Into<String>,
        metadata: AudioMetadata,
    ) -> Self {
        Self::build(
            id,
            name,
            start_time,
            end_time,
            Some(source.into()),
            TrackContent::Audio(metadata),
        )
    }

    /// Image track for an uploaded file: shown for the first 3 seconds,
    /// fullscreen cover, fully opaque.
    pub fn uploaded_image(file_name: impl Into<String>, url: impl Into<String>) -> Self {
        let metadata = VisualMetadata {
            transform: Some(Transform {
                opacity: 1.0,
                ..Transform::identity(0.0, 0.0)
            }),
            ..VisualMetadata::fullscreen(ObjectFit::Cover)
        };
        Self::image(TrackId::generate("image"), file_name, 0.0, 3.0, url, metadata)
    }

    /// Builder: mark the track hidden.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn kind(&self) -> TrackKind {
        self.content.kind()
    }

    /// Length of the active window.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Whether the compositor paints this track at `time`.
    pub fn is_visible_at(&self, time: f64) -> bool {
        self.enabled && self.start_time <= time && time <= self.end_time
    }

    /// Time relative to the track start, if `time` falls in the active window.
    pub fn local_time(&self, time: f64) -> Option<f64> {
        let local = time - self.start_time;
        (local >= 0.0 && local <= self.duration()).then_some(local)
    }

    /// Visual settings for video and image tracks.
    pub fn visual(&self) -> Option<&VisualMetadata> {
        match &self.content {
            TrackContent::Video(m) | TrackContent::Image(m) => Some(m),
            _ => None,
        }
    }

    pub fn visual_mut(&mut self) -> Option<&mut VisualMetadata> {
        match &mut self.content {
            TrackContent::Video(m) | TrackContent::Image(m) => Some(m),
            _ => None,
        }
    }

    pub fn text_metadata(&self) -> Option<&TextMetadata> {
        match &self.content {
            TrackContent::Text(m) => Some(m),
            _ => None,
        }
    }

    /// Whether this track needs an off-screen media resource.
    pub fn wants_media_resource(&self) -> bool {
        self.kind().uses_media_resource() && self.source.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Partial update for a track. Unset fields are left alone.
///
/// Time bounds are re-validated by the state store, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackUpdate {
    pub name: Option<String>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub enabled: Option<bool>,
    pub locked: Option<bool>,
    pub source: Option<String>,
    /// Replacement content; must have the same kind as the track.
    pub content: Option<TrackContent>,
}

impl TrackUpdate {
    pub fn times(start_time: f64, end_time: f64) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
            ..Self::default()
        }
    }

    pub fn start_time(start_time: f64) -> Self {
        Self {
            start_time: Some(start_time),
            ..Self::default()
        }
    }

    pub fn end_time(end_time: f64) -> Self {
        Self {
            end_time: Some(end_time),
            ..Self::default()
        }
    }

    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }

    pub fn content(content: TrackContent) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_window_inclusive() {
        let track = Track::text("t", "Title", 2.0, 8.0, TextMetadata::with_text("Hello"));
        assert!(!track.is_visible_at(1.0));
        assert!(track.is_visible_at(2.0));
        assert!(track.is_visible_at(5.0));
        assert!(track.is_visible_at(8.0));
        assert!(!track.is_visible_at(9.0));
        assert!(!track.clone().disabled().is_visible_at(5.0));
    }

    #[test]
    fn test_local_time() {
        let track = Track::video("v", "Clip", 3.0, 5.0, "clip.mp4", VisualMetadata::default());
        assert_eq!(track.local_time(2.9), None);
        assert_eq!(track.local_time(4.5), Some(1.5));
        assert_eq!(track.local_time(5.0), Some(2.0));
        assert_eq!(track.local_time(5.1), None);
    }

    #[test]
    fn test_media_resource_requirement() {
        let video = Track::video("v", "Clip", 0.0, 1.0, "clip.mp4", VisualMetadata::default());
        let image = Track::image("i", "Still", 0.0, 1.0, "", VisualMetadata::default());
        let audio = Track::audio("a", "Music", 0.0, 1.0, "song.mp3", AudioMetadata::default());
        assert!(video.wants_media_resource());
        assert!(!image.wants_media_resource());
        assert!(!audio.wants_media_resource());
    }

    #[test]
    fn test_uploaded_image_defaults() {
        let a = Track::uploaded_image("cat.png", "blob:cat");
        let b = Track::uploaded_image("dog.png", "blob:dog");
        assert_ne!(a.id, b.id);
        assert!(a.id.as_str().starts_with("image-"));
        assert_eq!(a.kind(), TrackKind::Image);
        assert_eq!((a.start_time, a.end_time), (0.0, 3.0));
        let visual = a.visual().unwrap();
        assert_eq!(visual.layout, Layout::Fullscreen);
        assert_eq!(visual.object_fit, ObjectFit::Cover);
        assert_eq!(visual.opacity(), 1.0);
    }

    #[test]
    fn test_track_json_shape() {
        let track = Track::text("t1", "Title", 0.0, 2.0, TextMetadata::with_text("Hi"));
        let value = serde_json::to_value(&track).unwrap();
        assert_eq!(value["startTime"], 0.0);
        assert_eq!(value["content"]["type"], "text");
        assert_eq!(value["content"]["metadata"]["text"], "Hi");

        let parsed: Track = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, track);
    }
}
