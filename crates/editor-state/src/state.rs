//! Editor state snapshot types.

use std::fmt;

use cutframe_project_model::track::{Track, TrackId};
use serde::{Deserialize, Serialize};

/// Lowest accepted playback rate.
pub const MIN_PLAYBACK_RATE: f64 = 0.25;
/// Highest accepted playback rate.
pub const MAX_PLAYBACK_RATE: f64 = 4.0;
/// Lowest accepted timeline zoom.
pub const MIN_TIMELINE_ZOOM: f64 = 0.1;
/// Highest accepted timeline zoom.
pub const MAX_TIMELINE_ZOOM: f64 = 10.0;
/// Shortest accepted timeline duration (seconds).
pub const MIN_DURATION: f64 = 0.1;
/// Timeline duration used when none is usable.
pub const DEFAULT_DURATION: f64 = 10.0;

/// Opaque handle of a scheduled animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameHandle(pub u64);

impl fmt::Display for FrameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// Visible window of the timeline UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineView {
    pub start: f64,
    pub end: f64,
    pub zoom: f64,
}

/// Transport state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    /// Master clock position, always within `[0, duration]`.
    pub current_time: f64,
    /// Timeline length in seconds.
    pub duration: f64,
    /// Output volume in `[0, 1]`.
    pub volume: f64,
    /// Speed multiplier in `[0.25, 4]`.
    pub playback_rate: f64,
    pub timeline: TimelineView,
    /// The pending clock tick, owned by the playback clock.
    pub timer: Option<FrameHandle>,
}

impl PlaybackState {
    /// A non-finite `duration` falls back to [`DEFAULT_DURATION`].
    pub fn new(duration: f64) -> Self {
        let duration = if duration.is_finite() {
            duration.max(MIN_DURATION)
        } else {
            DEFAULT_DURATION
        };
        Self {
            is_playing: false,
            current_time: 0.0,
            duration,
            volume: 1.0,
            playback_rate: 1.0,
            timeline: TimelineView {
                start: 0.0,
                end: duration,
                zoom: 1.0,
            },
            timer: None,
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

/// Complete editor snapshot.
///
/// Track order is paint order: later tracks are composited over earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
    pub playback: PlaybackState,
    pub tracks: Vec<Track>,
    /// Selected track ids, in selection order, without duplicates.
    pub selection: Vec<TrackId>,
}

impl EditorState {
    /// Fresh state for a timeline of `duration` seconds.
    pub fn with_duration(duration: f64) -> Self {
        Self {
            playback: PlaybackState::new(duration),
            ..Self::default()
        }
    }

    pub fn track(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == id)
    }

    pub fn has_track(&self, id: &TrackId) -> bool {
        self.track(id).is_some()
    }

    pub fn is_selected(&self, id: &TrackId) -> bool {
        self.selection.contains(id)
    }

    /// Tracks painted at the current time, in paint order.
    pub fn visible_tracks(&self) -> impl Iterator<Item = &Track> {
        let now = self.playback.current_time;
        self.tracks.iter().filter(move |t| t.is_visible_at(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutframe_project_model::track::TextMetadata;

    #[test]
    fn test_new_state_defaults() {
        let state = EditorState::default();
        assert!(!state.playback.is_playing);
        assert_eq!(state.playback.duration, 10.0);
        assert_eq!(state.playback.timeline.end, 10.0);
        assert_eq!(state.playback.volume, 1.0);
        assert_eq!(state.playback.playback_rate, 1.0);
        assert!(state.playback.timer.is_none());
        assert!(state.tracks.is_empty());
    }

    #[test]
    fn test_duration_has_floor() {
        assert_eq!(PlaybackState::new(0.0).duration, MIN_DURATION);
    }

    #[test]
    fn test_non_finite_duration_uses_default() {
        assert_eq!(PlaybackState::new(f64::INFINITY).duration, DEFAULT_DURATION);
        assert_eq!(PlaybackState::new(f64::NAN).timeline.end, DEFAULT_DURATION);
    }

    #[test]
    fn test_visible_tracks_follow_current_time() {
        let mut state = EditorState::with_duration(10.0);
        state
            .tracks
            .push(Track::text("a", "A", 0.0, 4.0, TextMetadata::default()));
        state
            .tracks
            .push(Track::text("b", "B", 3.0, 9.0, TextMetadata::default()));

        state.playback.current_time = 3.5;
        let ids: Vec<_> = state.visible_tracks().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);

        state.playback.current_time = 6.0;
        let ids: Vec<_> = state.visible_tracks().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b"]);
    }
}
