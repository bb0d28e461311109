//! The closed set of state transitions.

use cutframe_project_model::track::{Track, TrackId, TrackUpdate};

use crate::state::FrameHandle;

/// A named state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetPlaying(bool),
    SetCurrentTime(f64),
    SetDuration(f64),
    SetVolume(f64),
    SetPlaybackRate(f64),
    SetTimelineRange { start: f64, end: f64 },
    SetTimelineZoom(f64),
    AddTrack(Track),
    RemoveTrack(TrackId),
    UpdateTrack { id: TrackId, update: TrackUpdate },
    SelectTrack(TrackId),
    DeselectTrack(TrackId),
    ClearSelection,
    SetTimer(Option<FrameHandle>),
}

impl Action {
    /// Stable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetPlaying(_) => "set_playing",
            Action::SetCurrentTime(_) => "set_current_time",
            Action::SetDuration(_) => "set_duration",
            Action::SetVolume(_) => "set_volume",
            Action::SetPlaybackRate(_) => "set_playback_rate",
            Action::SetTimelineRange { .. } => "set_timeline_range",
            Action::SetTimelineZoom(_) => "set_timeline_zoom",
            Action::AddTrack(_) => "add_track",
            Action::RemoveTrack(_) => "remove_track",
            Action::UpdateTrack { .. } => "update_track",
            Action::SelectTrack(_) => "select_track",
            Action::DeselectTrack(_) => "deselect_track",
            Action::ClearSelection => "clear_selection",
            Action::SetTimer(_) => "set_timer",
        }
    }

    /// Whether this action fires on every clock tick.
    pub fn is_high_frequency(&self) -> bool {
        matches!(self, Action::SetCurrentTime(_) | Action::SetTimer(_))
    }
}

/// Side effect requested by a transition, carried out by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Create the off-screen media resource for a track, if missing.
    AcquireMedia(TrackId),
    /// Re-apply a track's volume, mute and rate to its existing resource.
    ConfigureMedia(TrackId),
    /// Tear down the off-screen media resource for a track.
    ReleaseMedia(TrackId),
}
