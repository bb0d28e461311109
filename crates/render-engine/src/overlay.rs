//! Development overlay: a readout of the transport state.

use std::fmt;

use cutframe_editor_state::EditorState;
use serde::Serialize;

/// Informational snapshot of the transport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DebugOverlay {
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
    pub track_count: usize,
}

impl DebugOverlay {
    pub fn from_state(state: &EditorState) -> Self {
        Self {
            current_time: state.playback.current_time,
            duration: state.playback.duration,
            is_playing: state.playback.is_playing,
            track_count: state.tracks.len(),
        }
    }
}

impl fmt::Display for DebugOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // time is truncated to tenths so the readout never runs ahead
        let time = (self.current_time * 10.0).floor() / 10.0;
        writeln!(f, "Time: {time:.1}s")?;
        writeln!(f, "Duration: {:.1}s", self.duration)?;
        writeln!(f, "Playing: {}", if self.is_playing { "Yes" } else { "No" })?;
        write!(f, "Tracks: {}", self.track_count)
    }
}
