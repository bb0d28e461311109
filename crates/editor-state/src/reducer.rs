//! The pure transition function.
//!
//! `reduce` never mutates its input. Invariants are enforced here rather
//! than trusted from callers: times are clamped to the timeline, ranges
//! are ordered, duplicate ids are rejected, and removals cascade.

use cutframe_project_model::track::{Track, TrackUpdate};

use crate::action::{Action, Effect};
use crate::state::{
    EditorState, MAX_PLAYBACK_RATE, MAX_TIMELINE_ZOOM, MIN_DURATION, MIN_PLAYBACK_RATE,
    MIN_TIMELINE_ZOOM,
};

/// Outcome of applying an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The action had no effect (duplicate, unknown target, same value).
    Unchanged,
    /// A new snapshot plus the side effects it requires.
    Changed {
        state: EditorState,
        effects: Vec<Effect>,
    },
}

impl Transition {
    fn changed(state: EditorState) -> Self {
        Transition::Changed {
            state,
            effects: vec![],
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Transition::Changed { .. })
    }
}

/// Apply `action` to `state`, producing the next snapshot.
pub fn reduce(state: &EditorState, action: Action) -> Transition {
    match action {
        Action::SetPlaying(playing) => {
            if state.playback.is_playing == playing {
                return Transition::Unchanged;
            }
            let mut next = state.clone();
            next.playback.is_playing = playing;
            Transition::changed(next)
        }

        Action::SetCurrentTime(time) => {
            if time.is_nan() {
                return Transition::Unchanged;
            }
            let time = time.clamp(0.0, state.playback.duration);
            if time == state.playback.current_time {
                return Transition::Unchanged;
            }
            let mut next = state.clone();
            next.playback.current_time = time;
            Transition::changed(next)
        }

        Action::SetDuration(duration) => {
            if !duration.is_finite() {
                return Transition::Unchanged;
            }
            let duration = duration.max(MIN_DURATION);
            let mut next = state.clone();
            let playback = &mut next.playback;
            playback.duration = duration;
            playback.current_time = playback.current_time.min(duration);
            playback.timeline.end = duration;
            playback.timeline.start = playback.timeline.start.min(duration);
            for track in &mut next.tracks {
                track.start_time = track.start_time.min(duration);
                track.end_time = track.end_time.min(duration);
            }
            Transition::changed(next)
        }

        Action::SetVolume(volume) => {
            if volume.is_nan() {
                return Transition::Unchanged;
            }
            let mut next = state.clone();
            next.playback.volume = volume.clamp(0.0, 1.0);
            Transition::changed(next)
        }

        Action::SetPlaybackRate(rate) => {
            if rate.is_nan() {
                return Transition::Unchanged;
            }
            let mut next = state.clone();
            next.playback.playback_rate = rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
            Transition::changed(next)
        }

        Action::SetTimelineRange { start, end } => {
            if start.is_nan() || end.is_nan() {
                return Transition::Unchanged;
            }
            let duration = state.playback.duration;
            let end = start.max(end).min(duration);
            let start = start.max(0.0).min(end);
            let mut next = state.clone();
            next.playback.timeline.start = start;
            next.playback.timeline.end = end;
            Transition::changed(next)
        }

        Action::SetTimelineZoom(zoom) => {
            if zoom.is_nan() {
                return Transition::Unchanged;
            }
            let mut next = state.clone();
            next.playback.timeline.zoom = zoom.clamp(MIN_TIMELINE_ZOOM, MAX_TIMELINE_ZOOM);
            Transition::changed(next)
        }

        Action::AddTrack(track) => add_track(state, track),

        Action::RemoveTrack(id) => {
            let Some(removed) = state.track(&id) else {
                return Transition::Unchanged;
            };
            let mut effects = vec![];
            if removed.kind().uses_media_resource() {
                effects.push(Effect::ReleaseMedia(id.clone()));
            }
            let mut next = state.clone();
            next.tracks.retain(|t| t.id != id);
            next.selection.retain(|s| s != &id);
            Transition::Changed {
                state: next,
                effects,
            }
        }

        Action::UpdateTrack { id, update } => update_track(state, &id, update),

        Action::SelectTrack(id) => {
            if !state.has_track(&id) || state.is_selected(&id) {
                return Transition::Unchanged;
            }
            let mut next = state.clone();
            next.selection.push(id);
            Transition::changed(next)
        }

        Action::DeselectTrack(id) => {
            if !state.is_selected(&id) {
                return Transition::Unchanged;
            }
            let mut next = state.clone();
            next.selection.retain(|s| s != &id);
            Transition::changed(next)
        }

        Action::ClearSelection => {
            if state.selection.is_empty() {
                return Transition::Unchanged;
            }
            let mut next = state.clone();
            next.selection.clear();
            Transition::changed(next)
        }

        Action::SetTimer(handle) => {
            if state.playback.timer == handle {
                return Transition::Unchanged;
            }
            let mut next = state.clone();
            next.playback.timer = handle;
            Transition::changed(next)
        }
    }
}

fn add_track(state: &EditorState, mut track: Track) -> Transition {
    if state.has_track(&track.id) {
        return Transition::Unchanged;
    }

    let (start, end) = clamp_window(
        track.start_time,
        track.end_time,
        state.playback.duration,
    );
    track.start_time = start;
    track.end_time = end;

    let mut effects = vec![];
    if track.wants_media_resource() {
        effects.push(Effect::AcquireMedia(track.id.clone()));
    }

    let mut next = state.clone();
    next.tracks.push(track);
    Transition::Changed {
        state: next,
        effects,
    }
}

fn update_track(
    state: &EditorState,
    id: &cutframe_project_model::track::TrackId,
    update: TrackUpdate,
) -> Transition {
    let Some(index) = state.tracks.iter().position(|t| &t.id == id) else {
        return Transition::Unchanged;
    };
    let current = &state.tracks[index];
    let mut track = current.clone();

    if let Some(name) = update.name {
        track.name = name;
    }
    if let Some(enabled) = update.enabled {
        track.enabled = enabled;
    }
    if let Some(locked) = update.locked {
        track.locked = locked;
    }
    if let Some(source) = update.source {
        track.source = Some(source);
    }
    if let Some(content) = update.content {
        if content.kind() == track.kind() {
            track.content = content;
        } else {
            tracing::debug!(
                track = %id,
                from = %track.kind(),
                to = %content.kind(),
                "Ignoring content update that changes track type"
            );
        }
    }

    let duration = state.playback.duration;
    let start = update
        .start_time
        .filter(|s| !s.is_nan())
        .map(|s| s.clamp(0.0, duration))
        .unwrap_or(track.start_time);
    let end = update
        .end_time
        .filter(|e| !e.is_nan())
        .unwrap_or(track.end_time);
    track.start_time = start;
    track.end_time = end.max(start).min(duration);

    if &track == current {
        return Transition::Unchanged;
    }

    let mut effects = vec![];
    if track.kind().uses_media_resource() {
        if track.source != current.source {
            effects.push(Effect::ReleaseMedia(id.clone()));
            if track.wants_media_resource() {
                effects.push(Effect::AcquireMedia(id.clone()));
            }
        } else if track.content != current.content {
            effects.push(Effect::ConfigureMedia(id.clone()));
        }
    }

    let mut next = state.clone();
    next.tracks[index] = track;
    Transition::Changed {
        state: next,
        effects,
    }
}

/// Clamp a track window into `[0, duration]` with `start <= end`.
fn clamp_window(start: f64, end: f64, duration: f64) -> (f64, f64) {
    let start = if start.is_nan() { 0.0 } else { start.clamp(0.0, duration) };
    let end = if end.is_nan() { start } else { end.max(start).min(duration) };
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutframe_project_model::track::{
        TextMetadata, TrackContent, TrackId, VisualMetadata,
    };
    use cutframe_project_model::transform::ObjectFit;

    fn apply(state: &EditorState, action: Action) -> EditorState {
        match reduce(state, action) {
            Transition::Changed { state, .. } => state,
            Transition::Unchanged => state.clone(),
        }
    }

    fn effects(state: &EditorState, action: Action) -> Vec<Effect> {
        match reduce(state, action) {
            Transition::Changed { effects, .. } => effects,
            Transition::Unchanged => vec![],
        }
    }

    fn text(id: &str, start: f64, end: f64) -> Track {
        Track::text(id, id, start, end, TextMetadata::with_text(id))
    }

    fn video(id: &str, start: f64, end: f64) -> Track {
        Track::video(id, id, start, end, format!("{id}.mp4"), VisualMetadata::default())
    }

    #[test]
    fn test_set_duration_reclamps_view_tracks_and_playhead() {
        let mut state = EditorState::with_duration(10.0);
        state = apply(&state, Action::AddTrack(text("t", 2.0, 8.0)));
        state = apply(&state, Action::SetCurrentTime(7.0));

        let next = apply(&state, Action::SetDuration(5.0));
        assert_eq!(next.playback.duration, 5.0);
        assert_eq!(next.playback.timeline.end, 5.0);
        assert_eq!(next.playback.current_time, 5.0);
        assert_eq!(next.tracks[0].end_time, 5.0);
        assert_eq!(next.tracks[0].start_time, 2.0);
    }

    #[test]
    fn test_set_duration_has_floor() {
        let next = apply(&EditorState::default(), Action::SetDuration(-3.0));
        assert_eq!(next.playback.duration, MIN_DURATION);
    }

    #[test]
    fn test_set_duration_rejects_non_finite() {
        let state = EditorState::with_duration(8.0);
        for duration in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            assert_eq!(reduce(&state, Action::SetDuration(duration)), Transition::Unchanged);
        }
        let end = apply(&state, Action::SetCurrentTime(f64::INFINITY));
        assert_eq!(end.playback.current_time, 8.0);
    }

    #[test]
    fn test_volume_rate_zoom_are_clamped() {
        let state = EditorState::default();
        assert_eq!(apply(&state, Action::SetVolume(1.7)).playback.volume, 1.0);
        assert_eq!(apply(&state, Action::SetVolume(-0.2)).playback.volume, 0.0);
        assert_eq!(
            apply(&state, Action::SetPlaybackRate(10.0)).playback.playback_rate,
            4.0
        );
        assert_eq!(
            apply(&state, Action::SetPlaybackRate(0.0)).playback.playback_rate,
            0.25
        );
        assert_eq!(
            apply(&state, Action::SetTimelineZoom(50.0)).playback.timeline.zoom,
            10.0
        );
        assert!(!reduce(&state, Action::SetVolume(f64::NAN)).is_changed());
    }

    #[test]
    fn test_timeline_range_is_ordered_and_bounded() {
        let state = EditorState::with_duration(10.0);
        let view = apply(&state, Action::SetTimelineRange { start: -2.0, end: 30.0 })
            .playback
            .timeline;
        assert_eq!((view.start, view.end), (0.0, 10.0));

        let view = apply(&state, Action::SetTimelineRange { start: 6.0, end: 3.0 })
            .playback
            .timeline;
        assert_eq!((view.start, view.end), (6.0, 6.0));

        let view = apply(&state, Action::SetTimelineRange { start: 12.0, end: 15.0 })
            .playback
            .timeline;
        assert!(view.start <= view.end);
        assert_eq!(view.end, 10.0);
    }

    #[test]
    fn test_current_time_is_clamped() {
        let state = EditorState::with_duration(10.0);
        assert_eq!(apply(&state, Action::SetCurrentTime(42.0)).playback.current_time, 10.0);
        assert_eq!(apply(&state, Action::SetCurrentTime(-1.0)).playback.current_time, 0.0);
    }

    #[test]
    fn test_add_track_clamps_and_dedups() {
        let state = EditorState::with_duration(10.0);
        let state = apply(&state, Action::AddTrack(text("t", -1.0, 20.0)));
        assert_eq!(state.tracks[0].start_time, 0.0);
        assert_eq!(state.tracks[0].end_time, 10.0);

        let duplicate = reduce(&state, Action::AddTrack(text("t", 1.0, 2.0)));
        assert_eq!(duplicate, Transition::Unchanged);

        let inverted = apply(&state, Action::AddTrack(text("u", 6.0, 3.0)));
        let u = inverted.track(&TrackId::from("u")).unwrap();
        assert_eq!((u.start_time, u.end_time), (6.0, 6.0));
    }

    #[test]
    fn test_add_media_track_requests_resource() {
        let state = EditorState::default();
        assert_eq!(
            effects(&state, Action::AddTrack(video("v", 0.0, 5.0))),
            vec![Effect::AcquireMedia(TrackId::from("v"))]
        );
        assert!(effects(&state, Action::AddTrack(text("t", 0.0, 5.0))).is_empty());
    }

    #[test]
    fn test_remove_track_cascades() {
        let mut state = EditorState::default();
        state = apply(&state, Action::AddTrack(video("v", 0.0, 5.0)));
        state = apply(&state, Action::SelectTrack(TrackId::from("v")));
        assert!(state.is_selected(&TrackId::from("v")));

        match reduce(&state, Action::RemoveTrack(TrackId::from("v"))) {
            Transition::Changed { state, effects } => {
                assert!(state.tracks.is_empty());
                assert!(state.selection.is_empty());
                assert_eq!(effects, vec![Effect::ReleaseMedia(TrackId::from("v"))]);
            }
            Transition::Unchanged => panic!("remove should change state"),
        }

        assert_eq!(
            reduce(&state, Action::RemoveTrack(TrackId::from("missing"))),
            Transition::Unchanged
        );
    }

    #[test]
    fn test_update_track_reclamps_against_new_start() {
        let state = apply(&EditorState::with_duration(10.0), Action::AddTrack(text("t", 2.0, 4.0)));
        let id = TrackId::from("t");

        let next = apply(
            &state,
            Action::UpdateTrack {
                id: id.clone(),
                update: TrackUpdate::times(6.0, 5.0),
            },
        );
        let t = next.track(&id).unwrap();
        assert_eq!((t.start_time, t.end_time), (6.0, 6.0));

        let next = apply(
            &state,
            Action::UpdateTrack {
                id: id.clone(),
                update: TrackUpdate::end_time(99.0),
            },
        );
        assert_eq!(next.track(&id).unwrap().end_time, 10.0);

        let next = apply(
            &state,
            Action::UpdateTrack {
                id: id.clone(),
                update: TrackUpdate::start_time(-4.0),
            },
        );
        assert_eq!(next.track(&id).unwrap().start_time, 0.0);
    }

    #[test]
    fn test_update_unknown_track_is_noop() {
        let state = EditorState::default();
        let t = reduce(
            &state,
            Action::UpdateTrack {
                id: TrackId::from("ghost"),
                update: TrackUpdate::enabled(false),
            },
        );
        assert_eq!(t, Transition::Unchanged);
    }

    #[test]
    fn test_update_rejects_type_change() {
        let state = apply(&EditorState::default(), Action::AddTrack(text("t", 0.0, 1.0)));
        let t = reduce(
            &state,
            Action::UpdateTrack {
                id: TrackId::from("t"),
                update: TrackUpdate::content(TrackContent::Video(VisualMetadata::default())),
            },
        );
        assert_eq!(t, Transition::Unchanged);
    }

    #[test]
    fn test_update_media_track_effects() {
        let state = apply(&EditorState::default(), Action::AddTrack(video("v", 0.0, 5.0)));
        let id = TrackId::from("v");

        let resourced = effects(
            &state,
            Action::UpdateTrack {
                id: id.clone(),
                update: TrackUpdate {
                    source: Some("other.mp4".to_string()),
                    ..TrackUpdate::default()
                },
            },
        );
        assert_eq!(
            resourced,
            vec![Effect::ReleaseMedia(id.clone()), Effect::AcquireMedia(id.clone())]
        );

        let reconfigured = effects(
            &state,
            Action::UpdateTrack {
                id: id.clone(),
                update: TrackUpdate::content(TrackContent::Video(VisualMetadata::fullscreen(
                    ObjectFit::Contain,
                ))),
            },
        );
        assert_eq!(reconfigured, vec![Effect::ConfigureMedia(id)]);
    }

    #[test]
    fn test_selection_is_idempotent() {
        let mut state = EditorState::default();
        state = apply(&state, Action::AddTrack(text("a", 0.0, 1.0)));
        let id = TrackId::from("a");

        let once = apply(&state, Action::SelectTrack(id.clone()));
        assert_eq!(reduce(&once, Action::SelectTrack(id.clone())), Transition::Unchanged);
        assert_eq!(once.selection, vec![id.clone()]);

        assert_eq!(
            reduce(&state, Action::DeselectTrack(id.clone())),
            Transition::Unchanged
        );
        assert_eq!(
            reduce(&state, Action::SelectTrack(TrackId::from("ghost"))),
            Transition::Unchanged
        );

        let cleared = apply(&once, Action::ClearSelection);
        assert!(cleared.selection.is_empty());
    }

    #[test]
    fn test_input_state_is_never_mutated() {
        let state = EditorState::default();
        let before = state.clone();
        let _ = reduce(&state, Action::AddTrack(text("t", 0.0, 1.0)));
        let _ = reduce(&state, Action::SetDuration(3.0));
        assert_eq!(state, before);
    }
}
