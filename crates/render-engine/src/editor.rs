//! The editor session: state store, clock, media and compositor wired
//! together behind one control surface.
//!
//! Every control method returns `()`. Failures are absorbed where they
//! happen: unknown ids are no-ops, unready media is skipped, refused
//! playback is logged and ignored.

use std::fmt;
use std::sync::Arc;

use cutframe_common::clock::TimeSource;
use cutframe_common::config::EditorConfig;
use cutframe_editor_state::{Action, EditorState, EditorStore, Effect, FrameHandle};
use cutframe_project_model::project::{MountDefaults, MountOptions};
use cutframe_project_model::track::{Track, TrackId, TrackUpdate};
use cutframe_project_model::transform::{Layout, ObjectFit, Transform, TransformPatch};

use crate::canvas::Frame;
use crate::clock::{PlaybackClock, Tick};
use crate::compositor::{Compositor, CompositorSettings};
use crate::media::{MediaBackend, MediaElement, MediaResourceManager, ReadyState};
use crate::overlay::DebugOverlay;
use crate::scheduler::FrameScheduler;

/// Size of the transform installed when a track switches to custom layout.
pub const CUSTOM_LAYOUT_SIZE: (f64, f64) = (400.0, 300.0);

/// Host-provided primitives the editor runs on.
pub struct EditorHost {
    pub time_source: Box<dyn TimeSource>,
    pub scheduler: Box<dyn FrameScheduler>,
    pub media_backend: Box<dyn MediaBackend>,
    /// Optional primary element drawn as the background when ready.
    pub primary: Option<Box<dyn MediaElement>>,
}

impl EditorHost {
    pub fn new(
        time_source: Box<dyn TimeSource>,
        scheduler: Box<dyn FrameScheduler>,
        media_backend: Box<dyn MediaBackend>,
    ) -> Self {
        Self {
            time_source,
            scheduler,
            media_backend,
            primary: None,
        }
    }

    pub fn with_primary(mut self, primary: Box<dyn MediaElement>) -> Self {
        self.primary = Some(primary);
        self
    }
}

/// Events reported by the primary media element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimaryMediaEvent {
    TimeUpdate(f64),
    DurationChange(f64),
    VolumeChange(f64),
    RateChange(f64),
}

/// A mounted editing session.
pub struct VideoEditor {
    pub(crate) store: EditorStore,
    pub(crate) clock: PlaybackClock,
    pub(crate) time_source: Box<dyn TimeSource>,
    pub(crate) scheduler: Box<dyn FrameScheduler>,
    pub(crate) media: MediaResourceManager,
    pub(crate) primary: Option<Box<dyn MediaElement>>,
    pub(crate) frame_step_fps: f64,
    compositor: Compositor,
    name: Option<String>,
    last_frame: Option<Frame>,
    mounted: bool,
}

impl fmt::Debug for VideoEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoEditor")
            .field("name", &self.name)
            .field("revision", &self.store.revision())
            .field("media", &self.media)
            .field("mounted", &self.mounted)
            .finish()
    }
}

impl VideoEditor {
    /// Resolve the mount options, seed the store and paint the first frame.
    pub fn mount(options: MountOptions, host: EditorHost, config: &EditorConfig) -> Self {
        let defaults = MountDefaults {
            width: config.canvas.width,
            height: config.canvas.height,
            duration: config.playback.default_duration_secs,
        };
        let project = options.resolve(defaults);
        let interval_ms = config.playback.update_interval_ms(project.frame_rate);
        let frame_step_fps = project
            .frame_rate
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .unwrap_or(config.playback.frame_step_fps);

        let media = MediaResourceManager::new(host.media_backend)
            .with_document_origin(config.media.document_origin.clone())
            .with_resync_tolerance(config.playback.resync_tolerance_secs);

        let compositor = Compositor::new(CompositorSettings {
            width: project.width as f64,
            height: project.height as f64,
            background_color: project.background_color.clone(),
            show_debug_info: false,
        });

        let mut editor = Self {
            store: EditorStore::new(EditorState::with_duration(project.duration)),
            clock: PlaybackClock::new(interval_ms),
            time_source: host.time_source,
            scheduler: host.scheduler,
            media,
            primary: host.primary,
            frame_step_fps,
            compositor,
            name: project.name.clone(),
            last_frame: None,
            mounted: true,
        };

        for track in project.converted_tracks() {
            editor.dispatch(Action::AddTrack(track));
        }
        // one full diff pass over the seeded track set
        let state = editor.store.snapshot();
        editor.media.sync(&state.tracks);
        editor.refresh();

        tracing::info!(
            name = editor.name.as_deref().unwrap_or("untitled"),
            width = project.width,
            height = project.height,
            duration = editor.state().playback.duration,
            tracks = editor.state().tracks.len(),
            update_interval_ms = editor.clock.update_interval_ms(),
            "Mounted editor"
        );
        editor
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<EditorState> {
        self.store.snapshot()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn media(&self) -> &MediaResourceManager {
        &self.media
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The most recently composed frame.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    pub fn debug_overlay(&self) -> DebugOverlay {
        DebugOverlay::from_state(self.store.state())
    }

    pub fn set_show_debug_info(&mut self, show: bool) {
        self.compositor.set_show_debug_info(show);
        self.refresh();
    }

    /// Compose a frame for the current snapshot without storing it.
    pub fn compose(&self) -> Frame {
        self.compositor
            .compose(self.store.state(), &self.media, self.primary.as_deref())
    }

    /// Compose and keep the current frame.
    pub fn render(&mut self) -> &Frame {
        let frame = self.compose();
        self.last_frame.insert(frame)
    }

    pub fn set_duration(&mut self, duration: f64) {
        if self.dispatch(Action::SetDuration(duration)) {
            self.refresh();
        }
    }

    pub fn set_timeline_range(&mut self, start: f64, end: f64) {
        self.dispatch(Action::SetTimelineRange { start, end });
    }

    pub fn set_timeline_zoom(&mut self, zoom: f64) {
        self.dispatch(Action::SetTimelineZoom(zoom));
    }

    pub fn add_track(&mut self, track: Track) {
        if self.dispatch(Action::AddTrack(track)) {
            self.refresh();
        }
    }

    pub fn remove_track(&mut self, id: &TrackId) {
        if self.dispatch(Action::RemoveTrack(id.clone())) {
            self.refresh();
        }
    }

    pub fn update_track(&mut self, id: &TrackId, update: TrackUpdate) {
        if self.dispatch(Action::UpdateTrack {
            id: id.clone(),
            update,
        }) {
            self.refresh();
        }
    }

    pub fn select_track(&mut self, id: &TrackId) {
        self.dispatch(Action::SelectTrack(id.clone()));
    }

    pub fn deselect_track(&mut self, id: &TrackId) {
        self.dispatch(Action::DeselectTrack(id.clone()));
    }

    pub fn clear_selection(&mut self) {
        self.dispatch(Action::ClearSelection);
    }

    /// Switch a video or image track between fullscreen and custom layout.
    /// Switching to custom without a transform installs a default one.
    pub fn set_track_layout(&mut self, id: &TrackId, layout: Layout) {
        let Some(mut track) = self.store.state().track(id).cloned() else {
            return;
        };
        let Some(visual) = track.visual_mut() else {
            return;
        };
        visual.layout = layout;
        if layout == Layout::Custom && visual.transform.is_none() {
            let (width, height) = CUSTOM_LAYOUT_SIZE;
            visual.transform = Some(Transform::identity(width, height));
        }
        self.update_track(id, TrackUpdate::content(track.content));
    }

    /// Merge `patch` into the track's transform. No-op without one.
    pub fn update_track_transform(&mut self, id: &TrackId, patch: TransformPatch) {
        let Some(mut track) = self.store.state().track(id).cloned() else {
            return;
        };
        let Some(visual) = track.visual_mut() else {
            return;
        };
        let Some(transform) = visual.transform else {
            return;
        };
        visual.transform = Some(transform.merged(&patch));
        self.update_track(id, TrackUpdate::content(track.content));
    }

    pub fn set_track_object_fit(&mut self, id: &TrackId, fit: ObjectFit) {
        let Some(mut track) = self.store.state().track(id).cloned() else {
            return;
        };
        let Some(visual) = track.visual_mut() else {
            return;
        };
        visual.object_fit = fit;
        self.update_track(id, TrackUpdate::content(track.content));
    }

    /// Deliver a scheduled animation frame.
    ///
    /// Handles other than the pending one are stale (cancelled by a pause
    /// or seek) and are ignored, so an old tick chain can never resume.
    pub fn on_animation_frame(&mut self, handle: FrameHandle) {
        let playback = &self.store.state().playback;
        if !playback.is_playing || playback.timer != Some(handle) {
            tracing::trace!(%handle, "Ignoring stale frame");
            return;
        }
        let duration = playback.duration;
        self.dispatch(Action::SetTimer(None));

        let now = self.time_source.now_ms();
        match self.clock.tick(now, duration) {
            Tick::Skip => {
                self.render();
                self.schedule_frame();
            }
            Tick::Advance(time) => {
                self.dispatch(Action::SetCurrentTime(time));
                self.sync_media();
                self.render();
                self.schedule_frame();
            }
            Tick::Finished(end) => {
                self.dispatch(Action::SetCurrentTime(end));
                self.dispatch(Action::SetPlaying(false));
                if let Some(primary) = self.primary.as_mut() {
                    primary.pause();
                }
                self.sync_media();
                self.render();
                tracing::debug!(time = end, "Playback reached the end");
            }
        }
    }

    /// Apply an event from the primary media element.
    pub fn on_primary_media_event(&mut self, event: PrimaryMediaEvent) {
        match event {
            PrimaryMediaEvent::TimeUpdate(time) => {
                let primary_ready = self
                    .primary
                    .as_deref()
                    .is_some_and(|p| p.has_source() && p.ready_state() >= ReadyState::HaveMetadata);
                if !self.store.state().playback.is_playing
                    && primary_ready
                    && self.dispatch(Action::SetCurrentTime(time))
                {
                    self.refresh();
                }
            }
            PrimaryMediaEvent::DurationChange(duration) => {
                if duration.is_finite() && duration > 0.0 {
                    self.set_duration(duration);
                }
            }
            PrimaryMediaEvent::VolumeChange(volume) => {
                self.dispatch(Action::SetVolume(volume));
            }
            PrimaryMediaEvent::RateChange(rate) => {
                self.dispatch(Action::SetPlaybackRate(rate));
            }
        }
    }

    /// Cancel the pending frame, release every media resource and detach
    /// the primary element. Safe to call more than once.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.cancel_frame();
        self.clock.stop();
        self.dispatch(Action::SetPlaying(false));
        self.media.release_all();
        if let Some(primary) = self.primary.as_mut() {
            primary.detach();
        }
        self.mounted = false;
        tracing::info!(name = self.name.as_deref().unwrap_or("untitled"), "Unmounted editor");
    }

    /// Run one transition and carry out its effects. Returns whether the
    /// state changed.
    pub(crate) fn dispatch(&mut self, action: Action) -> bool {
        let before = self.store.revision();
        let effects = self.store.dispatch(action);
        for effect in effects {
            self.apply_effect(effect);
        }
        self.store.revision() != before
    }

    fn apply_effect(&mut self, effect: Effect) {
        let state = self.store.snapshot();
        match effect {
            Effect::AcquireMedia(id) => {
                if let Some(track) = state.track(&id) {
                    self.media.acquire(track);
                }
            }
            Effect::ConfigureMedia(id) => {
                if let Some(track) = state.track(&id) {
                    self.media.configure(track);
                }
            }
            Effect::ReleaseMedia(id) => {
                self.media.release(&id);
            }
        }
    }

    /// Bring media elements in line with the snapshot.
    pub(crate) fn sync_media(&mut self) {
        let state = self.store.snapshot();
        self.media.sync_playback(
            &state.tracks,
            state.playback.current_time,
            state.playback.is_playing,
        );
    }

    /// After a change: resync media, and repaint once when paused. While
    /// playing the frame loop repaints.
    pub(crate) fn refresh(&mut self) {
        self.sync_media();
        if !self.store.state().playback.is_playing {
            self.render();
        }
    }

    pub(crate) fn schedule_frame(&mut self) {
        let handle = self.scheduler.request_frame();
        self.dispatch(Action::SetTimer(Some(handle)));
    }

    /// Cancel the in-flight frame, if any.
    pub(crate) fn cancel_frame(&mut self) {
        if let Some(handle) = self.store.state().playback.timer {
            self.scheduler.cancel_frame(handle);
            self.dispatch(Action::SetTimer(None));
        }
    }
}

impl Drop for VideoEditor {
    fn drop(&mut self) {
        self.unmount();
    }
}
