//! Off-screen media resources.
//!
//! Every video or image track with a source owns exactly one hidden
//! decode element, keyed by track id. Elements are created lazily, at most
//! once per id, and always detached when the track goes away or the
//! editor unmounts. Readiness is polled each frame, never awaited.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use cutframe_project_model::track::{Track, TrackId, TrackKind};
use serde::{Deserialize, Serialize};

/// Errors reported by media elements.
///
/// None of these cross the editor's control surface; callers discard them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MediaError {
    #[error("Playback rejected: {reason}")]
    PlaybackRejected { reason: String },

    #[error("Element has no source")]
    NoSource,
}

/// Decode progress of a media element, in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

/// Cross-origin policy applied when the element is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossOrigin {
    /// Same-origin or non-network source: no CORS request.
    #[default]
    None,
    /// Request without credentials so frames stay drawable.
    Anonymous,
}

/// Preload hint for new elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preload {
    None,
    Metadata,
    #[default]
    Auto,
}

/// Everything a backend needs to create an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRequest {
    pub track: TrackId,
    pub kind: TrackKind,
    pub source: String,
    pub cross_origin: CrossOrigin,
    pub muted: bool,
    pub volume: f64,
    pub playback_rate: f64,
    pub preload: Preload,
}

impl MediaRequest {
    /// Build the request for `track`, or `None` if it owns no resource.
    pub fn for_track(track: &Track, document_origin: Option<&str>) -> Option<Self> {
        if !track.wants_media_resource() {
            return None;
        }
        let source = track.source.clone()?;
        let visual = track.visual()?;
        Some(Self {
            track: track.id.clone(),
            kind: track.kind(),
            cross_origin: cross_origin_for(&source, document_origin),
            source,
            muted: visual.muted,
            volume: visual.volume.clamp(0.0, 1.0),
            playback_rate: visual.playback_rate,
            preload: Preload::Auto,
        })
    }
}

/// Identifies a drawable pixel source for the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaHandle {
    /// The primary media element bound by the host.
    Primary,
    /// The off-screen element of a track.
    Track(TrackId),
}

impl fmt::Display for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaHandle::Primary => f.write_str("primary"),
            MediaHandle::Track(id) => write!(f, "track:{id}"),
        }
    }
}

/// A hidden, decode-capable media element.
pub trait MediaElement {
    /// Start native playback. Best-effort: callers may discard the error.
    fn play(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, time: f64);

    fn ready_state(&self) -> ReadyState;

    /// Intrinsic frame size; `(0, 0)` until metadata is known.
    fn natural_size(&self) -> (u32, u32);

    fn set_volume(&mut self, volume: f64);

    fn set_muted(&mut self, muted: bool);

    fn set_playback_rate(&mut self, rate: f64);

    fn has_source(&self) -> bool;

    /// Pause and drop the source. The element is unusable afterwards.
    fn detach(&mut self);

    /// Whether a frame can be drawn right now.
    fn is_drawable(&self) -> bool {
        let (w, h) = self.natural_size();
        self.ready_state() >= ReadyState::HaveMetadata && w > 0 && h > 0
    }
}

/// Creates media elements.
pub trait MediaBackend {
    /// Create an element for `request`. Creation never fails outright: a
    /// source that cannot be decoded simply never becomes ready.
    fn create(&mut self, request: &MediaRequest) -> Box<dyn MediaElement>;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Decide the cross-origin policy for `source`.
///
/// Only absolute http(s) URLs on a different origin than the document get
/// anonymous CORS. Relative, `blob:` and `data:` sources never do. Without
/// a known document origin every absolute http(s) URL is treated as foreign.
pub fn cross_origin_for(source: &str, document_origin: Option<&str>) -> CrossOrigin {
    let Some(origin) = url_origin(source) else {
        return CrossOrigin::None;
    };
    match document_origin {
        Some(doc) if doc.trim_end_matches('/').eq_ignore_ascii_case(origin) => CrossOrigin::None,
        _ => CrossOrigin::Anonymous,
    }
}

fn url_origin(source: &str) -> Option<&str> {
    let scheme_end = source.find("://")?;
    let scheme = &source[..scheme_end];
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return None;
    }
    let rest = &source[scheme_end + 3..];
    let host_len = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    if host_len == 0 {
        return None;
    }
    Some(&source[..scheme_end + 3 + host_len])
}

struct ManagedMedia {
    kind: TrackKind,
    source: String,
    element: Box<dyn MediaElement>,
}

/// Owns the off-screen elements, keyed by track id.
pub struct MediaResourceManager {
    backend: Box<dyn MediaBackend>,
    resources: HashMap<TrackId, ManagedMedia>,
    document_origin: Option<String>,
    resync_tolerance: f64,
}

impl fmt::Debug for MediaResourceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaResourceManager")
            .field("backend", &self.backend.name())
            .field("resources", &self.resources.len())
            .field("document_origin", &self.document_origin)
            .finish()
    }
}

impl MediaResourceManager {
    pub fn new(backend: Box<dyn MediaBackend>) -> Self {
        Self {
            backend,
            resources: HashMap::new(),
            document_origin: None,
            resync_tolerance: 0.1,
        }
    }

    pub fn with_document_origin(mut self, origin: Option<String>) -> Self {
        self.document_origin = origin;
        self
    }

    /// Drift (seconds) tolerated before a playing element is re-seeked.
    pub fn with_resync_tolerance(mut self, seconds: f64) -> Self {
        self.resync_tolerance = seconds.max(0.0);
        self
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.resources.contains_key(id)
    }

    pub fn element(&self, id: &TrackId) -> Option<&dyn MediaElement> {
        self.resources.get(id).map(|m| m.element.as_ref())
    }

    /// Ensure `track` has an element. Idempotent: an existing element for
    /// the same id is reused.
    pub fn acquire(&mut self, track: &Track) -> Option<MediaHandle> {
        if self.resources.contains_key(&track.id) {
            return Some(MediaHandle::Track(track.id.clone()));
        }
        let request = MediaRequest::for_track(track, self.document_origin.as_deref())?;
        let element = self.backend.create(&request);
        tracing::debug!(
            track = %track.id,
            kind = %request.kind,
            cross_origin = ?request.cross_origin,
            backend = self.backend.name(),
            "Created media resource"
        );
        self.resources.insert(
            track.id.clone(),
            ManagedMedia {
                kind: request.kind,
                source: request.source,
                element,
            },
        );
        Some(MediaHandle::Track(track.id.clone()))
    }

    /// Detach and forget the element of `id`. Returns whether one existed.
    pub fn release(&mut self, id: &TrackId) -> bool {
        match self.resources.remove(id) {
            Some(mut media) => {
                media.element.detach();
                tracing::debug!(track = %id, "Released media resource");
                true
            }
            None => false,
        }
    }

    /// Re-apply volume, mute and rate from `track`. A source change
    /// replaces the element.
    pub fn configure(&mut self, track: &Track) {
        let source_changed = self
            .resources
            .get(&track.id)
            .is_some_and(|m| track.source.as_deref() != Some(m.source.as_str()));
        if source_changed {
            self.release(&track.id);
            self.acquire(track);
            return;
        }

        let (Some(media), Some(visual)) = (self.resources.get_mut(&track.id), track.visual()) else {
            return;
        };
        media.element.set_muted(visual.muted);
        media.element.set_volume(visual.volume.clamp(0.0, 1.0));
        media.element.set_playback_rate(visual.playback_rate);
    }

    /// Diff resources against `tracks`: release orphans, create missing.
    pub fn sync(&mut self, tracks: &[Track]) {
        let orphans: Vec<TrackId> = self
            .resources
            .keys()
            .filter(|id| !tracks.iter().any(|t| &t.id == *id && t.wants_media_resource()))
            .cloned()
            .collect();
        for id in orphans {
            self.release(&id);
        }
        for track in tracks.iter().filter(|t| t.wants_media_resource()) {
            self.acquire(track);
        }
    }

    /// Slave every video element to the master clock.
    ///
    /// In-range elements play and are re-seeked once drift exceeds the
    /// tolerance; when paused they are set exactly. Everything else pauses.
    /// Image elements are never played or seeked.
    pub fn sync_playback(&mut self, tracks: &[Track], current_time: f64, is_playing: bool) {
        let tolerance = self.resync_tolerance;
        for track in tracks {
            let Some(media) = self.resources.get_mut(&track.id) else {
                continue;
            };
            if media.kind != TrackKind::Video {
                continue;
            }
            match track.local_time(current_time) {
                Some(local) if is_playing => {
                    if (media.element.current_time() - local).abs() > tolerance {
                        media.element.set_current_time(local);
                    }
                    if media.element.is_paused() {
                        discard_play_error(&track.id, media.element.play());
                    }
                }
                Some(local) => {
                    media.element.pause();
                    media.element.set_current_time(local);
                }
                None => media.element.pause(),
            }
        }
    }

    /// Seek every in-range video element to its exact local time and start it.
    pub fn start_active(&mut self, tracks: &[Track], current_time: f64) {
        for track in tracks {
            let Some(media) = self.resources.get_mut(&track.id) else {
                continue;
            };
            if media.kind != TrackKind::Video {
                continue;
            }
            if let Some(local) = track.local_time(current_time) {
                media.element.set_current_time(local);
                discard_play_error(&track.id, media.element.play());
            }
        }
    }

    /// Seek in-range video elements to their local time, leaving play state alone.
    pub fn seek_active(&mut self, tracks: &[Track], current_time: f64) {
        for track in tracks {
            let Some(media) = self.resources.get_mut(&track.id) else {
                continue;
            };
            if media.kind != TrackKind::Video {
                continue;
            }
            if let Some(local) = track.local_time(current_time) {
                media.element.set_current_time(local);
            }
        }
    }

    /// Pause every video element.
    pub fn pause_all(&mut self) {
        for media in self.resources.values_mut() {
            if media.kind == TrackKind::Video {
                media.element.pause();
            }
        }
    }

    /// Detach every element. Used at teardown.
    pub fn release_all(&mut self) {
        let count = self.resources.len();
        for (_, mut media) in self.resources.drain() {
            media.element.detach();
        }
        if count > 0 {
            tracing::debug!(count, "Released all media resources");
        }
    }
}

impl Drop for MediaResourceManager {
    fn drop(&mut self) {
        self.release_all();
    }
}

/// Playback start is best-effort: the virtual clock keeps running whether
/// or not an element agrees to play, so a rejection is only logged.
pub(crate) fn discard_play_error(id: &TrackId, result: Result<(), MediaError>) {
    if let Err(err) = result {
        tracing::debug!(track = %id, error = %err, "Media element refused to play");
    }
}

#[derive(Debug, Clone)]
struct SimulatedState {
    request: MediaRequest,
    has_source: bool,
    ready: ReadyState,
    width: u32,
    height: u32,
    paused: bool,
    current_time: f64,
    volume: f64,
    muted: bool,
    playback_rate: f64,
    reject_play: bool,
    play_calls: u32,
    seek_calls: u32,
    detached: bool,
}

/// In-memory media element for headless sessions and tests.
///
/// Clones share state, so a test can keep a handle to an element the
/// editor owns and flip its readiness or inspect what was done to it.
#[derive(Debug, Clone)]
pub struct SimulatedMedia {
    state: Rc<RefCell<SimulatedState>>,
}

impl SimulatedMedia {
    pub fn new(request: MediaRequest) -> Self {
        let playback_rate = request.playback_rate;
        let volume = request.volume;
        let muted = request.muted;
        Self {
            state: Rc::new(RefCell::new(SimulatedState {
                has_source: !request.source.is_empty(),
                request,
                ready: ReadyState::HaveEnoughData,
                width: 1920,
                height: 1080,
                paused: true,
                current_time: 0.0,
                volume,
                muted,
                playback_rate,
                reject_play: false,
                play_calls: 0,
                seek_calls: 0,
                detached: false,
            })),
        }
    }

    /// A primary element not created through a backend.
    pub fn primary(source: impl Into<String>) -> Self {
        Self::new(MediaRequest {
            track: TrackId::new("primary"),
            kind: TrackKind::Video,
            source: source.into(),
            cross_origin: CrossOrigin::None,
            muted: false,
            volume: 1.0,
            playback_rate: 1.0,
            preload: Preload::Auto,
        })
    }

    pub fn request(&self) -> MediaRequest {
        self.state.borrow().request.clone()
    }

    pub fn set_ready_state(&self, ready: ReadyState) {
        self.state.borrow_mut().ready = ready;
    }

    pub fn set_natural_size(&self, width: u32, height: u32) {
        let mut state = self.state.borrow_mut();
        state.width = width;
        state.height = height;
    }

    pub fn set_reject_play(&self, reject: bool) {
        self.state.borrow_mut().reject_play = reject;
    }

    pub fn play_calls(&self) -> u32 {
        self.state.borrow().play_calls
    }

    pub fn seek_calls(&self) -> u32 {
        self.state.borrow().seek_calls
    }

    pub fn is_detached(&self) -> bool {
        self.state.borrow().detached
    }

    pub fn volume(&self) -> f64 {
        self.state.borrow().volume
    }

    pub fn is_muted(&self) -> bool {
        self.state.borrow().muted
    }

    pub fn playback_rate(&self) -> f64 {
        self.state.borrow().playback_rate
    }
}

impl MediaElement for SimulatedMedia {
    fn play(&mut self) -> Result<(), MediaError> {
        let mut state = self.state.borrow_mut();
        state.play_calls += 1;
        if !state.has_source {
            return Err(MediaError::NoSource);
        }
        if state.reject_play {
            return Err(MediaError::PlaybackRejected {
                reason: "autoplay blocked".to_string(),
            });
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.borrow_mut().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    fn set_current_time(&mut self, time: f64) {
        let mut state = self.state.borrow_mut();
        state.current_time = time.max(0.0);
        state.seek_calls += 1;
    }

    fn ready_state(&self) -> ReadyState {
        let state = self.state.borrow();
        if state.has_source {
            state.ready
        } else {
            ReadyState::HaveNothing
        }
    }

    fn natural_size(&self) -> (u32, u32) {
        let state = self.state.borrow();
        (state.width, state.height)
    }

    fn set_volume(&mut self, volume: f64) {
        self.state.borrow_mut().volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.state.borrow_mut().muted = muted;
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.state.borrow_mut().playback_rate = rate;
    }

    fn has_source(&self) -> bool {
        self.state.borrow().has_source
    }

    fn detach(&mut self) {
        let mut state = self.state.borrow_mut();
        state.paused = true;
        state.has_source = false;
        state.detached = true;
    }
}

#[derive(Debug, Clone)]
struct SimulatedDefaults {
    ready: ReadyState,
    width: u32,
    height: u32,
    reject_play: bool,
}

/// Backend producing [`SimulatedMedia`] elements.
///
/// Clones share the registry of created elements.
#[derive(Debug, Clone)]
pub struct SimulatedMediaBackend {
    created: Rc<RefCell<Vec<SimulatedMedia>>>,
    defaults: SimulatedDefaults,
}

impl SimulatedMediaBackend {
    pub fn new() -> Self {
        Self {
            created: Rc::new(RefCell::new(Vec::new())),
            defaults: SimulatedDefaults {
                ready: ReadyState::HaveEnoughData,
                width: 1920,
                height: 1080,
                reject_play: false,
            },
        }
    }

    /// Ready state given to newly created elements.
    pub fn with_ready_state(mut self, ready: ReadyState) -> Self {
        self.defaults.ready = ready;
        self
    }

    /// Natural size given to newly created elements.
    pub fn with_natural_size(mut self, width: u32, height: u32) -> Self {
        self.defaults.width = width;
        self.defaults.height = height;
        self
    }

    /// New elements reject `play`, as under a strict autoplay policy.
    pub fn rejecting_play(mut self) -> Self {
        self.defaults.reject_play = true;
        self
    }

    /// Every element created so far, including detached ones.
    pub fn created(&self) -> Vec<SimulatedMedia> {
        self.created.borrow().clone()
    }

    /// The most recent element created for `id`.
    pub fn element_for(&self, id: &TrackId) -> Option<SimulatedMedia> {
        self.created
            .borrow()
            .iter()
            .rev()
            .find(|m| &m.state.borrow().request.track == id)
            .cloned()
    }

    /// Number of elements not yet detached.
    pub fn live_count(&self) -> usize {
        self.created
            .borrow()
            .iter()
            .filter(|m| !m.is_detached())
            .count()
    }
}

impl Default for SimulatedMediaBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaBackend for SimulatedMediaBackend {
    fn create(&mut self, request: &MediaRequest) -> Box<dyn MediaElement> {
        let element = SimulatedMedia::new(request.clone());
        element.set_ready_state(self.defaults.ready);
        element.set_natural_size(self.defaults.width, self.defaults.height);
        element.set_reject_play(self.defaults.reject_play);
        self.created.borrow_mut().push(element.clone());
        Box::new(element)
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
