//! Frame compositor: paints the active tracks of a snapshot.
//!
//! Per frame: clear, draw the background (primary media or placeholder),
//! then visit every enabled track whose window contains the current time,
//! in stored order. Later tracks paint over earlier ones.

use cutframe_editor_state::EditorState;
use cutframe_project_model::project::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_TEXT_COLOR};
use cutframe_project_model::track::{TextAlign, TextBaseline, Track, TrackContent, VisualMetadata};
use cutframe_project_model::transform::{fit_rect, Layout, Rect};

use crate::canvas::{DrawOp, Frame, LinearGradient, Shadow, TextStyle};
use crate::media::{MediaElement, MediaHandle, MediaResourceManager, ReadyState};
use crate::overlay::DebugOverlay;

/// Placeholder gradient, top-left to bottom-right.
pub const PLACEHOLDER_GRADIENT: [&str; 2] = ["#1a1a2e", "#16213e"];

/// Placeholder grid spacing in pixels.
pub const GRID_SPACING: f64 = 50.0;

pub const GRID_COLOR: &str = "rgba(255, 255, 255, 0.1)";

const TEXT_SHADOW_COLOR: &str = "rgba(0, 0, 0, 0.5)";

/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f64 = 0.6;
const TEXT_BOX_PADDING: f64 = 10.0;
/// Text box extent above and below the anchor point.
const TEXT_BOX_ASCENT: f64 = 30.0;
const TEXT_BOX_HEIGHT: f64 = 40.0;

const OVERLAY_FONT: &str = "12px monospace";
const OVERLAY_COLOR: &str = "#ffffff";
const OVERLAY_LINE_HEIGHT: f64 = 16.0;
const OVERLAY_MARGIN: f64 = 10.0;

/// Fixed compositor parameters for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorSettings {
    pub width: f64,
    pub height: f64,
    /// Solid background replacing the placeholder gradient.
    pub background_color: Option<String>,
    /// Draw the debug overlay in the top-left corner.
    pub show_debug_info: bool,
}

impl CompositorSettings {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background_color: None,
            show_debug_info: false,
        }
    }
}

/// Builds [`Frame`]s from editor snapshots.
#[derive(Debug, Clone)]
pub struct Compositor {
    settings: CompositorSettings,
}

impl Compositor {
    pub fn new(settings: CompositorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CompositorSettings {
        &self.settings
    }

    pub fn set_show_debug_info(&mut self, show: bool) {
        self.settings.show_debug_info = show;
    }

    /// Compose the frame for `state.playback.current_time`.
    pub fn compose(
        &self,
        state: &EditorState,
        media: &MediaResourceManager,
        primary: Option<&dyn MediaElement>,
    ) -> Frame {
        let CompositorSettings { width, height, .. } = self.settings;
        let time = state.playback.current_time;
        let mut frame = Frame::new(time, width, height);

        frame.push(DrawOp::Clear { width, height });
        self.draw_background(&mut frame, primary);

        for track in state.visible_tracks() {
            match &track.content {
                TrackContent::Video(visual) | TrackContent::Image(visual) => {
                    self.draw_visual(&mut frame, track, visual, media)
                }
                TrackContent::Text(_) => self.draw_text(&mut frame, track),
                // audio is scheduled elsewhere, never painted
                TrackContent::Audio(_) => {}
            }
        }

        if self.settings.show_debug_info {
            self.draw_overlay(&mut frame, &DebugOverlay::from_state(state));
        }

        frame
    }

    fn draw_background(&self, frame: &mut Frame, primary: Option<&dyn MediaElement>) {
        let (width, height) = (self.settings.width, self.settings.height);
        let full = Rect::new(0.0, 0.0, width, height);

        if let Some(element) = primary {
            if element.has_source() && element.ready_state() >= ReadyState::HaveCurrentData {
                frame.push(DrawOp::DrawMedia {
                    source: MediaHandle::Primary,
                    rect: full,
                });
                return;
            }
        }

        match &self.settings.background_color {
            Some(color) => frame.push(DrawOp::FillRect {
                color: color.clone(),
                rect: full,
            }),
            None => frame.push(DrawOp::FillGradient {
                gradient: LinearGradient {
                    from: (0.0, 0.0),
                    to: (width, height),
                    stops: vec![
                        (0.0, PLACEHOLDER_GRADIENT[0].to_string()),
                        (1.0, PLACEHOLDER_GRADIENT[1].to_string()),
                    ],
                },
                rect: full,
            }),
        }

        let mut x = 0.0;
        while x <= width {
            frame.push(grid_line((x, 0.0), (x, height)));
            x += GRID_SPACING;
        }
        let mut y = 0.0;
        while y <= height {
            frame.push(grid_line((0.0, y), (width, y)));
            y += GRID_SPACING;
        }
    }

    fn draw_visual(
        &self,
        frame: &mut Frame,
        track: &Track,
        visual: &VisualMetadata,
        media: &MediaResourceManager,
    ) {
        let Some(element) = media.element(&track.id) else {
            tracing::trace!(track = %track.id, "No media resource yet");
            return;
        };
        if !element.is_drawable() {
            tracing::trace!(track = %track.id, ready = ?element.ready_state(), "Media not ready");
            return;
        }

        let (source_width, source_height) = element.natural_size();
        let source = MediaHandle::Track(track.id.clone());
        let (width, height) = (self.settings.width, self.settings.height);

        match visual.layout {
            Layout::Fullscreen => {
                let Some(rect) = fit_rect(
                    visual.object_fit,
                    source_width as f64,
                    source_height as f64,
                    width,
                    height,
                ) else {
                    return;
                };
                frame.push(DrawOp::Save);
                frame.push(DrawOp::GlobalAlpha {
                    alpha: visual.opacity(),
                });
                frame.push(DrawOp::DrawMedia { source, rect });
                frame.push(DrawOp::Restore);
            }
            Layout::Custom => {
                let Some(transform) = visual.transform else {
                    return;
                };
                let t = transform.resolved(width, height);
                let (cx, cy) = t.rect().center();
                frame.push(DrawOp::Save);
                frame.push(DrawOp::GlobalAlpha { alpha: t.opacity });
                frame.push(DrawOp::Translate { x: cx, y: cy });
                frame.push(DrawOp::Rotate {
                    radians: t.rotation_radians(),
                });
                frame.push(DrawOp::Scale {
                    x: t.scale_x,
                    y: t.scale_y,
                });
                frame.push(DrawOp::DrawMedia {
                    source,
                    rect: Rect::new(-t.width / 2.0, -t.height / 2.0, t.width, t.height),
                });
                frame.push(DrawOp::Restore);
            }
        }
    }

    fn draw_text(&self, frame: &mut Frame, track: &Track) {
        let Some(meta) = track.text_metadata() else {
            return;
        };
        let size = meta
            .font_size
            .filter(|s| *s > 0.0)
            .unwrap_or(DEFAULT_FONT_SIZE);
        let family = meta.font_family.as_deref().unwrap_or(DEFAULT_FONT_FAMILY);
        let style = TextStyle {
            font: format!("{size}px {family}"),
            color: meta
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
            align: meta.text_align.unwrap_or_default(),
            baseline: meta.baseline.unwrap_or_default(),
            // boxed text sits on its own backdrop
            shadow: meta.background_color.is_none().then(|| Shadow {
                color: TEXT_SHADOW_COLOR.to_string(),
                blur: 4.0,
                offset_x: 2.0,
                offset_y: 2.0,
            }),
        };
        let text = meta.text.clone().unwrap_or_else(|| track.name.clone());
        let x = meta.x.unwrap_or(self.settings.width / 2.0);
        let y = meta.y.unwrap_or(self.settings.height / 2.0);

        frame.push(DrawOp::Save);
        if let Some(color) = &meta.background_color {
            let rect = text_box(x, y, measure_text(&text, size), style.align);
            frame.push(DrawOp::FillRect {
                color: color.clone(),
                rect,
            });
        }
        frame.push(DrawOp::FillText { text, x, y, style });
        frame.push(DrawOp::Restore);
    }

    fn draw_overlay(&self, frame: &mut Frame, overlay: &DebugOverlay) {
        let style = TextStyle {
            font: OVERLAY_FONT.to_string(),
            color: OVERLAY_COLOR.to_string(),
            align: TextAlign::Left,
            baseline: TextBaseline::Top,
            shadow: None,
        };
        frame.push(DrawOp::Save);
        for (i, line) in overlay.to_string().lines().enumerate() {
            frame.push(DrawOp::FillText {
                text: line.to_string(),
                x: OVERLAY_MARGIN,
                y: OVERLAY_MARGIN + i as f64 * OVERLAY_LINE_HEIGHT,
                style: style.clone(),
            });
        }
        frame.push(DrawOp::Restore);
    }
}

/// Approximate rendered width of `text`; no font metrics are available
/// while composing.
fn measure_text(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * GLYPH_ADVANCE
}

/// Padded box behind text of `width` anchored at `(x, y)`.
fn text_box(x: f64, y: f64, width: f64, align: TextAlign) -> Rect {
    let left = match align {
        TextAlign::Left => x,
        TextAlign::Center => x - width / 2.0,
        TextAlign::Right => x - width,
    };
    Rect::new(
        left - TEXT_BOX_PADDING,
        y - TEXT_BOX_ASCENT,
        width + TEXT_BOX_PADDING * 2.0,
        TEXT_BOX_HEIGHT,
    )
}

fn grid_line(from: (f64, f64), to: (f64, f64)) -> DrawOp {
    DrawOp::StrokeLine {
        from,
        to,
        color: GRID_COLOR.to_string(),
        width: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{SimulatedMedia, SimulatedMediaBackend};
    use cutframe_project_model::track::{TextMetadata, TrackId};
    use cutframe_project_model::transform::{ObjectFit, Transform};

    fn setup(tracks: Vec<Track>, time: f64) -> (EditorState, MediaResourceManager, SimulatedMediaBackend) {
        let mut state = EditorState::with_duration(10.0);
        state.tracks = tracks;
        state.playback.current_time = time;
        let backend = SimulatedMediaBackend::new().with_natural_size(1600, 900);
        let mut media = MediaResourceManager::new(Box::new(backend.clone()));
        media.sync(&state.tracks);
        (state, media, backend)
    }

    fn compositor() -> Compositor {
        Compositor::new(CompositorSettings::new(800.0, 450.0))
    }

    #[test]
    fn test_placeholder_background_has_gradient_and_grid() {
        let (state, media, _) = setup(vec![], 0.0);
        let frame = compositor().compose(&state, &media, None);

        assert!(matches!(frame.ops[0], DrawOp::Clear { .. }));
        assert!(matches!(frame.ops[1], DrawOp::FillGradient { .. }));
        let lines = frame
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::StrokeLine { .. }))
            .count();
        // 0..=800 step 50 and 0..=450 step 50
        assert_eq!(lines, 17 + 10);
    }

    #[test]
    fn test_background_color_replaces_gradient() {
        let (state, media, _) = setup(vec![], 0.0);
        let mut settings = CompositorSettings::new(800.0, 450.0);
        settings.background_color = Some("#000000".to_string());
        let frame = Compositor::new(settings).compose(&state, &media, None);
        assert!(matches!(&frame.ops[1], DrawOp::FillRect { color, .. } if color == "#000000"));
    }

    #[test]
    fn test_ready_primary_replaces_placeholder() {
        let (state, media, _) = setup(vec![], 0.0);
        let primary = SimulatedMedia::primary("main.mp4");
        let element: &dyn MediaElement = &primary;
        let frame = compositor().compose(&state, &media, Some(element));
        assert_eq!(frame.media_draws(), vec![&MediaHandle::Primary]);
        assert!(!frame.ops.iter().any(|op| matches!(op, DrawOp::StrokeLine { .. })));

        primary.set_ready_state(ReadyState::HaveMetadata);
        let frame = compositor().compose(&state, &media, Some(element));
        assert!(frame.media_draws().is_empty());
    }

    #[test]
    fn test_fullscreen_cover_is_centred() {
        let track = Track::video(
            "v",
            "V",
            0.0,
            5.0,
            "a.mp4",
            VisualMetadata::fullscreen(ObjectFit::Cover),
        );
        let (state, mut media, backend) = setup(vec![track], 1.0);
        // 4:3 source on a 16:9 canvas overflows vertically
        backend
            .element_for(&TrackId::from("v"))
            .unwrap()
            .set_natural_size(400, 300);
        media.sync(&state.tracks);

        let frame = compositor().compose(&state, &media, None);
        let rect = frame
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::DrawMedia { rect, .. } => Some(*rect),
                _ => None,
            })
            .unwrap();
        assert_eq!(rect.width, 800.0);
        assert!((rect.height - 600.0).abs() < 1e-9);
        assert!((rect.y + 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_layout_rotates_about_center() {
        let transform = Transform {
            x: 100.0,
            y: 50.0,
            width: 200.0,
            height: 100.0,
            scale_x: 2.0,
            scale_y: 1.0,
            rotation: 90.0,
            opacity: 0.5,
        };
        let track = Track::video("v", "V", 0.0, 5.0, "a.mp4", VisualMetadata::custom(transform));
        let (state, media, _) = setup(vec![track], 1.0);
        let frame = compositor().compose(&state, &media, None);

        let start = frame
            .ops
            .iter()
            .position(|op| matches!(op, DrawOp::GlobalAlpha { .. }))
            .unwrap();
        let ops = &frame.ops[start..start + 6];
        assert_eq!(ops[0], DrawOp::GlobalAlpha { alpha: 0.5 });
        assert_eq!(ops[1], DrawOp::Translate { x: 200.0, y: 100.0 });
        assert!(
            matches!(ops[2], DrawOp::Rotate { radians } if (radians - std::f64::consts::FRAC_PI_2).abs() < 1e-12)
        );
        assert_eq!(ops[3], DrawOp::Scale { x: 2.0, y: 1.0 });
        assert_eq!(
            ops[4],
            DrawOp::DrawMedia {
                source: MediaHandle::Track(TrackId::from("v")),
                rect: Rect::new(-100.0, -50.0, 200.0, 100.0),
            }
        );
        assert_eq!(ops[5], DrawOp::Restore);
    }

    #[test]
    fn test_custom_layout_without_transform_draws_nothing() {
        let visual = VisualMetadata {
            layout: Layout::Custom,
            ..VisualMetadata::default()
        };
        let track = Track::video("v", "V", 0.0, 5.0, "a.mp4", visual);
        let (state, media, _) = setup(vec![track], 1.0);
        let frame = compositor().compose(&state, &media, None);
        assert!(frame.media_draws().is_empty());
    }

    #[test]
    fn test_unready_media_is_skipped() {
        let track = Track::video("v", "V", 0.0, 5.0, "a.mp4", VisualMetadata::default());
        let (state, media, backend) = setup(vec![track], 1.0);
        let element = backend.element_for(&TrackId::from("v")).unwrap();

        element.set_ready_state(ReadyState::HaveNothing);
        assert!(compositor().compose(&state, &media, None).media_draws().is_empty());

        element.set_ready_state(ReadyState::HaveMetadata);
        element.set_natural_size(0, 720);
        assert!(compositor().compose(&state, &media, None).media_draws().is_empty());

        element.set_natural_size(1280, 720);
        assert_eq!(compositor().compose(&state, &media, None).media_draws().len(), 1);
    }

    #[test]
    fn test_text_falls_back_to_defaults_and_name() {
        let track = Track::text("t", "Caption", 0.0, 5.0, TextMetadata::default());
        let (state, media, _) = setup(vec![track], 1.0);
        let frame = compositor().compose(&state, &media, None);

        let (text, x, y, style) = frame
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::FillText { text, x, y, style } => Some((text, *x, *y, style)),
                _ => None,
            })
            .unwrap();
        assert_eq!(text, "Caption");
        assert_eq!((x, y), (400.0, 225.0));
        assert_eq!(style.font, "32px Arial");
        assert_eq!(style.color, "#ffffff");
        assert_eq!(style.align, TextAlign::Center);
        assert_eq!(style.baseline, TextBaseline::Middle);
        assert_eq!(style.shadow.as_ref().unwrap().blur, 4.0);
    }

    #[test]
    fn test_text_background_box_is_drawn_first() {
        let meta = TextMetadata {
            font_size: Some(24.0),
            x: Some(400.0),
            y: Some(400.0),
            background_color: Some("rgba(0, 0, 0, 0.8)".to_string()),
            ..TextMetadata::with_text("Hello")
        };
        let track = Track::text("t", "T", 0.0, 5.0, meta);
        let (state, media, _) = setup(vec![track], 1.0);
        let frame = compositor().compose(&state, &media, None);

        let at = frame
            .ops
            .iter()
            .position(|op| matches!(op, DrawOp::FillText { .. }))
            .unwrap();
        let width = measure_text("Hello", 24.0);
        assert!((width - 72.0).abs() < 1e-9);
        assert_eq!(
            frame.ops[at - 1],
            DrawOp::FillRect {
                color: "rgba(0, 0, 0, 0.8)".to_string(),
                rect: Rect::new(400.0 - width / 2.0 - 10.0, 370.0, width + 20.0, 40.0),
            }
        );
        match &frame.ops[at] {
            DrawOp::FillText { style, .. } => assert!(style.shadow.is_none()),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_text_box_follows_alignment() {
        assert_eq!(text_box(100.0, 50.0, 60.0, TextAlign::Left).x, 90.0);
        assert_eq!(text_box(100.0, 50.0, 60.0, TextAlign::Right).x, 30.0);
        assert_eq!(measure_text("", 24.0), 0.0);
    }

    #[test]
    fn test_text_position_zero_is_respected() {
        let meta = TextMetadata {
            x: Some(0.0),
            y: Some(0.0),
            ..TextMetadata::with_text("corner")
        };
        let track = Track::text("t", "T", 0.0, 5.0, meta);
        let (state, media, _) = setup(vec![track], 1.0);
        let frame = compositor().compose(&state, &media, None);
        assert!(frame
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::FillText { x, y, .. } if *x == 0.0 && *y == 0.0)));
    }

    #[test]
    fn test_audio_and_disabled_tracks_are_not_painted() {
        use cutframe_project_model::track::AudioMetadata;
        let tracks = vec![
            Track::audio("a", "A", 0.0, 5.0, "song.mp3", AudioMetadata::default()),
            Track::text("t", "T", 0.0, 5.0, TextMetadata::with_text("hidden")).disabled(),
        ];
        let (state, media, _) = setup(tracks, 1.0);
        let frame = compositor().compose(&state, &media, None);
        assert!(frame.texts().is_empty());
        assert!(frame.media_draws().is_empty());
    }

    #[test]
    fn test_debug_overlay_is_drawn_when_enabled() {
        let (state, media, _) = setup(vec![], 2.34);
        let mut compositor = compositor();
        compositor.set_show_debug_info(true);
        let frame = compositor.compose(&state, &media, None);
        assert_eq!(
            frame.texts(),
            vec!["Time: 2.3s", "Duration: 10.0s", "Playing: No", "Tracks: 0"]
        );
    }
}
