//! The 2D drawing seam and composited frames as data.

use cutframe_common::error::CutframeResult;
use cutframe_project_model::track::{TextAlign, TextBaseline};
use cutframe_project_model::transform::Rect;
use serde::{Deserialize, Serialize};

use crate::media::MediaHandle;

/// A linear gradient between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearGradient {
    pub from: (f64, f64),
    pub to: (f64, f64),
    /// `(offset, colour)` pairs with offsets in `[0, 1]`.
    pub stops: Vec<(f64, String)>,
}

/// Drop shadow applied to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: String,
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Resolved text style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// CSS font shorthand, e.g. `32px Arial`.
    pub font: String,
    pub color: String,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    pub shadow: Option<Shadow>,
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Clear { width: f64, height: f64 },
    Save,
    Restore,
    GlobalAlpha { alpha: f64 },
    Translate { x: f64, y: f64 },
    Rotate { radians: f64 },
    Scale { x: f64, y: f64 },
    FillGradient { gradient: LinearGradient, rect: Rect },
    FillRect { color: String, rect: Rect },
    StrokeLine { from: (f64, f64), to: (f64, f64), color: String, width: f64 },
    DrawMedia { source: MediaHandle, rect: Rect },
    FillText { text: String, x: f64, y: f64, style: TextStyle },
}

/// Subset of a 2D rendering context.
pub trait Canvas {
    fn clear(&mut self, width: f64, height: f64);
    fn save(&mut self);
    fn restore(&mut self);
    fn set_global_alpha(&mut self, alpha: f64);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, radians: f64);
    fn scale(&mut self, x: f64, y: f64);
    fn fill_gradient(&mut self, gradient: &LinearGradient, rect: Rect);
    fn fill_rect(&mut self, color: &str, rect: Rect);
    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: &str, width: f64);
    fn draw_media(&mut self, source: &MediaHandle, rect: Rect);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);
}

/// A composited frame: the ordered draw list for one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub time: f64,
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

impl Frame {
    pub fn new(time: f64, width: f64, height: f64) -> Self {
        Self {
            time,
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Replay every operation onto `canvas`.
    pub fn paint(&self, canvas: &mut dyn Canvas) {
        for op in &self.ops {
            match op {
                DrawOp::Clear { width, height } => canvas.clear(*width, *height),
                DrawOp::Save => canvas.save(),
                DrawOp::Restore => canvas.restore(),
                DrawOp::GlobalAlpha { alpha } => canvas.set_global_alpha(*alpha),
                DrawOp::Translate { x, y } => canvas.translate(*x, *y),
                DrawOp::Rotate { radians } => canvas.rotate(*radians),
                DrawOp::Scale { x, y } => canvas.scale(*x, *y),
                DrawOp::FillGradient { gradient, rect } => canvas.fill_gradient(gradient, *rect),
                DrawOp::FillRect { color, rect } => canvas.fill_rect(color, *rect),
                DrawOp::StrokeLine {
                    from,
                    to,
                    color,
                    width,
                } => canvas.stroke_line(*from, *to, color, *width),
                DrawOp::DrawMedia { source, rect } => canvas.draw_media(source, *rect),
                DrawOp::FillText { text, x, y, style } => canvas.fill_text(text, *x, *y, style),
            }
        }
    }

    /// Media sources drawn, in paint order.
    pub fn media_draws(&self) -> Vec<&MediaHandle> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::DrawMedia { source, .. } => Some(source),
                _ => None,
            })
            .collect()
    }

    /// Text drawn, in paint order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn to_json(&self) -> CutframeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A canvas that records every call as a [`DrawOp`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, width: f64, height: f64) {
        self.ops.push(DrawOp::Clear { width, height });
    }

    fn save(&mut self) {
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(DrawOp::Restore);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ops.push(DrawOp::GlobalAlpha { alpha });
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::Translate { x, y });
    }

    fn rotate(&mut self, radians: f64) {
        self.ops.push(DrawOp::Rotate { radians });
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::Scale { x, y });
    }

    fn fill_gradient(&mut self, gradient: &LinearGradient, rect: Rect) {
        self.ops.push(DrawOp::FillGradient {
            gradient: gradient.clone(),
            rect,
        });
    }

    fn fill_rect(&mut self, color: &str, rect: Rect) {
        self.ops.push(DrawOp::FillRect {
            color: color.to_string(),
            rect,
        });
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: &str, width: f64) {
        self.ops.push(DrawOp::StrokeLine {
            from,
            to,
            color: color.to_string(),
            width,
        });
    }

    fn draw_media(&mut self, source: &MediaHandle, rect: Rect) {
        self.ops.push(DrawOp::DrawMedia {
            source: source.clone(),
            rect,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        self.ops.push(DrawOp::FillText {
            text: text.to_string(),
            x,
            y,
            style: style.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutframe_project_model::track::TrackId;

    #[test]
    fn test_paint_replays_in_order() {
        let mut frame = Frame::new(1.0, 100.0, 50.0);
        frame.push(DrawOp::Clear {
            width: 100.0,
            height: 50.0,
        });
        frame.push(DrawOp::Save);
        frame.push(DrawOp::DrawMedia {
            source: MediaHandle::Track(TrackId::from("v")),
            rect: Rect::new(0.0, 0.0, 100.0, 50.0),
        });
        frame.push(DrawOp::Restore);

        let mut canvas = RecordingCanvas::new();
        frame.paint(&mut canvas);
        assert_eq!(canvas.ops, frame.ops);
    }

    #[test]
    fn test_frame_json_is_tagged() {
        let mut frame = Frame::new(0.0, 10.0, 10.0);
        frame.push(DrawOp::GlobalAlpha { alpha: 0.5 });
        frame.push(DrawOp::DrawMedia {
            source: MediaHandle::Primary,
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
        });

        let value: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(value["ops"][0]["op"], "global_alpha");
        assert_eq!(value["ops"][1]["op"], "draw_media");
        assert_eq!(value["ops"][1]["source"], "primary");
    }
}
