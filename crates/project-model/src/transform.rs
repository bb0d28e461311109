//! Placement geometry for visual tracks.
//!
//! A visual track is laid out either fullscreen (the source is fitted to
//! the canvas through an [`ObjectFit`] policy) or custom (an explicit
//! [`Transform`] positions, scales and rotates it).

use serde::{Deserialize, Serialize};

/// Placement policy for video and image tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Fit the source to the whole canvas.
    #[default]
    Fullscreen,
    /// Use the track's [`Transform`].
    Custom,
}

/// How a fullscreen source maps onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectFit {
    /// Stretch to the canvas, ignoring aspect ratio.
    Fill,
    /// Letterbox: the whole source is visible.
    Contain,
    /// Crop: the canvas is fully covered.
    #[default]
    Cover,
    /// Natural size, centred.
    None,
    /// The smaller of `None` and `Contain`.
    ScaleDown,
}

/// An axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The center point of this rectangle.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Affine placement for a custom-layout track.
///
/// Rotation and scale are applied about the element's own center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    /// Left edge in canvas pixels.
    pub x: f64,
    /// Top edge in canvas pixels.
    pub y: f64,
    /// Width in canvas pixels (0 means canvas width).
    pub width: f64,
    /// Height in canvas pixels (0 means canvas height).
    pub height: f64,
    #[serde(default = "unit")]
    pub scale_x: f64,
    #[serde(default = "unit")]
    pub scale_y: f64,
    /// Clockwise rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Opacity in `[0.0, 1.0]`.
    #[serde(default = "unit")]
    pub opacity: f64,
}

fn unit() -> f64 {
    1.0
}

impl Transform {
    /// An unrotated, unscaled, opaque transform covering `width x height` at the origin.
    pub fn identity(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            opacity: 1.0,
        }
    }

    /// Fill unset (zero) fields with their fallbacks for a canvas of the given size.
    pub fn resolved(&self, canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            x: self.x,
            y: self.y,
            width: non_zero_or(self.width, canvas_width),
            height: non_zero_or(self.height, canvas_height),
            scale_x: non_zero_or(self.scale_x, 1.0),
            scale_y: non_zero_or(self.scale_y, 1.0),
            rotation: self.rotation,
            opacity: clamp_opacity(self.opacity),
        }
    }

    /// Unrotated bounding box before scaling.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Rotation in radians.
    pub fn rotation_radians(&self) -> f64 {
        self.rotation.to_radians()
    }

    /// Return a copy with `patch` merged over it.
    pub fn merged(&self, patch: &TransformPatch) -> Self {
        Self {
            x: patch.x.unwrap_or(self.x),
            y: patch.y.unwrap_or(self.y),
            width: patch.width.unwrap_or(self.width),
            height: patch.height.unwrap_or(self.height),
            scale_x: patch.scale_x.unwrap_or(self.scale_x),
            scale_y: patch.scale_y.unwrap_or(self.scale_y),
            rotation: patch.rotation.unwrap_or(self.rotation),
            opacity: patch.opacity.map(clamp_opacity).unwrap_or(self.opacity),
        }
    }
}

/// Partial update for a [`Transform`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub rotation: Option<f64>,
    pub opacity: Option<f64>,
}

impl TransformPatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn rotation(degrees: f64) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }

    pub fn opacity(opacity: f64) -> Self {
        Self {
            opacity: Some(opacity),
            ..Self::default()
        }
    }
}

/// Compute where a `source_width x source_height` frame lands on the canvas
/// under `fit`. The overflowing or underflowing axis is centred.
///
/// Returns `None` when any dimension is zero or not finite.
pub fn fit_rect(
    fit: ObjectFit,
    source_width: f64,
    source_height: f64,
    canvas_width: f64,
    canvas_height: f64,
) -> Option<Rect> {
    let dims = [source_width, source_height, canvas_width, canvas_height];
    if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
        return None;
    }

    let source_aspect = source_width / source_height;
    let canvas_aspect = canvas_width / canvas_height;

    let (width, height) = match fit {
        ObjectFit::Fill => (canvas_width, canvas_height),
        ObjectFit::Cover => {
            if source_aspect > canvas_aspect {
                (canvas_height * source_aspect, canvas_height)
            } else {
                (canvas_width, canvas_width / source_aspect)
            }
        }
        ObjectFit::Contain => contain_size(source_aspect, canvas_aspect, canvas_width, canvas_height),
        ObjectFit::None => (source_width, source_height),
        ObjectFit::ScaleDown => {
            let (cw, ch) = contain_size(source_aspect, canvas_aspect, canvas_width, canvas_height);
            if source_width <= cw {
                (source_width, source_height)
            } else {
                (cw, ch)
            }
        }
    };

    Some(Rect::new(
        (canvas_width - width) / 2.0,
        (canvas_height - height) / 2.0,
        width,
        height,
    ))
}

fn contain_size(source_aspect: f64, canvas_aspect: f64, canvas_width: f64, canvas_height: f64) -> (f64, f64) {
    if source_aspect > canvas_aspect {
        (canvas_width, canvas_width / source_aspect)
    } else {
        (canvas_height * source_aspect, canvas_height)
    }
}

fn non_zero_or(value: f64, fallback: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        fallback
    } else {
        value
    }
}

fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        1.0
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_cover_wide_source_crops_sides() {
        // 2:1 source onto 16:9 canvas
        let r = fit_rect(ObjectFit::Cover, 200.0, 100.0, 1600.0, 900.0).unwrap();
        assert!(approx(r.height, 900.0));
        assert!(approx(r.width, 1800.0));
        assert!(approx(r.x, -100.0));
        assert!(approx(r.y, 0.0));
    }

    #[test]
    fn test_cover_tall_source_crops_top_bottom() {
        let r = fit_rect(ObjectFit::Cover, 100.0, 100.0, 1600.0, 900.0).unwrap();
        assert!(approx(r.width, 1600.0));
        assert!(approx(r.height, 1600.0));
        assert!(approx(r.y, -350.0));
    }

    #[test]
    fn test_contain_letterboxes() {
        let r = fit_rect(ObjectFit::Contain, 200.0, 100.0, 1600.0, 900.0).unwrap();
        assert!(approx(r.width, 1600.0));
        assert!(approx(r.height, 800.0));
        assert!(approx(r.y, 50.0));

        let r = fit_rect(ObjectFit::Contain, 100.0, 100.0, 1600.0, 900.0).unwrap();
        assert!(approx(r.width, 900.0));
        assert!(approx(r.x, 350.0));
    }

    #[test]
    fn test_fill_and_none() {
        let r = fit_rect(ObjectFit::Fill, 10.0, 30.0, 800.0, 450.0).unwrap();
        assert_eq!(r, Rect::new(0.0, 0.0, 800.0, 450.0));

        let r = fit_rect(ObjectFit::None, 100.0, 50.0, 800.0, 450.0).unwrap();
        assert_eq!(r, Rect::new(350.0, 200.0, 100.0, 50.0));
    }

    #[test]
    fn test_scale_down_picks_smaller() {
        let small = fit_rect(ObjectFit::ScaleDown, 100.0, 50.0, 800.0, 450.0).unwrap();
        assert!(approx(small.width, 100.0));

        let large = fit_rect(ObjectFit::ScaleDown, 4000.0, 2000.0, 800.0, 450.0).unwrap();
        assert!(approx(large.width, 800.0));
        assert!(approx(large.height, 400.0));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(fit_rect(ObjectFit::Cover, 0.0, 100.0, 800.0, 450.0).is_none());
        assert!(fit_rect(ObjectFit::Cover, 100.0, 100.0, 800.0, 0.0).is_none());
    }

    #[test]
    fn test_resolved_fallbacks() {
        let t = Transform {
            x: 10.0,
            y: 20.0,
            width: 0.0,
            height: 0.0,
            scale_x: 0.0,
            scale_y: 2.0,
            rotation: 90.0,
            opacity: 3.0,
        }
        .resolved(800.0, 450.0);
        assert_eq!(t.width, 800.0);
        assert_eq!(t.height, 450.0);
        assert_eq!(t.scale_x, 1.0);
        assert_eq!(t.scale_y, 2.0);
        assert_eq!(t.opacity, 1.0);
        assert!(approx(t.rotation_radians(), std::f64::consts::FRAC_PI_2));
    }

    #[test]
    fn test_merge_patch() {
        let t = Transform::identity(400.0, 300.0);
        let moved = t.merged(&TransformPatch::position(5.0, 6.0));
        assert_eq!((moved.x, moved.y), (5.0, 6.0));
        assert_eq!(moved.width, 400.0);

        let faded = t.merged(&TransformPatch::opacity(-1.0));
        assert_eq!(faded.opacity, 0.0);
    }

    #[test]
    fn test_transform_json_defaults() {
        let t: Transform =
            serde_json::from_str(r#"{"x": 1, "y": 2, "width": 3, "height": 4}"#).unwrap();
        assert_eq!(t.scale_x, 1.0);
        assert_eq!(t.scale_y, 1.0);
        assert_eq!(t.rotation, 0.0);
        assert_eq!(t.opacity, 1.0);
    }
}
