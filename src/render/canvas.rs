//! Immediate-mode 2D drawing target
//!
//! Both render modes draw through `Canvas` in viewport-local coordinates
//! (origin top-left, Y down). `PainterCanvas` forwards to egui; the
//! `RecordingCanvas` keeps a list of operations for the headless CLI loop
//! and tests.

use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2};

/// Samples per quadratic segment when flattening paths
const QUAD_SAMPLES: usize = 8;

pub trait Canvas {
    /// Viewport size in logical points
    fn viewport(&self) -> Vec2;

    fn fill_rect(&mut self, rect: Rect, color: Color32);
    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);
    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke);
    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32);
    /// Disc whose color fades from `inner` at the center to `outer` at `radius`
    fn radial_gradient(&mut self, center: Pos2, radius: f32, inner: Color32, outer: Color32);
    fn fill_path(&mut self, path: &Path, color: Color32);
    fn stroke_path(&mut self, path: &Path, stroke: Stroke);
    fn text(&mut self, pos: Pos2, align: Align2, text: &str, font: FontId, color: Color32);

    /// Global alpha applied to every subsequent operation
    fn set_alpha(&mut self, alpha: f32);
    fn alpha(&self) -> f32;

    /// Fill the whole viewport
    fn clear(&mut self, color: Color32) {
        let rect = Rect::from_min_size(Pos2::ZERO, self.viewport());
        self.fill_rect(rect, color);
    }
}

// ============================================================================
// Path
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Segment {
    MoveTo(Pos2),
    LineTo(Pos2),
    QuadTo { ctrl: Pos2, to: Pos2 },
    Close,
}

/// Path made of lines and quadratic curves
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
}

/// One flattened sub-path
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    pub points: Vec<Pos2>,
    pub closed: bool,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Pos2) -> &mut Self {
        self.segments.push(Segment::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: Pos2) -> &mut Self {
        self.segments.push(Segment::LineTo(p));
        self
    }

    pub fn quad_to(&mut self, ctrl: Pos2, to: Pos2) -> &mut Self {
        self.segments.push(Segment::QuadTo { ctrl, to });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.segments.push(Segment::Close);
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Convert to polylines, sampling quadratic curves.
    pub fn flatten(&self) -> Vec<Polyline> {
        let mut out = Vec::new();
        let mut current: Vec<Pos2> = Vec::new();

        let finish = |current: &mut Vec<Pos2>, closed: bool, out: &mut Vec<Polyline>| {
            if current.len() >= 2 {
                out.push(Polyline {
                    points: std::mem::take(current),
                    closed,
                });
            } else {
                current.clear();
            }
        };

        for segment in &self.segments {
            match *segment {
                Segment::MoveTo(p) => {
                    finish(&mut current, false, &mut out);
                    current.push(p);
                }
                Segment::LineTo(p) => current.push(p),
                Segment::QuadTo { ctrl, to } => {
                    let from = current.last().copied().unwrap_or(ctrl);
                    for i in 1..=QUAD_SAMPLES {
                        let t = i as f32 / QUAD_SAMPLES as f32;
                        current.push(quadratic_point(from, ctrl, to, t));
                    }
                }
                Segment::Close => finish(&mut current, true, &mut out),
            }
        }
        finish(&mut current, false, &mut out);
        out
    }
}

#[inline]
fn quadratic_point(from: Pos2, ctrl: Pos2, to: Pos2, t: f32) -> Pos2 {
    let omt = 1.0 - t;
    Pos2::new(
        from.x * (omt * omt) + ctrl.x * (2.0 * omt * t) + to.x * (t * t),
        from.y * (omt * omt) + ctrl.y * (2.0 * omt * t) + to.y * (t * t),
    )
}

/// Rounded rectangle outline with quadratic corners.
///
/// The radius is clamped to half the shorter side.
pub fn round_rect(rect: Rect, radius: f32) -> Path {
    let r = radius.max(0.0).min(rect.width() * 0.5).min(rect.height() * 0.5);
    let (x, y, w, h) = (rect.min.x, rect.min.y, rect.width(), rect.height());

    let mut path = Path::new();
    path.move_to(Pos2::new(x + r, y))
        .line_to(Pos2::new(x + w - r, y))
        .quad_to(Pos2::new(x + w, y), Pos2::new(x + w, y + r))
        .line_to(Pos2::new(x + w, y + h - r))
        .quad_to(Pos2::new(x + w, y + h), Pos2::new(x + w - r, y + h))
        .line_to(Pos2::new(x + r, y + h))
        .quad_to(Pos2::new(x, y + h), Pos2::new(x, y + h - r))
        .line_to(Pos2::new(x, y + r))
        .quad_to(Pos2::new(x, y), Pos2::new(x + r, y))
        .close();
    path
}

// ============================================================================
// RecordingCanvas
// ============================================================================

/// A recorded drawing operation, alpha already folded into the color
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    FillRect { rect: Rect, color: Color32 },
    StrokeRect { rect: Rect, stroke: Stroke },
    Line { from: Pos2, to: Pos2, stroke: Stroke },
    Circle { center: Pos2, radius: f32, color: Color32 },
    Gradient { center: Pos2, radius: f32, inner: Color32, outer: Color32 },
    FillPath { path: Path, color: Color32 },
    StrokePath { path: Path, stroke: Stroke },
    Text { pos: Pos2, align: Align2, text: String, color: Color32 },
}

/// Headless drawing target that records every operation.
#[derive(Debug)]
pub struct RecordingCanvas {
    size: Vec2,
    alpha: f32,
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            alpha: 1.0,
            ops: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    /// Drop recorded ops, keeping size and alpha
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// All text drawn so far
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[inline]
    fn tint(&self, color: Color32) -> Color32 {
        color.gamma_multiply(self.alpha)
    }
}

impl Canvas for RecordingCanvas {
    fn viewport(&self) -> Vec2 {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        let color = self.tint(color);
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        let stroke = Stroke::new(stroke.width, self.tint(stroke.color));
        self.ops.push(DrawOp::StrokeRect { rect, stroke });
    }

    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) {
        let stroke = Stroke::new(stroke.width, self.tint(stroke.color));
        self.ops.push(DrawOp::Line { from, to, stroke });
    }

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        let color = self.tint(color);
        self.ops.push(DrawOp::Circle { center, radius, color });
    }

    fn radial_gradient(&mut self, center: Pos2, radius: f32, inner: Color32, outer: Color32) {
        let (inner, outer) = (self.tint(inner), self.tint(outer));
        self.ops.push(DrawOp::Gradient {
            center,
            radius,
            inner,
            outer,
        });
    }

    fn fill_path(&mut self, path: &Path, color: Color32) {
        let color = self.tint(color);
        self.ops.push(DrawOp::FillPath {
            path: path.clone(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &Path, stroke: Stroke) {
        let stroke = Stroke::new(stroke.width, self.tint(stroke.color));
        self.ops.push(DrawOp::StrokePath {
            path: path.clone(),
            stroke,
        });
    }

    fn text(&mut self, pos: Pos2, align: Align2, text: &str, _font: FontId, color: Color32) {
        let color = self.tint(color);
        self.ops.push(DrawOp::Text {
            pos,
            align,
            text: text.to_string(),
            color,
        });
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }
}
