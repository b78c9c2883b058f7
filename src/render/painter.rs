//! egui-backed drawing target
//!
//! Translates viewport-local coordinates into the painter's screen rect and
//! folds the global alpha into every color.

use std::f32::consts::TAU;

use egui::{Align2, Color32, FontId, Mesh, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use super::canvas::{Canvas, Path};

/// Fan segments used for radial gradients
const GRADIENT_SEGMENTS: u32 = 48;

pub struct PainterCanvas<'a> {
    painter: &'a Painter,
    origin: Vec2,
    size: Vec2,
    alpha: f32,
}

impl<'a> PainterCanvas<'a> {
    /// Canvas covering `rect` of `painter`. The rect is re-read every frame,
    /// so window resizes apply to the next draw.
    pub fn new(painter: &'a Painter, rect: Rect) -> Self {
        Self {
            painter,
            origin: rect.min.to_vec2(),
            size: rect.size(),
            alpha: 1.0,
        }
    }

    /// Convert a screen position (e.g. the egui pointer) to canvas space
    pub fn to_local(&self, screen: Pos2) -> Pos2 {
        screen - self.origin
    }

    #[inline]
    fn screen(&self, p: Pos2) -> Pos2 {
        p + self.origin
    }

    #[inline]
    fn tint(&self, color: Color32) -> Color32 {
        if self.alpha >= 1.0 {
            color
        } else {
            color.gamma_multiply(self.alpha)
        }
    }

    #[inline]
    fn tint_stroke(&self, stroke: Stroke) -> Stroke {
        Stroke::new(stroke.width, self.tint(stroke.color))
    }
}

impl Canvas for PainterCanvas<'_> {
    fn viewport(&self) -> Vec2 {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        let rect = rect.translate(self.origin);
        self.painter.rect_filled(rect, 0.0, self.tint(color));
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        let rect = rect.translate(self.origin);
        self.painter
            .rect_stroke(rect, 0.0, self.tint_stroke(stroke), egui::StrokeKind::Middle);
    }

    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) {
        self.painter
            .line_segment([self.screen(from), self.screen(to)], self.tint_stroke(stroke));
    }

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        self.painter
            .circle_filled(self.screen(center), radius, self.tint(color));
    }

    fn radial_gradient(&mut self, center: Pos2, radius: f32, inner: Color32, outer: Color32) {
        let center = self.screen(center);
        let (inner, outer) = (self.tint(inner), self.tint(outer));

        // Triangle fan: center vertex carries `inner`, rim carries `outer`
        let mut mesh = Mesh::default();
        mesh.colored_vertex(center, inner);
        for i in 0..=GRADIENT_SEGMENTS {
            let angle = (i as f32 / GRADIENT_SEGMENTS as f32) * TAU;
            mesh.colored_vertex(center + egui::vec2(angle.cos(), angle.sin()) * radius, outer);
        }
        for i in 1..=GRADIENT_SEGMENTS {
            mesh.add_triangle(0, i, i + 1);
        }
        self.painter.add(Shape::mesh(mesh));
    }

    fn fill_path(&mut self, path: &Path, color: Color32) {
        let color = self.tint(color);
        for polyline in path.flatten() {
            let points = polyline.points.into_iter().map(|p| self.screen(p)).collect();
            self.painter
                .add(Shape::convex_polygon(points, color, Stroke::NONE));
        }
    }

    fn stroke_path(&mut self, path: &Path, stroke: Stroke) {
        let stroke = self.tint_stroke(stroke);
        for polyline in path.flatten() {
            let points: Vec<Pos2> = polyline.points.into_iter().map(|p| self.screen(p)).collect();
            if polyline.closed {
                self.painter.add(Shape::closed_line(points, stroke));
            } else {
                self.painter.add(Shape::line(points, stroke));
            }
        }
    }

    fn text(&mut self, pos: Pos2, align: Align2, text: &str, font: FontId, color: Color32) {
        self.painter
            .text(self.screen(pos), align, text, font, self.tint(color));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }
}
