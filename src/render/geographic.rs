//! Geographic mode: equirectangular world map
//!
//! The map is a 2:1 rectangle centered in the viewport, at most 800 points
//! wide. Events outside it are not drawn and cannot be hovered.

use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2};
use tracing::trace;

use super::canvas::Canvas;
use super::tooltip::{draw_tooltip, TooltipStyle};
use super::{pick_hovered, FrameReport, Hovered, Marker, RenderMode};
use crate::core::Quake;
use crate::theme::{colors, magnitude_color, rgba};

/// Widest the map gets, in points
pub const MAX_MAP_WIDTH: f32 = 800.0;
/// Fraction of the viewport width used by the map below the max
pub const MAP_WIDTH_FACTOR: f32 = 0.8;

const PULSE_SPEED: f64 = 0.02;
const GRID_STEP_DEG: i32 = 30;

/// Placement of the map inside the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapFrame {
    pub center: Pos2,
    pub size: Vec2,
}

impl MapFrame {
    pub fn for_viewport(viewport: Vec2) -> Self {
        let width = (viewport.x * MAP_WIDTH_FACTOR).min(MAX_MAP_WIDTH);
        Self {
            center: (viewport * 0.5).to_pos2(),
            size: Vec2::new(width, width / 2.0),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.center, self.size)
    }

    /// Screen X of a longitude, unclamped
    #[inline]
    pub fn x_of(&self, longitude: f32) -> f32 {
        self.center.x + longitude * self.size.x / 360.0
    }

    /// Screen Y of a latitude, north up
    #[inline]
    pub fn y_of(&self, latitude: f32) -> f32 {
        self.center.y - latitude * self.size.y / 180.0
    }

    /// Project to screen. None when the result falls outside the map or is not finite.
    pub fn project(&self, longitude: f32, latitude: f32) -> Option<Pos2> {
        let pos = Pos2::new(self.x_of(longitude), self.y_of(latitude));
        if !(pos.x.is_finite() && pos.y.is_finite()) {
            return None;
        }
        self.rect().contains(pos).then_some(pos)
    }
}

/// Opacity factor in [0.4, 1.0], phase-shifted by magnitude
#[inline]
pub fn pulse(tick: u64, magnitude: f32) -> f32 {
    ((tick as f64 * PULSE_SPEED + magnitude as f64).sin() * 0.3 + 0.7) as f32
}

#[inline]
pub fn marker_size(magnitude: f32) -> f32 {
    magnitude * 2.5 + 2.0
}

#[inline]
pub fn hit_radius(magnitude: f32) -> f32 {
    2.0 * marker_size(magnitude)
}

fn east_west(lon: i32) -> String {
    let hemisphere = if lon > 0 { 'E' } else { 'W' };
    format!("{}°{hemisphere}", lon.abs())
}

fn north_south(lat: i32) -> String {
    let hemisphere = if lat > 0 { 'N' } else { 'S' };
    format!("{}°{hemisphere}", lat.abs())
}

#[derive(Default)]
pub struct GeographicMode {
    tick: u64,
    hovered: Option<Hovered>,
}

impl GeographicMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(&self, index: usize, quake: &Quake, frame: &MapFrame) -> Option<Marker> {
        if !quake.magnitude.is_finite() {
            trace!(index, "Skipping quake with non-finite magnitude");
            return None;
        }
        let pos = frame.project(quake.longitude(), quake.latitude())?;
        Some(Marker {
            index,
            pos,
            hit_radius: hit_radius(quake.magnitude),
        })
    }

    fn draw_map(canvas: &mut dyn Canvas, frame: &MapFrame) {
        let rect = frame.rect();
        canvas.fill_rect(rect, rgba(20, 40, 80, 0.1));
        canvas.stroke_rect(rect, Stroke::new(2.0, rgba(140, 160, 200, 0.6)));

        let grid = Stroke::new(0.8, rgba(100, 120, 180, 0.3));
        let label_color = rgba(200, 200, 255, 0.8);
        let label_font = FontId::proportional(10.0);

        for lon in (-180..=180).step_by(GRID_STEP_DEG as usize) {
            let x = frame.x_of(lon as f32);
            canvas.line(Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom()), grid);
            if lon != 0 {
                canvas.text(
                    Pos2::new(x, rect.bottom() + 15.0),
                    Align2::CENTER_BOTTOM,
                    &east_west(lon),
                    label_font.clone(),
                    label_color,
                );
            }
        }

        for lat in (-60..=60).step_by(GRID_STEP_DEG as usize) {
            let y = frame.y_of(lat as f32);
            canvas.line(Pos2::new(rect.left(), y), Pos2::new(rect.right(), y), grid);
            if lat != 0 {
                canvas.text(
                    Pos2::new(rect.left() - 5.0, y),
                    Align2::RIGHT_CENTER,
                    &north_south(lat),
                    label_font.clone(),
                    label_color,
                );
            }
        }

        // Equator and prime meridian
        let highlight = Stroke::new(1.5, rgba(120, 180, 255, 0.8));
        let (cx, cy) = (frame.center.x, frame.center.y);
        canvas.line(Pos2::new(rect.left(), cy), Pos2::new(rect.right(), cy), highlight);
        canvas.line(Pos2::new(cx, rect.top()), Pos2::new(cx, rect.bottom()), highlight);

        let title_color = rgba(180, 220, 255, 0.9);
        canvas.text(
            Pos2::new(rect.right() + 40.0, cy),
            Align2::CENTER_CENTER,
            "Equator",
            FontId::proportional(12.0),
            title_color,
        );
        canvas.text(
            Pos2::new(cx, rect.top() - 10.0),
            Align2::CENTER_BOTTOM,
            "Prime Meridian",
            FontId::proportional(12.0),
            title_color,
        );
    }

    fn draw_marker(&self, canvas: &mut dyn Canvas, quake: &Quake, marker: &Marker, is_hovered: bool) {
        let size = marker_size(quake.magnitude);
        let color = magnitude_color(quake.magnitude);
        let pulse = pulse(self.tick, quake.magnitude);

        let (glow_radius, glow_alpha) = if is_hovered { (size * 3.0, 0.6) } else { (size * 2.0, 0.4) };
        canvas.radial_gradient(
            marker.pos,
            glow_radius,
            color.gamma_multiply(glow_alpha * pulse),
            Color32::TRANSPARENT,
        );

        canvas.set_alpha(0.9 * pulse);
        let core = if is_hovered { size * 1.5 } else { size };
        canvas.fill_circle(marker.pos, core, color);

        canvas.set_alpha(0.7);
        canvas.fill_circle(marker.pos, size * 0.3, Color32::WHITE);

        canvas.set_alpha(1.0);
    }
}

impl RenderMode for GeographicMode {
    fn draw(&mut self, canvas: &mut dyn Canvas, quakes: &[Quake], pointer: Pos2) -> FrameReport {
        self.tick += 1;
        self.hovered = None;

        let frame = MapFrame::for_viewport(canvas.viewport());

        canvas.set_alpha(1.0);
        canvas.clear(colors::BG_PRIMARY);
        Self::draw_map(canvas, &frame);

        let markers: Vec<Marker> = quakes
            .iter()
            .enumerate()
            .filter_map(|(i, q)| self.marker(i, q, &frame))
            .collect();

        self.hovered = pick_hovered(&markers, pointer);
        let hovered_index = self.hovered.map(|h| h.index);

        for marker in &markers {
            let quake = &quakes[marker.index];
            self.draw_marker(canvas, quake, marker, hovered_index == Some(marker.index));
        }

        if let Some(hovered) = self.hovered {
            draw_tooltip(canvas, &quakes[hovered.index], hovered.pos, &TooltipStyle::GEOGRAPHIC);
        }

        FrameReport::new(self.hovered, markers.len())
    }

    fn reset(&mut self) {
        self.tick = 0;
        self.hovered = None;
    }

    fn tick(&self) -> u64 {
        self.tick
    }

    fn hovered(&self) -> Option<Hovered> {
        self.hovered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Coordinates;
    use crate::render::canvas::{DrawOp, RecordingCanvas};
    use chrono::DateTime;

    fn quake_at(magnitude: f32, longitude: f32, latitude: f32) -> Quake {
        Quake {
            magnitude,
            location: format!("{longitude},{latitude}"),
            time: DateTime::from_timestamp(1_700_000_000, 0).expect("timestamp"),
            coordinates: Coordinates {
                longitude,
                latitude,
                depth_km: 10.0,
            },
            category: None,
            status: None,
            tsunami: false,
            significance: None,
        }
    }

    fn far_pointer() -> Pos2 {
        Pos2::new(-10_000.0, -10_000.0)
    }

    #[test]
    fn test_map_frame_sizes() {
        let wide = MapFrame::for_viewport(Vec2::new(1000.0, 600.0));
        assert_eq!(wide.size, Vec2::new(800.0, 400.0));
        assert_eq!(wide.rect(), Rect::from_min_max(Pos2::new(100.0, 100.0), Pos2::new(900.0, 500.0)));

        let narrow = MapFrame::for_viewport(Vec2::new(500.0, 400.0));
        assert_eq!(narrow.size, Vec2::new(400.0, 200.0));
    }

    #[test]
    fn test_projection() {
        let frame = MapFrame::for_viewport(Vec2::new(1000.0, 600.0));
        assert_eq!(frame.project(0.0, 0.0), Some(Pos2::new(500.0, 300.0)));
        // North is up, east is right
        assert_eq!(frame.project(90.0, 45.0), Some(Pos2::new(700.0, 200.0)));
        assert_eq!(frame.project(-180.0, -90.0), Some(Pos2::new(100.0, 500.0)));
        assert_eq!(frame.project(200.0, 0.0), None);
        assert_eq!(frame.project(f32::NAN, 0.0), None);
        // Deterministic
        assert_eq!(frame.project(12.5, -33.3), frame.project(12.5, -33.3));
    }

    #[test]
    fn test_pulse_range() {
        for tick in 0..500 {
            for m in [0.0, 2.5, 5.0, 9.1] {
                let p = pulse(tick, m);
                assert!((0.4 - 1e-6..=1.0 + 1e-6).contains(&p), "pulse {p}");
            }
        }
    }

    #[test]
    fn test_out_of_range_longitude_is_skipped() {
        let mut mode = GeographicMode::new();
        let mut canvas = RecordingCanvas::new(1000.0, 600.0);
        let quakes = vec![
            quake_at(4.0, 0.0, 0.0),
            quake_at(5.0, 200.0, 0.0),
            quake_at(3.0, -120.0, 35.0),
            quake_at(6.0, 140.0, -40.0),
        ];

        let report = mode.draw(&mut canvas, &quakes, far_pointer());
        assert_eq!(report.drawn, 3);

        // Nothing is drawn at the would-be position of the skipped event
        let skipped = Pos2::new(500.0 + 200.0 * 800.0 / 360.0, 300.0);
        assert!(!canvas.ops.iter().any(|op| matches!(op, DrawOp::Circle { center, .. } if *center == skipped)));

        // Pointer at the skipped position hovers nothing
        let report = mode.draw(&mut canvas, &quakes, skipped);
        assert!(report.hovered.is_none());
    }

    #[test]
    fn test_strongest_event_at_origin_lands_inside_map() {
        let mut mode = GeographicMode::new();
        let mut canvas = RecordingCanvas::new(1000.0, 600.0);
        let quakes = vec![
            quake_at(2.0, -75.0, 20.0),
            quake_at(5.0, 120.0, -10.0),
            quake_at(7.5, 0.0, 0.0),
            quake_at(4.0, 200.0, 0.0),
        ];
        assert_eq!(mode.tick(), 0);

        let frame = MapFrame::for_viewport(canvas.viewport());
        let rect = frame.rect();
        let marker = mode.marker(2, &quakes[2], &frame).expect("origin is projectable");
        assert!(marker.pos.x > rect.left() && marker.pos.x < rect.right());
        assert!(marker.pos.y > rect.top() && marker.pos.y < rect.bottom());
        assert!(mode.marker(3, &quakes[3], &frame).is_none());

        let report = mode.draw(&mut canvas, &quakes, far_pointer());
        assert_eq!(report.drawn, 3);
        assert!(canvas
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::Circle { center, .. } if *center == marker.pos)));
    }

    #[test]
    fn test_hover_on_marker() {
        let mut mode = GeographicMode::new();
        let mut canvas = RecordingCanvas::new(1000.0, 600.0);
        let quakes = vec![quake_at(4.0, 0.0, 0.0), quake_at(6.0, 140.0, -40.0)];

        let target = MapFrame::for_viewport(canvas.viewport())
            .project(140.0, -40.0)
            .expect("inside map");
        let report = mode.draw(&mut canvas, &quakes, target);

        let hovered = report.hovered.expect("hover");
        assert_eq!(hovered.index, 1);
        assert_eq!(hovered.pos, target);
        assert_eq!(report.cursor, egui::CursorIcon::PointingHand);
        assert!(canvas.texts().contains(&"Date: 2023-11-14"));
    }

    #[test]
    fn test_overlay_labels() {
        let mut mode = GeographicMode::new();
        let mut canvas = RecordingCanvas::new(1000.0, 600.0);
        mode.draw(&mut canvas, &[], far_pointer());

        let texts = canvas.texts();
        for label in ["180°W", "30°E", "60°N", "30°S", "Equator", "Prime Meridian"] {
            assert!(texts.contains(&label), "missing {label}");
        }
        assert!(!texts.contains(&"0°W"));

        // North labels sit above the equator
        let y_of = |label: &str| {
            canvas.ops.iter().find_map(|op| match op {
                DrawOp::Text { pos, text, .. } if text == label => Some(pos.y),
                _ => None,
            })
        };
        assert!(y_of("60°N").expect("label") < 300.0);
        assert!(y_of("60°S").expect("label") > 300.0);
    }

    #[test]
    fn test_reset() {
        let mut mode = GeographicMode::new();
        let mut canvas = RecordingCanvas::new(1000.0, 600.0);
        let quakes = vec![quake_at(4.0, 0.0, 0.0)];
        mode.draw(&mut canvas, &quakes, Pos2::new(500.0, 300.0));
        mode.draw(&mut canvas, &quakes, Pos2::new(500.0, 300.0));
        assert_eq!(mode.tick(), 2);
        assert!(mode.hovered().is_some());

        mode.reset();
        assert_eq!(mode.tick(), 0);
        assert!(mode.hovered().is_none());
    }
}
