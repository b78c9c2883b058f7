//! Artistic mode: quakes orbiting the viewport center
//!
//! Angle drifts with the tick and is offset per index; radius grows with
//! magnitude so strong events sit on the outside. Consecutive events are
//! joined by a faint polyline, and markers shed particles.

use std::f64::consts::TAU;

use egui::{Pos2, Stroke, Vec2};
use tracing::trace;

use super::canvas::{Canvas, Path};
use super::particles::{ParticleSystem, DEFAULT_PARTICLE_CAP};
use super::tooltip::{draw_tooltip, TooltipStyle};
use super::{pick_hovered, FrameReport, Hovered, Marker, RenderMode};
use crate::core::Quake;
use crate::theme::{colors, magnitude_color, rgba};

/// Radians per tick
pub const ANGULAR_SPEED: f64 = 0.0008;
/// Radians between consecutive events
pub const INDEX_OFFSET: f64 = 0.2;
/// Base orbit radius as a fraction of the shorter viewport side
pub const BASE_RADIUS_FACTOR: f32 = 0.25;
/// Extra orbit radius per magnitude unit
pub const RADIUS_PER_MAGNITUDE: f32 = 8.0;

const GRID_SPACING: f32 = 50.0;

/// Angle of event `index` at `tick`, in [0, 2π)
#[inline]
pub fn orbit_angle(tick: u64, index: usize) -> f64 {
    (tick as f64 * ANGULAR_SPEED + index as f64 * INDEX_OFFSET).rem_euclid(TAU)
}

/// Orbit radius for a magnitude
#[inline]
pub fn orbit_radius(base_radius: f32, magnitude: f32) -> f32 {
    base_radius + magnitude * RADIUS_PER_MAGNITUDE
}

/// Polar to screen around `center`
#[inline]
pub fn orbit_position(center: Pos2, radius: f32, angle: f64) -> Pos2 {
    let angle = angle as f32;
    center + Vec2::new(angle.cos(), angle.sin()) * radius
}

/// Marker radius
#[inline]
pub fn marker_size(magnitude: f32) -> f32 {
    magnitude * 2.0 + 3.0
}

#[inline]
pub fn hit_radius(magnitude: f32) -> f32 {
    2.0 * marker_size(magnitude)
}

pub struct ArtisticMode {
    tick: u64,
    hovered: Option<Hovered>,
    particles: ParticleSystem,
}

impl Default for ArtisticMode {
    fn default() -> Self {
        Self::new(DEFAULT_PARTICLE_CAP)
    }
}

impl ArtisticMode {
    pub fn new(particle_cap: usize) -> Self {
        Self::with_particles(ParticleSystem::new(particle_cap))
    }

    /// Seeded particle RNG for reproducible runs
    pub fn with_seed(particle_cap: usize, seed: u64) -> Self {
        Self::with_particles(ParticleSystem::with_seed(particle_cap, seed))
    }

    fn with_particles(particles: ParticleSystem) -> Self {
        Self {
            tick: 0,
            hovered: None,
            particles,
        }
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub(crate) fn particles_mut(&mut self) -> &mut ParticleSystem {
        &mut self.particles
    }

    /// Marker for one quake at the current tick, None when its geometry is not finite
    pub fn marker(&self, index: usize, quake: &Quake, center: Pos2, base_radius: f32) -> Option<Marker> {
        if !quake.magnitude.is_finite() {
            trace!(index, "Skipping quake with non-finite magnitude");
            return None;
        }
        let radius = orbit_radius(base_radius, quake.magnitude);
        let pos = orbit_position(center, radius, orbit_angle(self.tick, index));
        if !(pos.x.is_finite() && pos.y.is_finite()) {
            return None;
        }
        Some(Marker {
            index,
            pos,
            hit_radius: hit_radius(quake.magnitude),
        })
    }

    fn draw_grid(canvas: &mut dyn Canvas, viewport: Vec2) {
        let stroke = Stroke::new(0.5, rgba(50, 70, 100, 0.15));
        let mut x = 0.0;
        while x < viewport.x {
            canvas.line(Pos2::new(x, 0.0), Pos2::new(x, viewport.y), stroke);
            x += GRID_SPACING;
        }
        let mut y = 0.0;
        while y < viewport.y {
            canvas.line(Pos2::new(0.0, y), Pos2::new(viewport.x, y), stroke);
            y += GRID_SPACING;
        }
    }

    fn draw_central_glow(canvas: &mut dyn Canvas, center: Pos2, viewport: Vec2) {
        canvas.radial_gradient(
            center,
            viewport.min_elem() * 0.4,
            rgba(30, 60, 100, 0.2),
            egui::Color32::TRANSPARENT,
        );
    }

    /// Decorative path through the markers in sequence order
    fn draw_connecting_lines(canvas: &mut dyn Canvas, markers: &[Marker]) {
        if markers.len() < 2 {
            return;
        }
        let mut path = Path::new();
        path.move_to(markers[0].pos);
        for marker in &markers[1..] {
            path.line_to(marker.pos);
        }
        canvas.stroke_path(&path, Stroke::new(1.0, rgba(100, 180, 220, 0.2)));
    }

    fn draw_marker(canvas: &mut dyn Canvas, quake: &Quake, marker: &Marker, is_hovered: bool) {
        let size = marker_size(quake.magnitude);
        let color = magnitude_color(quake.magnitude);

        // Outer glow
        canvas.set_alpha(0.3);
        canvas.fill_circle(marker.pos, size * 2.0, color);

        // Body
        canvas.set_alpha(if is_hovered { 1.0 } else { 0.9 });
        let body = if is_hovered { size * 1.3 } else { size };
        canvas.fill_circle(marker.pos, body, color);

        // Highlight
        canvas.set_alpha(0.5);
        canvas.fill_circle(marker.pos, size * 0.3, egui::Color32::WHITE);

        canvas.set_alpha(1.0);
    }
}

impl RenderMode for ArtisticMode {
    fn draw(&mut self, canvas: &mut dyn Canvas, quakes: &[Quake], pointer: Pos2) -> FrameReport {
        self.tick += 1;
        self.hovered = None;

        let viewport = canvas.viewport();
        let center = (viewport * 0.5).to_pos2();

        canvas.set_alpha(1.0);
        canvas.clear(colors::BG_PRIMARY);
        Self::draw_grid(canvas, viewport);
        Self::draw_central_glow(canvas, center, viewport);

        let base_radius = viewport.min_elem() * BASE_RADIUS_FACTOR;
        let markers: Vec<Marker> = quakes
            .iter()
            .enumerate()
            .filter_map(|(i, q)| self.marker(i, q, center, base_radius))
            .collect();

        Self::draw_connecting_lines(canvas, &markers);

        self.hovered = pick_hovered(&markers, pointer);
        let hovered_index = self.hovered.map(|h| h.index);

        for marker in &markers {
            let quake = &quakes[marker.index];
            Self::draw_marker(canvas, quake, marker, hovered_index == Some(marker.index));
            self.particles.maybe_emit(marker.pos, quake.magnitude);
        }

        self.particles.step();
        self.particles.draw(canvas);

        if let Some(hovered) = self.hovered {
            draw_tooltip(canvas, &quakes[hovered.index], hovered.pos, &TooltipStyle::ARTISTIC);
        }

        FrameReport::new(self.hovered, markers.len())
    }

    fn reset(&mut self) {
        self.particles.clear();
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
