//! Transient sparks emitted around artistic-mode markers
//!
//! - Particle: position, velocity, size and a life value in [0, 1]
//! - ParticleSystem: capped FIFO of live particles, seeded RNG

use std::collections::VecDeque;

use egui::{Color32, Pos2, Vec2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::canvas::Canvas;
use crate::theme::magnitude_color;

/// Default live-particle cap
pub const DEFAULT_PARTICLE_CAP: usize = 80;

/// Upper bound for the up-front buffer reservation; larger caps grow on demand
const PREALLOC_LIMIT: usize = 256;

/// Per-frame spawn probability for a magnitude-5 event
const SPAWN_RATE_AT_M5: f32 = 0.02;

/// Size multiplier applied every frame
const SIZE_DAMPING: f32 = 0.995;

// ============================================================================
// Particle
// ============================================================================

#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub pos: Pos2,
    pub vel: Vec2,
    pub size: f32,
    /// 1.0 at birth, removed once it reaches 0
    pub life: f32,
    /// Life lost per frame
    pub decay: f32,
    pub color: Color32,
}

impl Particle {
    pub fn spawn<R: Rng>(pos: Pos2, magnitude: f32, rng: &mut R) -> Self {
        Self {
            pos,
            vel: Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
            size: rng.gen_range(1.0..4.0),
            life: 1.0,
            decay: rng.gen_range(0.01..0.03),
            color: magnitude_color(magnitude),
        }
    }

    /// Advance one frame
    #[inline]
    pub fn update(&mut self) {
        self.pos += self.vel;
        self.life -= self.decay;
        self.size *= SIZE_DAMPING;
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

// ============================================================================
// ParticleSystem
// ============================================================================

/// Live particles, oldest first.
#[derive(Debug)]
pub struct ParticleSystem {
    particles: VecDeque<Particle>,
    cap: usize,
    rng: SmallRng,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(DEFAULT_PARTICLE_CAP)
    }
}

impl ParticleSystem {
    pub fn new(cap: usize) -> Self {
        Self::with_rng(cap, SmallRng::from_entropy())
    }

    /// Deterministic system for tests and reproducible headless runs
    pub fn with_seed(cap: usize, seed: u64) -> Self {
        Self::with_rng(cap, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(cap: usize, rng: SmallRng) -> Self {
        Self {
            particles: VecDeque::with_capacity(cap.saturating_add(1).min(PREALLOC_LIMIT)),
            cap,
            rng,
        }
    }

    /// Spawn probability per frame, proportional to magnitude
    #[inline]
    pub fn spawn_probability(magnitude: f32) -> f32 {
        (SPAWN_RATE_AT_M5 * magnitude / 5.0).clamp(0.0, 1.0)
    }

    /// Roll the dice for one event this frame. Returns true if a particle spawned.
    pub fn maybe_emit(&mut self, pos: Pos2, magnitude: f32) -> bool {
        let p = Self::spawn_probability(magnitude);
        if p > 0.0 && self.rng.gen::<f32>() < p {
            self.emit(pos, magnitude);
            true
        } else {
            false
        }
    }

    /// Spawn unconditionally
    pub fn emit(&mut self, pos: Pos2, magnitude: f32) {
        let particle = Particle::spawn(pos, magnitude, &mut self.rng);
        self.particles.push_back(particle);
    }

    /// Advance every particle, drop the expired ones and enforce the cap.
    pub fn step(&mut self) {
        for particle in &mut self.particles {
            particle.update();
        }
        self.particles.retain(Particle::is_alive);
        self.trim();
    }

    /// Evict oldest particles above the cap
    pub fn trim(&mut self) {
        while self.particles.len() > self.cap {
            self.particles.pop_front();
        }
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let base_alpha = canvas.alpha();
        for particle in &self.particles {
            canvas.set_alpha(particle.life.clamp(0.0, 1.0));
            canvas.fill_circle(particle.pos, particle.size, particle.color);
        }
        canvas.set_alpha(base_alpha);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas::{DrawOp, RecordingCanvas};

    #[test]
    fn test_particle_spawn_ranges() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..200 {
            let p = Particle::spawn(Pos2::new(5.0, 5.0), 4.0, &mut rng);
            assert_eq!(p.life, 1.0);
            assert!((1.0..4.0).contains(&p.size));
            assert!((0.01..0.03).contains(&p.decay));
            assert!(p.vel.x.abs() <= 1.0 && p.vel.y.abs() <= 1.0);
            assert_eq!(p.color, magnitude_color(4.0));
        }
    }

    #[test]
    fn test_particle_update() {
        let mut p = Particle {
            pos: Pos2::new(0.0, 0.0),
            vel: Vec2::new(1.0, -0.5),
            size: 2.0,
            life: 1.0,
            decay: 0.25,
            color: Color32::WHITE,
        };
        p.update();
        assert_eq!(p.pos, Pos2::new(1.0, -0.5));
        assert_eq!(p.life, 0.75);
        assert!((p.size - 1.99).abs() < 1e-6);
        for _ in 0..3 {
            p.update();
        }
        assert!(!p.is_alive());
    }

    #[test]
    fn test_step_removes_expired_in_same_frame() {
        let mut system = ParticleSystem::with_seed(80, 3);
        for _ in 0..10 {
            system.emit(Pos2::ZERO, 3.0);
        }
        // decay >= 0.01 per frame, so everything is gone well before 110 frames
        for _ in 0..110 {
            system.step();
            assert!(system.iter().all(Particle::is_alive));
        }
        assert!(system.is_empty());
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut system = ParticleSystem::with_seed(5, 9);
        for i in 0..8 {
            system.emit(Pos2::new(i as f32 * 100.0, 0.0), 5.0);
        }
        system.trim();
        assert_eq!(system.len(), 5);
        // First three (x = 0, 100, 200) are gone
        let first = system.iter().next().expect("particle");
        assert_eq!(first.pos.x, 300.0);
    }

    #[test]
    fn test_huge_cap_does_not_preallocate() {
        let mut system = ParticleSystem::new(usize::MAX);
        assert_eq!(system.cap(), usize::MAX);
        for _ in 0..300 {
            system.emit(Pos2::ZERO, 5.0);
        }
        system.trim();
        assert_eq!(system.len(), 300);
    }

    #[test]
    fn test_spawn_probability_scales_with_magnitude() {
        assert_eq!(ParticleSystem::spawn_probability(0.0), 0.0);
        assert!((ParticleSystem::spawn_probability(5.0) - 0.02).abs() < 1e-6);
        assert!(
            ParticleSystem::spawn_probability(7.5) > ParticleSystem::spawn_probability(2.0)
        );

        let mut system = ParticleSystem::with_seed(80, 11);
        assert!(!system.maybe_emit(Pos2::ZERO, 0.0));
        assert!(system.is_empty());
    }

    #[test]
    fn test_draw_restores_alpha() {
        let mut system = ParticleSystem::with_seed(80, 5);
        system.emit(Pos2::new(10.0, 10.0), 2.0);
        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        canvas.set_alpha(0.8);
        system.draw(&mut canvas);
        assert_eq!(canvas.alpha(), 0.8);
        assert!(matches!(canvas.ops[0], DrawOp::Circle { .. }));
    }
}
