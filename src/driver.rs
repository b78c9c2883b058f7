//! Animation driver: owns both render modes and the frame loop state
//!
//! The driver never blocks or sleeps. Each `tick` draws one frame and asks a
//! `FrameScheduler` for the next one; cancelling the loop means not asking.

use egui::Pos2;
use tracing::{debug, info, warn};

use crate::core::{Quake, QuakeFeed};
use crate::render::canvas::{Canvas, RecordingCanvas};
use crate::render::particles::DEFAULT_PARTICLE_CAP;
use crate::render::{ArtisticMode, FrameReport, GeographicMode, ModeKind, RenderMode};

/// Pointer position used before the first move event; never within a hit radius
const NO_POINTER: Pos2 = Pos2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);

/// Something that can run `tick` again later.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

impl FrameScheduler for egui::Context {
    fn request_frame(&mut self) {
        self.request_repaint();
    }
}

/// Scheduler for explicit loops: remembers whether a frame was requested.
#[derive(Debug, Default)]
pub struct StepScheduler {
    requested: bool,
}

impl StepScheduler {
    /// Consume the pending request, if any
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.requested)
    }
}

impl FrameScheduler for StepScheduler {
    fn request_frame(&mut self) {
        self.requested = true;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// No frame scheduled
    Idle,
    /// Exactly one frame scheduled at a time
    Running,
}

pub struct AnimationDriver {
    state: LoopState,
    frame_pending: bool,
    mode: ModeKind,
    artistic: ArtisticMode,
    geographic: GeographicMode,
    pointer: Pos2,
    frames: u64,
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new(DEFAULT_PARTICLE_CAP, ModeKind::default())
    }
}

impl AnimationDriver {
    pub fn new(particle_cap: usize, mode: ModeKind) -> Self {
        Self::with_modes(ArtisticMode::new(particle_cap), mode)
    }

    /// Driver with a seeded particle RNG
    pub fn with_seed(particle_cap: usize, mode: ModeKind, seed: u64) -> Self {
        Self::with_modes(ArtisticMode::with_seed(particle_cap, seed), mode)
    }

    fn with_modes(artistic: ArtisticMode, mode: ModeKind) -> Self {
        Self {
            state: LoopState::Idle,
            frame_pending: false,
            mode,
            artistic,
            geographic: GeographicMode::new(),
            pointer: NO_POINTER,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn mode(&self) -> ModeKind {
        self.mode
    }

    /// Frames drawn since construction
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn artistic(&self) -> &ArtisticMode {
        &self.artistic
    }

    pub fn geographic(&self) -> &GeographicMode {
        &self.geographic
    }

    pub fn active(&self) -> &dyn RenderMode {
        match self.mode {
            ModeKind::Artistic => &self.artistic,
            ModeKind::Geographic => &self.geographic,
        }
    }

    fn active_mut(&mut self) -> &mut dyn RenderMode {
        match self.mode {
            ModeKind::Artistic => &mut self.artistic,
            ModeKind::Geographic => &mut self.geographic,
        }
    }

    /// Begin the loop. Returns false if it was already running.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.state == LoopState::Running {
            return false;
        }
        info!(mode = %self.mode, "Starting animation loop");
        self.state = LoopState::Running;
        self.schedule(scheduler);
        true
    }

    /// Stop scheduling frames. A pending frame is dropped when it arrives.
    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            info!(frames = self.frames, "Stopping animation loop");
        }
        self.state = LoopState::Idle;
        self.frame_pending = false;
    }

    /// Hand the loop to a different scheduler, discarding the old pending request
    pub fn reschedule(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.frame_pending = false;
        if self.state == LoopState::Running {
            self.schedule(scheduler);
        }
    }

    fn schedule(&mut self, scheduler: &mut dyn FrameScheduler) {
        if !self.frame_pending {
            self.frame_pending = true;
            scheduler.request_frame();
        }
    }

    /// Latest pointer position in viewport coordinates; last value wins
    pub fn set_pointer(&mut self, pos: Pos2) {
        self.pointer = pos;
    }

    /// Pointer left the drawing surface
    pub fn clear_pointer(&mut self) {
        self.pointer = NO_POINTER;
    }

    /// Switch by identifier. Unknown identifiers and the current mode are no-ops.
    pub fn set_mode(&mut self, id: &str) -> bool {
        match id.parse::<ModeKind>() {
            Ok(kind) => self.set_mode_kind(kind),
            Err(e) => {
                warn!(error = %e, "Ignoring mode switch");
                false
            }
        }
    }

    /// Returns true when the mode actually changed
    pub fn set_mode_kind(&mut self, kind: ModeKind) -> bool {
        if kind == self.mode {
            return false;
        }
        debug!(from = %self.mode, to = %kind, "Switching mode");
        self.mode = kind;
        self.artistic.reset();
        self.geographic.reset();
        true
    }

    /// Draw one frame with the active mode and schedule the next.
    /// Returns None while idle.
    pub fn tick(
        &mut self,
        canvas: &mut dyn Canvas,
        quakes: &[Quake],
        scheduler: &mut dyn FrameScheduler,
    ) -> Option<FrameReport> {
        if self.state == LoopState::Idle {
            return None;
        }
        self.frame_pending = false;

        let pointer = self.pointer;
        let report = self.active_mut().draw(canvas, quakes, pointer);
        self.frames += 1;

        self.schedule(scheduler);
        Some(report)
    }
}

/// Summary of an explicit headless run
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeadlessRun {
    pub frames: u64,
    /// Markers drawn in the last frame
    pub drawn: usize,
    /// Frames in which something was hovered
    pub hovered_frames: u64,
}

/// Drive the loop with a `StepScheduler` until it stops asking or `max_frames` is reached.
pub fn run_headless(
    driver: &mut AnimationDriver,
    canvas: &mut RecordingCanvas,
    feed: &dyn QuakeFeed,
    max_frames: u64,
) -> HeadlessRun {
    let mut scheduler = StepScheduler::default();
    if !driver.start(&mut scheduler) {
        driver.reschedule(&mut scheduler);
    }

    let mut run = HeadlessRun::default();
    while run.frames < max_frames && scheduler.take() {
        canvas.clear_ops();
        let quakes = feed.current();
        let Some(report) = driver.tick(canvas, &quakes, &mut scheduler) else {
            break;
        };
        run.frames += 1;
        run.drawn = report.drawn;
        if report.hovered.is_some() {
            run.hovered_frames += 1;
        }
    }

    debug!(frames = run.frames, drawn = run.drawn, mode = %driver.mode(), "Headless run finished");
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Coordinates;
    use chrono::DateTime;
    use std::sync::Arc;

    fn quakes() -> Vec<Quake> {
        [(4.0, 10.0, 20.0), (6.2, -70.0, -30.0), (2.1, 140.0, 35.0)]
            .into_iter()
            .map(|(magnitude, longitude, latitude)| Quake {
                magnitude,
                location: "Somewhere".to_string(),
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
            })
            .collect()
    }

    #[derive(Default)]
    struct CountingScheduler {
        requests: usize,
    }

    impl FrameScheduler for CountingScheduler {
        fn request_frame(&mut self) {
            self.requests += 1;
        }
    }

    #[test]
    fn test_idle_tick_draws_nothing() {
        let mut driver = AnimationDriver::with_seed(80, ModeKind::Artistic, 1);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let mut scheduler = CountingScheduler::default();

        assert_eq!(driver.state(), LoopState::Idle);
        assert!(driver.tick(&mut canvas, &quakes(), &mut scheduler).is_none());
        assert!(canvas.ops.is_empty());
        assert_eq!(scheduler.requests, 0);
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut driver = AnimationDriver::with_seed(80, ModeKind::Artistic, 2);
        let mut scheduler = CountingScheduler::default();

        assert!(driver.start(&mut scheduler));
        assert!(!driver.start(&mut scheduler));
        assert!(driver.is_running());
        assert_eq!(scheduler.requests, 1);
    }

    #[test]
    fn test_single_pending_frame() {
        let mut driver = AnimationDriver::with_seed(80, ModeKind::Geographic, 3);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let mut scheduler = CountingScheduler::default();
        let data = quakes();

        driver.start(&mut scheduler);
        for _ in 0..5 {
            driver.tick(&mut canvas, &data, &mut scheduler);
        }
        // One request from start, one per tick
        assert_eq!(scheduler.requests, 6);
        assert_eq!(driver.frames(), 5);

        // Requesting again while a frame is pending asks nothing new
        driver.start(&mut scheduler);
        assert_eq!(scheduler.requests, 6);
    }

    #[test]
    fn test_stop_halts_scheduling() {
        let mut driver = AnimationDriver::with_seed(80, ModeKind::Artistic, 4);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let mut scheduler = CountingScheduler::default();
        let data = quakes();

        driver.start(&mut scheduler);
        driver.tick(&mut canvas, &data, &mut scheduler);
        driver.stop();
        let requests = scheduler.requests;

        assert!(driver.tick(&mut canvas, &data, &mut scheduler).is_none());
        assert_eq!(scheduler.requests, requests);
        assert_eq!(driver.state(), LoopState::Idle);
    }

    #[test]
    fn test_mode_switch_resets_both_modes() {
        let mut driver = AnimationDriver::with_seed(80, ModeKind::Artistic, 5);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let mut scheduler = StepScheduler::default();
        let data = quakes();

        driver.start(&mut scheduler);
        for _ in 0..20 {
            driver.tick(&mut canvas, &data, &mut scheduler);
        }
        for _ in 0..10 {
            driver.artistic.particles_mut().emit(Pos2::ZERO, 5.0);
        }
        assert!(driver.artistic().particles().len() >= 10);

        assert!(driver.set_mode("geographic"));
        assert_eq!(driver.mode(), ModeKind::Geographic);
        assert_eq!(driver.artistic().particles().len(), 0);
        assert_eq!(driver.artistic().tick(), 0);

        driver.tick(&mut canvas, &data, &mut scheduler);
        assert_eq!(driver.geographic().tick(), 1);

        assert!(driver.set_mode("artistic"));
        assert_eq!(driver.artistic().particles().len(), 0);
        assert_eq!(driver.artistic().tick(), 0);
        assert_eq!(driver.geographic().tick(), 0);
    }

    #[test]
    fn test_unknown_and_same_mode_are_noops() {
        let mut driver = AnimationDriver::with_seed(80, ModeKind::Artistic, 6);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let mut scheduler = StepScheduler::default();
        let data = quakes();

        driver.start(&mut scheduler);
        driver.tick(&mut canvas, &data, &mut scheduler);
        driver.tick(&mut canvas, &data, &mut scheduler);

        assert!(!driver.set_mode("globe"));
        assert!(!driver.set_mode(""));
        assert!(!driver.set_mode("artistic"));
        assert_eq!(driver.mode(), ModeKind::Artistic);
        assert_eq!(driver.artistic().tick(), 2);
    }

    #[test]
    fn test_pointer_reaches_active_mode() {
        let mut driver = AnimationDriver::with_seed(80, ModeKind::Geographic, 7);
        let mut canvas = RecordingCanvas::new(1000.0, 600.0);
        let mut scheduler = StepScheduler::default();
        let data = quakes();

        driver.start(&mut scheduler);
        driver.set_pointer(Pos2::new(0.0, 0.0));
        driver.set_pointer(Pos2::new(500.0 + 10.0 * 800.0 / 360.0, 300.0 - 20.0 * 400.0 / 180.0));
        let report = driver.tick(&mut canvas, &data, &mut scheduler).expect("running");
        assert_eq!(report.hovered.map(|h| h.index), Some(0));

        driver.clear_pointer();
        let report = driver.tick(&mut canvas, &data, &mut scheduler).expect("running");
        assert!(report.hovered.is_none());
    }

    #[test]
    fn test_run_headless_respects_budget() {
        let mut driver = AnimationDriver::with_seed(80, ModeKind::Geographic, 8);
        let mut canvas = RecordingCanvas::new(1000.0, 600.0);
        let feed: Arc<Vec<Quake>> = Arc::new(quakes());

        let run = run_headless(&mut driver, &mut canvas, &feed, 12);
        assert_eq!(run.frames, 12);
        assert_eq!(run.drawn, 3);
        assert_eq!(driver.geographic().tick(), 12);

        // Running again continues the same loop
        let run = run_headless(&mut driver, &mut canvas, &feed, 3);
        assert_eq!(run.frames, 3);
        assert_eq!(driver.frames(), 15);
    }

    #[test]
    fn test_run_headless_stopped_driver_restarts() {
        let mut driver = AnimationDriver::with_seed(80, ModeKind::Artistic, 9);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let feed: Arc<Vec<Quake>> = Arc::new(Vec::new());

        driver.stop();
        let run = run_headless(&mut driver, &mut canvas, &feed, 4);
        assert_eq!(run.frames, 4);
        assert_eq!(run.drawn, 0);
    }
}
