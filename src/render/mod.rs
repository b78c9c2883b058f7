//! Render modes and the drawing abstraction they share
//!
//! Both modes recompute every on-screen position from the quake slice each
//! frame. The only state they carry between frames is a tick counter, the
//! last hover result and (artistic only) the particle list.

pub mod artistic;
pub mod canvas;
pub mod geographic;
pub mod painter;
pub mod particles;
pub mod tooltip;

use std::fmt;
use std::str::FromStr;

use egui::{CursorIcon, Pos2};

use crate::core::Quake;
use canvas::Canvas;

pub use artistic::ArtisticMode;
pub use geographic::GeographicMode;

/// Which visualization is active
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ModeKind {
    #[default]
    Artistic,
    Geographic,
}

impl ModeKind {
    pub const ALL: &'static [ModeKind] = &[ModeKind::Artistic, ModeKind::Geographic];

    /// Identifier accepted by `set_mode`
    pub fn id(self) -> &'static str {
        match self {
            ModeKind::Artistic => "artistic",
            ModeKind::Geographic => "geographic",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModeKind::Artistic => "Artistic",
            ModeKind::Geographic => "Geographic",
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown visualization mode {:?}", self.0)
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for ModeKind {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "artistic" => Ok(ModeKind::Artistic),
            "geographic" => Ok(ModeKind::Geographic),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

/// The event under the pointer this frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hovered {
    /// Index into the quake slice passed to `draw`
    pub index: usize,
    /// Screen position of its marker
    pub pos: Pos2,
}

/// What a draw pass reports back to the driver
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub hovered: Option<Hovered>,
    pub cursor: CursorIcon,
    /// Markers actually drawn (skipped events excluded)
    pub drawn: usize,
}

impl FrameReport {
    pub fn new(hovered: Option<Hovered>, drawn: usize) -> Self {
        let cursor = if hovered.is_some() {
            CursorIcon::PointingHand
        } else {
            CursorIcon::Default
        };
        Self {
            hovered,
            cursor,
            drawn,
        }
    }
}

/// Shared contract of the two visualizations.
pub trait RenderMode {
    /// Clear and redraw the whole frame. Increments the tick first.
    fn draw(&mut self, canvas: &mut dyn Canvas, quakes: &[Quake], pointer: Pos2) -> FrameReport;

    /// Back to the initial state: tick 0, no hover, no particles.
    fn reset(&mut self);

    fn tick(&self) -> u64;

    fn hovered(&self) -> Option<Hovered>;
}

/// A projected marker: slice index, position and hit radius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub index: usize,
    pub pos: Pos2,
    pub hit_radius: f32,
}

/// Nearest marker strictly within its hit radius; later markers win ties.
pub fn pick_hovered<'a>(markers: impl IntoIterator<Item = &'a Marker>, pointer: Pos2) -> Option<Hovered> {
    let mut best: Option<(f32, Hovered)> = None;
    for marker in markers {
        let distance = marker.pos.distance(pointer);
        if distance.is_nan() || distance >= marker.hit_radius {
            continue;
        }
        if best.map_or(true, |(d, _)| distance <= d) {
            best = Some((
                distance,
                Hovered {
                    index: marker.index,
                    pos: marker.pos,
                },
            ));
        }
    }
    best.map(|(_, hovered)| hovered)
}
