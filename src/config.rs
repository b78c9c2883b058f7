//! Runtime configuration from environment variables
//!
//! | Variable                  | Default                        |
//! |---------------------------|--------------------------------|
//! | `QUAKE_FEED_URL`          | USGS all_day summary           |
//! | `QUAKE_FEED_FALLBACK_URL` | USGS 4.5_day summary           |
//! | `QUAKE_REFRESH_SECS`      | 300                            |
//! | `QUAKE_TIMEOUT_SECS`      | 10                             |
//! | `QUAKE_PARTICLE_CAP`      | 80                             |
//! | `QUAKE_MODE`              | artistic                       |
//! | `QUAKE_HEADLESS_FRAMES`   | 120 (CLI only)                 |
//!
//! Values that fail to parse fall back to the default with a warning.
//! The particle cap is clamped to `MAX_PARTICLE_CAP`.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::render::particles::DEFAULT_PARTICLE_CAP;
use crate::render::ModeKind;

pub const PRIMARY_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson";
pub const SECONDARY_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/4.5_day.geojson";

pub const DEFAULT_REFRESH: Duration = Duration::from_secs(300);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_HEADLESS_FRAMES: u64 = 120;
pub const MAX_PARTICLE_CAP: usize = 10_000;

#[derive(Clone, Debug, PartialEq)]
pub struct VisConfig {
    pub primary_url: String,
    pub secondary_url: String,
    pub refresh_interval: Duration,
    /// Applied to the primary request only
    pub timeout: Duration,
    pub particle_cap: usize,
    pub mode: ModeKind,
    pub headless_frames: u64,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            primary_url: PRIMARY_FEED_URL.to_string(),
            secondary_url: SECONDARY_FEED_URL.to_string(),
            refresh_interval: DEFAULT_REFRESH,
            timeout: DEFAULT_TIMEOUT,
            particle_cap: DEFAULT_PARTICLE_CAP,
            mode: ModeKind::default(),
            headless_frames: DEFAULT_HEADLESS_FRAMES,
        }
    }
}

impl VisConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Browser build: defaults, with `window.__quake_feed_url` overriding the primary feed
    #[cfg(all(feature = "wasm", target_arch = "wasm32"))]
    pub fn from_window() -> Self {
        let primary_url = js_sys::eval("window.__quake_feed_url")
            .ok()
            .and_then(|v| v.as_string())
            .filter(|url| !url.trim().is_empty());
        Self::from_lookup(|key| match key {
            "QUAKE_FEED_URL" => primary_url.clone(),
            _ => None,
        })
    }

    /// Build from any key lookup; unset or empty keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            primary_url: get("QUAKE_FEED_URL").unwrap_or(defaults.primary_url),
            secondary_url: get("QUAKE_FEED_FALLBACK_URL").unwrap_or(defaults.secondary_url),
            refresh_interval: Duration::from_secs(
                parse_or("QUAKE_REFRESH_SECS", get("QUAKE_REFRESH_SECS"), defaults.refresh_interval.as_secs())
                    .max(1),
            ),
            timeout: Duration::from_secs(
                parse_or("QUAKE_TIMEOUT_SECS", get("QUAKE_TIMEOUT_SECS"), defaults.timeout.as_secs()).max(1),
            ),
            particle_cap: clamp_particle_cap(parse_or(
                "QUAKE_PARTICLE_CAP",
                get("QUAKE_PARTICLE_CAP"),
                defaults.particle_cap,
            )),
            mode: parse_or("QUAKE_MODE", get("QUAKE_MODE"), defaults.mode),
            headless_frames: parse_or(
                "QUAKE_HEADLESS_FRAMES",
                get("QUAKE_HEADLESS_FRAMES"),
                defaults.headless_frames,
            ),
        }
    }
}

fn clamp_particle_cap(cap: usize) -> usize {
    if cap > MAX_PARTICLE_CAP {
        warn!(cap, max = MAX_PARTICLE_CAP, "Particle cap too large, clamping");
        MAX_PARTICLE_CAP
    } else {
        cap
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                warn!(key, value = %raw, error = %e, "Invalid config value, using default");
                default
            }
        },
    }
}
