//! Feed data: GeoJSON parsing, demo fallback, shared snapshot and stats
//!
//! The renderers only ever see `QuakeFeed::current()`. Everything else here
//! belongs to the provider side: turning a USGS summary document into
//! `Vec<Quake>`, generating demo data when every endpoint failed, and
//! publishing the latest sequence as a single reference swap.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

use super::quake::{Coordinates, FeatureCollection, Quake};

/// Locations used for demo data when no live endpoint answers.
pub const DEMO_LOCATIONS: &[&str] = &[
    "San Francisco Bay area, California",
    "Tokyo, Japan",
    "Ring of Fire, Pacific Ocean",
    "Chile Coast",
    "Indonesia",
    "Alaska Peninsula",
    "Mediterranean Sea",
    "New Zealand",
];

/// Number of demo events generated on total failure
pub const DEMO_COUNT: usize = 30;

#[derive(Debug, Error)]
pub enum FeedError {
    #[cfg(feature = "net")]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("malformed feed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("feed contains no earthquakes")]
    Empty,
}

/// Parse a USGS GeoJSON summary document into a newest-first sequence.
///
/// Features without at least two coordinates are dropped.
pub fn parse_feed(json: &str) -> Result<Vec<Quake>, FeedError> {
    let collection: FeatureCollection = serde_json::from_str(json)?;
    if collection.features.is_empty() {
        return Err(FeedError::Empty);
    }

    let total = collection.features.len();
    let mut quakes: Vec<Quake> = collection
        .features
        .into_iter()
        .filter_map(|f| f.into_quake())
        .collect();

    if quakes.len() < total {
        debug!(dropped = total - quakes.len(), "Skipped features without coordinates");
    }
    if quakes.is_empty() {
        return Err(FeedError::Empty);
    }

    sort_newest_first(&mut quakes);
    Ok(quakes)
}

/// Order by descending occurrence time.
pub fn sort_newest_first(quakes: &mut [Quake]) {
    quakes.sort_by(|a, b| b.time.cmp(&a.time));
}

/// Synthetic events used as the last-resort fallback.
pub fn demo_quakes<R: Rng>(count: usize, now: DateTime<Utc>, rng: &mut R) -> Vec<Quake> {
    let mut quakes: Vec<Quake> = (0..count)
        .map(|_| {
            let location = DEMO_LOCATIONS[rng.gen_range(0..DEMO_LOCATIONS.len())];
            let age_ms = rng.gen_range(0..86_400_000i64);
            let depth_km = rng.gen_range(0.0..100.0);
            Quake {
                magnitude: rng.gen_range(2.0..7.0),
                location: location.to_string(),
                time: now - Duration::milliseconds(age_ms),
                coordinates: Coordinates {
                    longitude: rng.gen_range(-180.0..180.0),
                    latitude: rng.gen_range(-90.0..90.0),
                    depth_km,
                },
                category: Some("earthquake".to_string()),
                status: Some("demo".to_string()),
                tsunami: false,
                significance: Some(rng.gen_range(0.0..1000.0)),
            }
        })
        .collect();
    sort_newest_first(&mut quakes);
    quakes
}

// ============================================================================
// Source / status
// ============================================================================

/// Where the current sequence came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedSource {
    Primary,
    Secondary,
    Demo,
}

impl FeedSource {
    pub fn label(self) -> &'static str {
        match self {
            FeedSource::Primary => "live",
            FeedSource::Secondary => "live (M4.5+)",
            FeedSource::Demo => "demo",
        }
    }
}

/// Provider state shown in the header
#[derive(Clone, Debug, PartialEq)]
pub enum FeedStatus {
    Loading,
    Ready(FeedSource),
}

impl FeedStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, FeedStatus::Ready(_))
    }
}

/// Result of one refresh cycle
#[derive(Clone, Debug)]
pub struct FeedUpdate {
    pub quakes: Vec<Quake>,
    pub source: FeedSource,
}

// ============================================================================
// QuakeFeed - consumed interface
// ============================================================================

/// The renderers' view of the data provider.
///
/// Returns the latest sequence, newest first. The returned `Arc` may differ
/// from frame to frame; callers recompute everything instead of diffing.
pub trait QuakeFeed {
    fn current(&self) -> Arc<Vec<Quake>>;
}

impl QuakeFeed for Arc<Vec<Quake>> {
    fn current(&self) -> Arc<Vec<Quake>> {
        self.clone()
    }
}

struct FeedInner {
    quakes: Arc<Vec<Quake>>,
    status: FeedStatus,
    generation: u64,
    updated_at: Option<DateTime<Utc>>,
}

/// Latest-sequence slot shared between the refresher and the render loop.
#[derive(Clone)]
pub struct SharedFeed {
    inner: Arc<Mutex<FeedInner>>,
}

impl Default for SharedFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedFeed {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FeedInner {
                quakes: Arc::new(Vec::new()),
                status: FeedStatus::Loading,
                generation: 0,
                updated_at: None,
            })),
        }
    }

    /// Swap in a new sequence. The old one is dropped once no frame holds it.
    pub fn replace(&self, update: FeedUpdate) {
        if update.source == FeedSource::Demo {
            warn!(count = update.quakes.len(), "Using demo data - live feed unavailable");
        }
        let mut inner = self.inner.lock();
        inner.quakes = Arc::new(update.quakes);
        inner.status = FeedStatus::Ready(update.source);
        inner.generation += 1;
        inner.updated_at = Some(Utc::now());
        debug!(
            generation = inner.generation,
            count = inner.quakes.len(),
            source = update.source.label(),
            "Feed replaced"
        );
    }

    pub fn status(&self) -> FeedStatus {
        self.inner.lock().status.clone()
    }

    /// Number of successful replacements so far (0 = nothing loaded yet)
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().updated_at
    }
}

impl QuakeFeed for SharedFeed {
    fn current(&self) -> Arc<Vec<Quake>> {
        self.inner.lock().quakes.clone()
    }
}

// ============================================================================
// FeedStats - header / CLI summary
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct FeedStats {
    pub total: usize,
    pub strongest: Option<f32>,
    pub latest_location: Option<String>,
}

impl FeedStats {
    pub fn from_quakes(quakes: &[Quake]) -> Self {
        let strongest = quakes
            .iter()
            .map(|q| q.magnitude)
            .fold(None, |best: Option<f32>, m| Some(best.map_or(m, |b| b.max(m))));
        let latest_location = quakes
            .iter()
            .max_by_key(|q| q.time)
            .map(|q| q.location.clone());
        Self {
            total: quakes.len(),
            strongest,
            latest_location,
        }
    }

    /// Strongest magnitude with one decimal, "-" for an empty feed
    pub fn strongest_label(&self) -> String {
        self.strongest
            .map(|m| format!("{:.1}", m))
            .unwrap_or_else(|| "-".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const FEED: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"properties": {"mag": 2.1, "place": "Older", "time": 1000},
             "geometry": {"coordinates": [10.0, 20.0, 5.0]}},
            {"properties": {"mag": 5.6, "place": "Newest", "time": 3000},
             "geometry": {"coordinates": [-70.0, -30.0, 35.0]}},
            {"properties": {"mag": 3.3, "place": "Broken", "time": 5000},
             "geometry": {"coordinates": [1.0]}},
            {"properties": {"mag": 1.2, "place": "Middle", "time": 2000},
             "geometry": {"coordinates": [0.0, 0.0]}}
        ]
    }"#;

    fn quake_at(mag: f32, secs: i64, place: &str) -> Quake {
        Quake {
            magnitude: mag,
            location: place.to_string(),
            time: DateTime::from_timestamp(secs, 0).expect("valid timestamp"),
            coordinates: Coordinates::default(),
            category: None,
            status: None,
            tsunami: false,
            significance: None,
        }
    }

    #[test]
    fn test_parse_feed_sorts_and_drops() {
        let quakes = parse_feed(FEED).expect("feed parses");
        let places: Vec<&str> = quakes.iter().map(|q| q.location.as_str()).collect();
        assert_eq!(places, vec!["Newest", "Middle", "Older"]);
    }

    #[test]
    fn test_parse_feed_empty() {
        let err = parse_feed(r#"{"type": "FeatureCollection", "features": []}"#).unwrap_err();
        assert!(matches!(err, FeedError::Empty));
    }

    #[test]
    fn test_parse_feed_malformed() {
        let err = parse_feed("not json").unwrap_err();
        assert!(matches!(err, FeedError::Json(_)));
    }

    #[test]
    fn test_demo_quakes_ranges() {
        let mut rng = SmallRng::seed_from_u64(7);
        let now = Utc::now();
        let quakes = demo_quakes(DEMO_COUNT, now, &mut rng);

        assert_eq!(quakes.len(), DEMO_COUNT);
        for q in &quakes {
            assert!((2.0..7.0).contains(&q.magnitude));
            assert!((-180.0..180.0).contains(&q.longitude()));
            assert!((-90.0..90.0).contains(&q.latitude()));
            assert!((0.0..100.0).contains(&q.depth()));
            assert!(q.time <= now && q.time > now - Duration::days(1));
            assert_eq!(q.status.as_deref(), Some("demo"));
            assert!(DEMO_LOCATIONS.contains(&q.location.as_str()));
        }
        assert!(quakes.windows(2).all(|w| w[0].time >= w[1].time));
    }

    #[test]
    fn test_shared_feed_replace_swaps_reference() {
        let feed = SharedFeed::new();
        assert_eq!(feed.generation(), 0);
        assert_eq!(feed.status(), FeedStatus::Loading);
        assert!(feed.current().is_empty());

        let before = feed.current();
        feed.replace(FeedUpdate {
            quakes: vec![quake_at(3.0, 10, "A")],
            source: FeedSource::Primary,
        });
        let after = feed.current();

        assert!(!Arc::ptr_eq(&before, &after));
        assert!(before.is_empty());
        assert_eq!(after.len(), 1);
        assert_eq!(feed.generation(), 1);
        assert_eq!(feed.status(), FeedStatus::Ready(FeedSource::Primary));
        assert!(feed.updated_at().is_some());
    }

    #[test]
    fn test_feed_stats() {
        let quakes = vec![
            quake_at(2.0, 100, "Old strong-ish"),
            quake_at(6.4, 50, "Oldest strongest"),
            quake_at(1.0, 300, "Latest"),
        ];
        let stats = FeedStats::from_quakes(&quakes);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.strongest, Some(6.4));
        assert_eq!(stats.strongest_label(), "6.4");
        assert_eq!(stats.latest_location.as_deref(), Some("Latest"));

        let empty = FeedStats::from_quakes(&[]);
        assert_eq!(empty.total, 0);
        assert_eq!(empty.strongest_label(), "-");
        assert_eq!(empty.latest_location, None);
    }
}
