//! Earthquake record consumed by the renderers
//!
//! This module contains:
//! - Quake: immutable snapshot of one feed entry
//! - GeoJSON wire types (subset of the USGS summary feed)
//! - Conversion from a GeoJSON feature, with defaults for missing fields

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Quake
// ============================================================================

/// Longitude/latitude in degrees, depth in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f32,
    pub latitude: f32,
    pub depth_km: f32,
}

/// One earthquake as seen by the rendering core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quake {
    pub magnitude: f32,
    pub location: String,
    pub time: DateTime<Utc>,
    pub coordinates: Coordinates,
    /// Feed `type` property ("earthquake", "quarry blast", ...)
    pub category: Option<String>,
    /// Review status ("automatic", "reviewed", "demo")
    pub status: Option<String>,
    pub tsunami: bool,
    /// USGS significance score
    pub significance: Option<f32>,
}

impl Quake {
    #[inline]
    pub fn longitude(&self) -> f32 {
        self.coordinates.longitude
    }

    #[inline]
    pub fn latitude(&self) -> f32 {
        self.coordinates.latitude
    }

    #[inline]
    pub fn depth(&self) -> f32 {
        self.coordinates.depth_km
    }

    /// Short calendar date used by the tooltips.
    pub fn short_date(&self) -> String {
        self.time.format("%Y-%m-%d").to_string()
    }
}

/// Magnitude band color as RGB tuple
pub fn magnitude_color_rgb(magnitude: f32) -> (u8, u8, u8) {
    if magnitude < 2.5 {
        (144, 238, 144) // light green
    } else if magnitude < 4.5 {
        (255, 215, 0) // gold
    } else if magnitude < 6.0 {
        (255, 165, 0) // orange
    } else if magnitude < 7.0 {
        (255, 99, 71) // tomato
    } else {
        (255, 0, 0)
    }
}

// ============================================================================
// GeoJSON wire format
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub properties: FeatureProperties,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeatureProperties {
    pub mag: Option<f32>,
    pub place: Option<String>,
    /// Milliseconds since the Unix epoch
    pub time: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub tsunami: Option<u8>,
    pub sig: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub coordinates: Vec<Option<f32>>,
}

impl Feature {
    /// Convert to a Quake. Returns None when the geometry has fewer than two
    /// coordinates; every other missing field degrades to a default.
    pub fn into_quake(self) -> Option<Quake> {
        let coords = self.geometry?.coordinates;
        if coords.len() < 2 {
            return None;
        }
        let longitude = coords[0]?;
        let latitude = coords[1]?;
        let depth_km = coords.get(2).copied().flatten().unwrap_or(0.0);

        let props = self.properties;
        let time = props
            .time
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or(DateTime::UNIX_EPOCH);

        Some(Quake {
            magnitude: props.mag.unwrap_or(0.0).max(0.0),
            location: props.place.unwrap_or_else(|| "Unknown".to_string()),
            time,
            coordinates: Coordinates {
                longitude,
                latitude,
                depth_km,
            },
            category: props.kind,
            status: props.status,
            tsunami: props.tsunami.unwrap_or(0) != 0,
            significance: props.sig,
        })
    }
}
