//! Platform-agnostic core module - shared between the egui app and CLI

pub mod feed;
pub mod quake;

pub use feed::{
    demo_quakes, parse_feed, FeedError, FeedSource, FeedStats, FeedStatus, FeedUpdate, QuakeFeed,
    SharedFeed, DEMO_COUNT,
};
pub use quake::{magnitude_color_rgb, Coordinates, Quake};
