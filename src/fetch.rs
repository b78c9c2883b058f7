//! HTTP retrieval of the USGS summary feeds
//!
//! One refresh cycle tries the primary feed (with a timeout on native), then
//! the secondary feed, then falls back to generated demo data. A cycle never
//! fails; the source of whatever it returns is recorded in `FeedUpdate`.

use std::time::Duration;

use chrono::Utc;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::VisConfig;
use crate::core::{demo_quakes, parse_feed, FeedError, FeedSource, FeedUpdate, Quake, DEMO_COUNT};

/// GET `url` and parse it as a GeoJSON feature collection.
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    timeout: Option<Duration>,
) -> Result<Vec<Quake>, FeedError> {
    #[allow(unused_mut)]
    let mut request = client.get(url);

    // Browser fetch has no per-request timeout here
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
    }
    #[cfg(target_arch = "wasm32")]
    let _ = timeout;

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status(status.as_u16()));
    }

    let body = response.text().await?;
    debug!(url, bytes = body.len(), "Feed downloaded");
    parse_feed(&body)
}

/// Run one refresh cycle: primary, then secondary, then demo data.
pub async fn fetch_with_fallback(client: &reqwest::Client, config: &VisConfig) -> FeedUpdate {
    match fetch_feed(client, &config.primary_url, Some(config.timeout)).await {
        Ok(quakes) => {
            info!(count = quakes.len(), url = %config.primary_url, "Loaded primary feed");
            return FeedUpdate {
                quakes,
                source: FeedSource::Primary,
            };
        }
        Err(e) => warn!(error = %e, url = %config.primary_url, "Primary feed failed"),
    }

    match fetch_feed(client, &config.secondary_url, None).await {
        Ok(quakes) => {
            info!(count = quakes.len(), url = %config.secondary_url, "Loaded secondary feed");
            return FeedUpdate {
                quakes,
                source: FeedSource::Secondary,
            };
        }
        Err(e) => warn!(error = %e, url = %config.secondary_url, "Secondary feed failed"),
    }

    FeedUpdate {
        quakes: demo_quakes(DEMO_COUNT, Utc::now(), &mut SmallRng::from_entropy()),
        source: FeedSource::Demo,
    }
}
