//! Native feed refresher
//!
//! Runs a tokio runtime on a background thread and publishes each refresh
//! cycle into a `SharedFeed`. The UI thread only ever reads the feed.

use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::Notify;
use tracing::{error, info, warn};

use crate::config::VisConfig;
use crate::core::SharedFeed;
use crate::fetch::fetch_with_fallback;

/// Background refresh loop handle. Dropping it cancels any wait or
/// in-flight fetch and joins the thread.
pub struct FeedRefresher {
    /// Latest sequence and provider status
    pub feed: SharedFeed,
    shutdown: Arc<Notify>,
    handle: Option<JoinHandle<()>>,
}

impl FeedRefresher {
    /// Spawn the refresh thread. The first cycle starts immediately and
    /// `on_update` runs after every replacement, e.g. to request a repaint.
    pub fn spawn(config: VisConfig, on_update: impl Fn() + Send + 'static) -> Self {
        let feed = SharedFeed::new();
        let shutdown = Arc::new(Notify::new());

        let feed_clone = feed.clone();
        let shutdown_clone = shutdown.clone();

        let handle = std::thread::Builder::new()
            .name("quake-feed".to_string())
            .spawn(move || {
                let rt = match tokio::runtime::Runtime::new() {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!(error = %e, "Failed to create tokio runtime");
                        return;
                    }
                };
                rt.block_on(Self::run(config, feed_clone, shutdown_clone, on_update));
            })
            .map_err(|e| error!(error = %e, "Failed to spawn feed thread"))
            .ok();

        Self {
            feed,
            shutdown,
            handle,
        }
    }

    async fn run(
        config: VisConfig,
        feed: SharedFeed,
        shutdown: Arc<Notify>,
        on_update: impl Fn() + Send + 'static,
    ) {
        let client = reqwest::Client::new();
        let mut interval = tokio::time::interval(config.refresh_interval);

        info!(
            url = %config.primary_url,
            every_secs = config.refresh_interval.as_secs(),
            "Feed refresher started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown.notified() => break,
            }
            let update = tokio::select! {
                update = fetch_with_fallback(&client, &config) => update,
                _ = shutdown.notified() => break,
            };
            feed.replace(update);
            on_update();
        }

        info!("Feed refresher stopped");
    }
}

impl Drop for FeedRefresher {
    fn drop(&mut self) {
        // Stored as a permit if the loop is between awaits
        self.shutdown.notify_one();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Feed thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FeedSource, FeedStatus, QuakeFeed};
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    #[test]
    fn test_drop_stops_thread_without_waiting_for_interval() {
        let config = VisConfig {
            primary_url: "http://127.0.0.1:9/all_day.geojson".to_string(),
            secondary_url: "http://127.0.0.1:9/4.5_day.geojson".to_string(),
            timeout: Duration::from_secs(2),
            refresh_interval: Duration::from_secs(3600),
            ..VisConfig::default()
        };
        let (tx, rx) = mpsc::channel();
        let refresher = FeedRefresher::spawn(config, move || {
            let _ = tx.send(());
        });

        rx.recv_timeout(Duration::from_secs(30)).expect("first cycle");
        assert_eq!(refresher.feed.status(), FeedStatus::Ready(FeedSource::Demo));
        assert!(!refresher.feed.current().is_empty());

        let started = Instant::now();
        drop(refresher);
        assert!(started.elapsed() < Duration::from_secs(5));
        // Thread is gone, so the callback sender was dropped with it
        assert!(matches!(rx.recv_timeout(Duration::from_secs(1)), Err(mpsc::RecvTimeoutError::Disconnected)));
    }
}
