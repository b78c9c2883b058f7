//! Standalone CLI for the feed pipeline and headless rendering
//!
//! Run with: cargo run --bin quake-cli --features cli

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use quake_vis::config::VisConfig;
    use quake_vis::core::{FeedStats, QuakeFeed, SharedFeed};
    use quake_vis::driver::{run_headless, AnimationDriver};
    use quake_vis::fetch::fetch_with_fallback;
    use quake_vis::render::canvas::RecordingCanvas;
    use quake_vis::render::ModeKind;
    use tracing::info;

    /// Pipeline state carried across refresh cycles
    pub struct Pipeline {
        pub config: VisConfig,
        pub client: reqwest::Client,
        pub feed: SharedFeed,
        pub driver: AnimationDriver,
        pub canvas: RecordingCanvas,
    }

    impl Pipeline {
        pub fn new(config: VisConfig) -> Self {
            Self {
                client: reqwest::Client::new(),
                feed: SharedFeed::new(),
                driver: AnimationDriver::new(config.particle_cap, config.mode),
                canvas: RecordingCanvas::new(1280.0, 720.0),
                config,
            }
        }

        /// Fetch, publish, log stats, then render headless frames in every mode.
        /// Yields between stages so a surrounding `select!` can cancel it.
        pub async fn cycle(&mut self) {
            let update = fetch_with_fallback(&self.client, &self.config).await;
            let source = update.source;
            self.feed.replace(update);

            let stats = FeedStats::from_quakes(&self.feed.current());
            info!(
                source = source.label(),
                events = stats.total,
                strongest = %stats.strongest_label(),
                latest = stats.latest_location.as_deref().unwrap_or("-"),
                "stats"
            );

            // Exercise both modes; the configured one is left active
            let configured = self.config.mode;
            for &kind in ModeKind::ALL.iter().filter(|&&k| k != configured).chain([&configured]) {
                tokio::task::yield_now().await;
                self.driver.set_mode_kind(kind);
                let run = run_headless(
                    &mut self.driver,
                    &mut self.canvas,
                    &self.feed,
                    self.config.headless_frames,
                );
                info!(
                    mode = %kind,
                    frames = run.frames,
                    drawn = run.drawn,
                    ops = self.canvas.ops.len(),
                    particles = self.driver.artistic().particles().len(),
                    "headless frames"
                );
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::time::Duration;

        fn offline_config() -> VisConfig {
            VisConfig {
                primary_url: "http://127.0.0.1:9/all_day.geojson".to_string(),
                secondary_url: "http://127.0.0.1:9/4.5_day.geojson".to_string(),
                timeout: Duration::from_secs(2),
                headless_frames: 3,
                ..VisConfig::default()
            }
        }

        #[tokio::test]
        async fn test_cycle_yields_to_interrupt() {
            let mut pipeline = Pipeline::new(offline_config());
            let interrupted = tokio::select! {
                biased;
                _ = pipeline.cycle() => false,
                _ = std::future::ready(()) => true,
            };
            assert!(interrupted);
        }

        #[tokio::test]
        async fn test_cycle_leaves_configured_mode_active() {
            let mut pipeline = Pipeline::new(offline_config());
            pipeline.cycle().await;
            assert_eq!(pipeline.driver.mode(), pipeline.config.mode);
            assert!(!pipeline.feed.current().is_empty());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use quake_vis::config::VisConfig;
    use tracing::info;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,quake_vis=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let config = VisConfig::from_env();
    info!(
        primary = %config.primary_url,
        secondary = %config.secondary_url,
        every_secs = config.refresh_interval.as_secs(),
        "Starting feed pipeline"
    );

    let mut refresh = tokio::time::interval(config.refresh_interval);
    let mut pipeline = cli::Pipeline::new(config);

    // One listener for the whole run, observed during waits and cycles alike
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = refresh.tick() => {}
            _ = &mut ctrl_c => break,
        }
        tokio::select! {
            _ = pipeline.cycle() => {}
            _ = &mut ctrl_c => break,
        }
    }

    info!("Interrupted, shutting down");
    pipeline.driver.stop();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
