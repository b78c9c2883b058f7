//! Desktop app
//!
//! Run with: cargo run --bin quake-vis --features native

use quake_vis::app::QuakeApp;
use quake_vis::config::VisConfig;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,quake_vis=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let config = VisConfig::from_env();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Earthquake Visualization")
            .with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "quake-vis",
        options,
        Box::new(|cc| Ok(Box::new(QuakeApp::new(cc, config)))),
    )?;
    Ok(())
}
