//! Earthquake visualization
//!
//! Pulls the USGS earthquake summary feed and animates it in one of two modes:
//! - Artistic: events orbit the center, radius by magnitude, with particles
//! - Geographic: events on an equirectangular world map, pulsing by magnitude
//!
//! The render modes draw through the `Canvas` trait, so the same code runs in
//! the egui app (desktop and browser) and headless in the CLI and tests.

pub mod config;
pub mod core;
pub mod driver;
pub mod render;
pub mod theme;

#[cfg(feature = "net")]
pub mod fetch;

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub mod refresh_native;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod refresh_wasm;

#[cfg(any(
    all(feature = "native", not(target_arch = "wasm32")),
    all(feature = "wasm", target_arch = "wasm32")
))]
pub mod app;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod web {
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::app::QuakeApp;
    use crate::config::VisConfig;

    #[wasm_bindgen(start)]
    pub fn main() {
        console_error_panic_hook::set_once();

        // Initialize tracing for browser console
        tracing_wasm::set_as_global_default();

        let web_options = eframe::WebOptions::default();
        let config = VisConfig::from_window();

        wasm_bindgen_futures::spawn_local(async move {
            let canvas = web_sys::window()
                .expect("no window")
                .document()
                .expect("no document")
                .get_element_by_id("canvas")
                .expect("no canvas element")
                .dyn_into::<web_sys::HtmlCanvasElement>()
                .expect("not a canvas element");

            eframe::WebRunner::new()
                .start(
                    canvas,
                    web_options,
                    Box::new(|cc| Ok(Box::new(QuakeApp::new(cc, config)))),
                )
                .await
                .expect("Failed to start eframe");
        });
    }
}
