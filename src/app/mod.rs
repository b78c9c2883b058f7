//! Earthquake visualization app
//!
//! One egui app for desktop and browser. The feed refresher runs in the
//! background; every egui frame hands the latest sequence to the animation
//! driver, which draws into the central panel through a `PainterCanvas`.

mod header;

use eframe::egui;
use tracing::info;

use crate::config::VisConfig;
use crate::core::QuakeFeed;
use crate::driver::AnimationDriver;
use crate::render::painter::PainterCanvas;
use crate::render::FrameReport;
use crate::theme::{colors, quake_visuals};

#[cfg(not(target_arch = "wasm32"))]
use crate::refresh_native::FeedRefresher;
#[cfg(target_arch = "wasm32")]
use crate::refresh_wasm::FeedRefresher;

pub struct QuakeApp {
    driver: AnimationDriver,
    /// Background feed refresh (kept alive for the app's lifetime)
    refresher: FeedRefresher,
    pub(crate) fps_counter: header::FpsCounter,
    /// Result of the last drawn frame
    pub(crate) last_report: Option<FrameReport>,
}

impl QuakeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: VisConfig) -> Self {
        cc.egui_ctx.set_visuals(quake_visuals());

        info!(
            primary = %config.primary_url,
            secondary = %config.secondary_url,
            mode = %config.mode,
            "Feed configuration resolved"
        );

        let ctx = cc.egui_ctx.clone();
        let driver = AnimationDriver::new(config.particle_cap, config.mode);
        let refresher = FeedRefresher::spawn(config, move || ctx.request_repaint());

        Self {
            driver,
            refresher,
            fps_counter: header::FpsCounter::new(),
            last_report: None,
        }
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        let rect = response.rect;
        let mut canvas = PainterCanvas::new(&painter, rect);

        match response.hover_pos() {
            Some(pos) => self.driver.set_pointer(canvas.to_local(pos)),
            None => self.driver.clear_pointer(),
        }

        let quakes = self.refresher.feed.current();
        let mut scheduler = ui.ctx().clone();
        match self.driver.tick(&mut canvas, &quakes, &mut scheduler) {
            Some(report) => {
                ui.ctx().set_cursor_icon(report.cursor);
                self.last_report = Some(report);
            }
            None => {
                painter.rect_filled(rect, 0.0, colors::BG_PRIMARY);
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Loading earthquake data...",
                    egui::FontId::proportional(16.0),
                    colors::TEXT_SECONDARY,
                );
            }
        }
    }
}

impl eframe::App for QuakeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // First successful load starts the loop; later loads just swap data
        if !self.driver.is_running() && self.refresher.feed.generation() > 0 {
            self.driver.start(&mut ctx.clone());
        }

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::new().fill(colors::BG_ELEVATED).inner_margin(4.0))
            .show(ctx, |ui| {
                self.render_header(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY))
            .show(ctx, |ui| {
                self.render_canvas(ui);
            });
    }
}
