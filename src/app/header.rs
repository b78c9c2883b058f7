//! Header bar with mode switch, feed status and stats

use std::collections::VecDeque;

use eframe::egui;

use super::QuakeApp;
use crate::core::{FeedSource, FeedStats, FeedStatus, QuakeFeed};
use crate::render::ModeKind;
use crate::theme::colors;

impl QuakeApp {
    pub(crate) fn render_header(&mut self, ui: &mut egui::Ui) {
        let now = ui.input(|i| i.time);
        self.fps_counter.tick(now);

        let status = self.refresher.feed.status();
        let updated_at = self.refresher.feed.updated_at();
        let stats = FeedStats::from_quakes(&self.refresher.feed.current());

        ui.horizontal(|ui| {
            // LEFT: mode switch
            for &kind in ModeKind::ALL {
                let active = self.driver.mode() == kind;
                let color = if active {
                    colors::TEXT_PRIMARY
                } else {
                    colors::TEXT_MUTED
                };
                if ui
                    .selectable_label(active, egui::RichText::new(kind.label()).color(color))
                    .clicked()
                {
                    self.driver.set_mode_kind(kind);
                }
            }

            // RIGHT: status and stats (right-to-left order)
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if self.driver.mode() == ModeKind::Artistic && self.driver.is_running() {
                    let particles = self.driver.artistic().particles();
                    ui.label(
                        egui::RichText::new(format!("{}/{} particles", particles.len(), particles.cap()))
                            .color(colors::TEXT_MUTED),
                    );
                    ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));
                }

                if let Some(report) = self.last_report {
                    ui.label(
                        egui::RichText::new(format!("{} on screen", report.drawn))
                            .color(colors::TEXT_MUTED),
                    );
                    ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));
                }

                ui.label(
                    egui::RichText::new(format!("max M{}", stats.strongest_label()))
                        .color(colors::TEXT_MUTED),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));

                ui.label(
                    egui::RichText::new(format!("{} events", stats.total)).color(colors::TEXT_MUTED),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));

                ui.label(
                    egui::RichText::new(format!("{:.0} fps", self.fps_counter.fps()))
                        .color(colors::TEXT_SECONDARY),
                );

                ui.add_space(10.0);

                let (status_color, status_text) = match status {
                    FeedStatus::Loading => (colors::STATUS_PENDING, "Loading...".to_string()),
                    FeedStatus::Ready(FeedSource::Demo) => {
                        (colors::STATUS_DEMO, FeedSource::Demo.label().to_string())
                    }
                    FeedStatus::Ready(source) => match updated_at {
                        Some(at) => (
                            colors::STATUS_OK,
                            format!("{} @ {}", source.label(), at.format("%H:%M:%S UTC")),
                        ),
                        None => (colors::STATUS_OK, source.label().to_string()),
                    },
                };
                let response = ui.colored_label(status_color, egui::RichText::new(status_text));
                if let Some(latest) = &stats.latest_location {
                    response.on_hover_text(format!("Latest: {latest}"));
                }
            });
        });
    }
}

/// FPS over the last 60 frames, fed with egui's input time (seconds)
pub struct FpsCounter {
    frames: VecDeque<f64>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frames: VecDeque::with_capacity(61),
        }
    }

    pub fn tick(&mut self, now: f64) {
        self.frames.push_back(now);
        if self.frames.len() > 60 {
            self.frames.pop_front();
        }
    }

    pub fn fps(&self) -> f64 {
        let (Some(first), Some(last)) = (self.frames.front(), self.frames.back()) else {
            return 0.0;
        };
        let elapsed = last - first;
        if elapsed <= 0.0 {
            return 0.0;
        }
        (self.frames.len() as f64 - 1.0) / elapsed
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_counter() {
        let mut counter = FpsCounter::new();
        assert_eq!(counter.fps(), 0.0);
        counter.tick(1.0);
        assert_eq!(counter.fps(), 0.0);

        for i in 1..=120 {
            counter.tick(1.0 + i as f64 / 60.0);
        }
        assert!((counter.fps() - 60.0).abs() < 1e-6);
    }
}
