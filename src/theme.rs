//! Dark seismograph theme: near-black canvas, blue grid tones, magnitude bands

use egui::Color32;

use crate::core::magnitude_color_rgb;

/// Palette shared by the app chrome and both render modes
pub mod colors {
    use super::Color32;

    // === Backgrounds ===
    pub const BG_PRIMARY: Color32 = Color32::from_rgb(12, 12, 12);        // #0C0C0C - canvas
    pub const BG_ELEVATED: Color32 = Color32::from_rgb(22, 24, 30);       // header / buttons
    pub const BG_HOVER: Color32 = Color32::from_rgb(34, 40, 52);

    // === Text ===
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(255, 255, 255);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(160, 170, 190);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(80, 86, 100);

    // === Lines & Borders ===
    pub const BORDER: Color32 = Color32::from_rgb(40, 44, 56);

    // === Status ===
    pub const STATUS_OK: Color32 = Color32::from_rgb(100, 200, 100);
    pub const STATUS_PENDING: Color32 = Color32::from_rgb(200, 200, 100);
    pub const STATUS_DEMO: Color32 = Color32::from_rgb(255, 100, 0);
}

/// Unmultiplied RGBA with float alpha, the way canvas colors are usually written.
#[inline]
pub fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Color for a magnitude band
pub fn magnitude_color(magnitude: f32) -> Color32 {
    let (r, g, b) = magnitude_color_rgb(magnitude);
    Color32::from_rgb(r, g, b)
}

/// Dark egui Visuals for the header and canvas panels.
/// Only panels, labels and the mode buttons are ever shown.
pub fn quake_visuals() -> egui::Visuals {
    use colors::*;

    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = BG_PRIMARY;
    visuals.override_text_color = Some(TEXT_PRIMARY);

    // Line between the header panel and the canvas
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, BORDER);

    visuals.widgets.inactive.bg_fill = BG_ELEVATED;
    visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, BORDER);
    visuals.widgets.inactive.weak_bg_fill = BG_ELEVATED;

    visuals.widgets.hovered.bg_fill = BG_HOVER;
    visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, TEXT_MUTED);
    visuals.widgets.hovered.weak_bg_fill = BG_HOVER;

    visuals.widgets.active.bg_fill = BG_HOVER;
    visuals.widgets.active.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.active.weak_bg_fill = BG_HOVER;

    // Active mode button
    visuals.selection.bg_fill = Color32::from_rgb(40, 70, 110);
    visuals.selection.stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);

    visuals
}
