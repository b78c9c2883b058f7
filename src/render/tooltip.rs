//! Hover tooltip shared by both render modes
//!
//! Placement prefers the space above the anchor, flips below when the box
//! would cross the top edge, then clamps into the viewport. A short connector
//! joins the anchor to the facing box edge, unless the clamp left the box
//! covering the anchor.

use egui::{Align2, FontId, Pos2, Rect, Stroke, Vec2};

use super::canvas::{round_rect, Canvas};
use crate::core::Quake;
use crate::theme::{magnitude_color, rgba};

/// Per-mode tooltip geometry and text rules
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TooltipStyle {
    pub size: Vec2,
    /// Gap between box and anchor, and minimum distance to viewport edges
    pub margin: f32,
    /// Location labels longer than this many chars are ellipsized
    pub location_limit: usize,
    /// Connector starts this far from the anchor
    pub connector_gap: f32,
    pub connector_width: f32,
    pub background_alpha: f32,
    /// Prefix for the date line ("" or "Date: ")
    pub date_prefix: &'static str,
}

impl TooltipStyle {
    pub const ARTISTIC: TooltipStyle = TooltipStyle {
        size: Vec2::new(180.0, 90.0),
        margin: 10.0,
        location_limit: 20,
        connector_gap: 3.0,
        connector_width: 1.0,
        background_alpha: 0.8,
        date_prefix: "",
    };

    pub const GEOGRAPHIC: TooltipStyle = TooltipStyle {
        size: Vec2::new(200.0, 100.0),
        margin: 10.0,
        location_limit: 25,
        connector_gap: 5.0,
        connector_width: 1.5,
        background_alpha: 0.9,
        date_prefix: "Date: ",
    };
}

/// Where the box ended up
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TooltipPlacement {
    pub rect: Rect,
    /// True when the final box sits entirely below the anchor
    pub below: bool,
    /// Connector from near the anchor to the facing box edge. None when the
    /// box overlaps the anchor vertically or its edge is within the gap.
    pub connector: Option<[Pos2; 2]>,
}

/// Compute the tooltip box for an anchor in a viewport.
pub fn place_tooltip(anchor: Pos2, style: &TooltipStyle, viewport: Vec2) -> TooltipPlacement {
    let TooltipStyle { size, margin, .. } = *style;

    let mut x = anchor.x - size.x / 2.0;
    let mut y = anchor.y - size.y - margin;

    if y < margin {
        y = anchor.y + margin;
    }

    // Right edge first so a too-narrow viewport still pins to the left margin
    x = x.min(viewport.x - size.x - margin).max(margin);
    y = y.min(viewport.y - size.y - margin).max(margin);

    let rect = Rect::from_min_size(Pos2::new(x, y), size);
    let gap = style.connector_gap;
    let below = rect.top() >= anchor.y;
    let connector = if below && rect.top() > anchor.y + gap {
        Some([Pos2::new(anchor.x, anchor.y + gap), Pos2::new(anchor.x, rect.top())])
    } else if rect.bottom() < anchor.y - gap {
        Some([Pos2::new(anchor.x, anchor.y - gap), Pos2::new(anchor.x, rect.bottom())])
    } else {
        None
    };

    TooltipPlacement {
        rect,
        below,
        connector,
    }
}

/// Ellipsize labels longer than `limit` chars: keep `limit - 3` chars plus "...".
pub fn truncate_label(label: &str, limit: usize) -> String {
    if label.chars().count() <= limit {
        return label.to_string();
    }
    let kept: String = label.chars().take(limit.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Text lines shown for a quake, in draw order
pub fn tooltip_lines(quake: &Quake, style: &TooltipStyle) -> [String; 4] {
    [
        format!("Magnitude: {:.1}", quake.magnitude),
        format!(
            "Location: {}",
            truncate_label(&quake.location, style.location_limit)
        ),
        format!("Depth: {:.1} km", quake.depth()),
        format!("{}{}", style.date_prefix, quake.short_date()),
    ]
}

/// Draw the tooltip for `quake` anchored at `anchor`. Returns the placement.
pub fn draw_tooltip(
    canvas: &mut dyn Canvas,
    quake: &Quake,
    anchor: Pos2,
    style: &TooltipStyle,
) -> TooltipPlacement {
    let placement = place_tooltip(anchor, style, canvas.viewport());
    let rect = placement.rect;
    let accent = magnitude_color(quake.magnitude);

    let base_alpha = canvas.alpha();
    canvas.set_alpha(1.0);

    canvas.fill_path(&round_rect(rect, 4.0), rgba(0, 0, 0, style.background_alpha));
    canvas.stroke_rect(rect, Stroke::new(2.0, accent));

    let [magnitude, location, depth, date] = tooltip_lines(quake, style);
    let left = rect.left() + 10.0;
    // Baselines roughly follow the box height (90 → 20/40/60/75)
    let h = rect.height();
    let rows = [h * 0.22, h * 0.44, h * 0.66, h * 0.84];

    canvas.text(
        Pos2::new(left, rect.top() + rows[0]),
        Align2::LEFT_BOTTOM,
        &magnitude,
        FontId::proportional(14.0),
        accent,
    );
    for (text, row) in [(&location, rows[1]), (&depth, rows[2]), (&date, rows[3])] {
        canvas.text(
            Pos2::new(left, rect.top() + row),
            Align2::LEFT_BOTTOM,
            text,
            FontId::proportional(12.0),
            egui::Color32::WHITE,
        );
    }

    if let Some([from, to]) = placement.connector {
        canvas.line(from, to, Stroke::new(style.connector_width, accent));
    }

    canvas.set_alpha(base_alpha);
    placement
}
