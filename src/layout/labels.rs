use crate::config::model::FlightConfig;
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::layout::geometry::GeometrySnapshot;
use crate::layout::metrics::{LABEL_EDGE_INSET, LABEL_GAP, POINT_MARKER_RADIUS};
use crate::text::measure::TextMeasure;

/// Background of the first point's label.
pub const START_LABEL_BG: Rgba8 = Rgba8::from_hex(0x2563eb);
/// Background of the last point's label.
pub const DESTINATION_LABEL_BG: Rgba8 = Rgba8::from_hex(0x7c3aed);
/// Background of every other label.
pub const WAYPOINT_LABEL_BG: Rgba8 = Rgba8::from_hex(0x1e293b);
/// Label boxes are always filled at this alpha, whatever layer opacity is active.
pub const LABEL_BG_ALPHA: u8 = 235;

/// Which tag a label carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelRole {
    /// First point.
    Start,
    /// Any point between the first and the last.
    Waypoint,
    /// Last point.
    Destination,
}

/// Where one label box goes and what it shows.
///
/// `rect` uses kurbo's edges: `x0` left, `x1` right, `y0` top, `y1` bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelPlacement {
    /// Final (collision-free) box.
    pub rect: Rect,
    /// Lines of text, top to bottom.
    pub lines: Vec<String>,
    /// Box fill color (alpha already set to [`LABEL_BG_ALPHA`]).
    pub background: Rgba8,
    /// Tag role.
    pub role: LabelRole,
    /// The labelled point.
    pub point: Point,
    /// Where the connecting tick meets the box.
    pub anchor: Point,
    /// Height of one text line.
    pub line_height: f64,
    /// Inner horizontal padding.
    pub pad_x: f64,
    /// Inner vertical padding.
    pub pad_y: f64,
}

/// Build every label box for a snapshot, resolving overlaps in point order.
///
/// The result depends only on static configuration, so callers compute it once per snapshot.
pub fn place_labels(
    snapshot: &GeometrySnapshot,
    config: &FlightConfig,
    measure: &mut dyn TextMeasure,
) -> Vec<LabelPlacement> {
    let metrics = &snapshot.metrics;
    let size = metrics.label_font_size;
    let weight = metrics.label_font_weight;
    let pad_x = size * 0.6;
    let pad_y = size * 0.4;
    let line_height = size * 1.25;
    let canvas = metrics.canvas;
    let n = snapshot.points.len();

    let mut placements: Vec<LabelPlacement> = snapshot
        .points
        .iter()
        .enumerate()
        .map(|(i, &point)| {
            let role = if i == 0 {
                LabelRole::Start
            } else if i + 1 == n {
                LabelRole::Destination
            } else {
                LabelRole::Waypoint
            };
            let pair = format!(
                "{} @ {}",
                format_value(snapshot.values[i]),
                snapshot.times[i]
            );
            let (lines, background) = match role {
                LabelRole::Start => (
                    vec![config.labels.start_text().to_string(), pair],
                    START_LABEL_BG,
                ),
                LabelRole::Destination => (
                    vec![config.labels.destination_text().to_string(), pair],
                    DESTINATION_LABEL_BG,
                ),
                LabelRole::Waypoint => (vec![pair], WAYPOINT_LABEL_BG),
            };

            let text_w = lines
                .iter()
                .map(|l| measure.measure(l, size as f32, weight).width)
                .fold(0.0, f64::max);
            let w = text_w + 2.0 * pad_x;
            let h = lines.len() as f64 * line_height + 2.0 * pad_y;

            let max_left = (canvas.width_f64() - LABEL_EDGE_INSET - w).max(LABEL_EDGE_INSET);
            let left = (point.x - w / 2.0).clamp(LABEL_EDGE_INSET, max_left);
            let bottom = point.y - (POINT_MARKER_RADIUS + size * 0.8);
            let max_top = (canvas.height_f64() - h).max(0.0);
            let top = (bottom - h).clamp(0.0, max_top);

            LabelPlacement {
                rect: Rect::new(left, top, left + w, top + h),
                lines,
                background: background.with_alpha(LABEL_BG_ALPHA),
                role,
                point,
                anchor: point,
                line_height,
                pad_x,
                pad_y,
            }
        })
        .collect();

    let mut rects: Vec<Rect> = placements.iter().map(|p| p.rect).collect();
    resolve_collisions(&mut rects, LABEL_GAP);
    for (p, rect) in placements.iter_mut().zip(rects) {
        p.rect = rect;
        p.anchor = tick_anchor(p.point, rect);
    }
    placements
}

/// Push each box below every earlier box it collides with.
///
/// Boxes only ever move down, so a box that cleared an earlier one never collides with it again
/// and the pass terminates.
pub fn resolve_collisions(rects: &mut [Rect], gap: f64) {
    for i in 1..rects.len() {
        let (placed, rest) = rects.split_at_mut(i);
        let current = &mut rest[0];
        loop {
            let blocker = placed
                .iter()
                .filter(|prev| overlaps(current, prev, gap))
                .map(|prev| prev.y1)
                .fold(None, |acc: Option<f64>, b| Some(acc.map_or(b, |a| a.max(b))));
            let Some(bottom) = blocker else {
                break;
            };
            let h = current.height();
            current.y0 = bottom + gap;
            current.y1 = current.y0 + h;
        }
    }
}

fn overlaps(a: &Rect, b: &Rect, gap: f64) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 + gap && b.y0 < a.y1 + gap
}

fn tick_anchor(point: Point, rect: Rect) -> Point {
    let x = point.x.clamp(rect.x0, rect.x1);
    let y = if (point.y - rect.y1).abs() <= (point.y - rect.y0).abs() {
        rect.y1
    } else {
        rect.y0
    };
    Point::new(x, y)
}

/// Format a value with at most two decimals and no trailing zeros.
pub fn format_value(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/labels.rs"]
mod tests;
