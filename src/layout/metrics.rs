use crate::config::model::{FlightConfig, WatermarkConfig, WatermarkKind, WatermarkPosition};
use crate::foundation::core::{Canvas, Rect};
use crate::text::measure::TextMeasure;

/// Square the moving marker icon is drawn into.
pub const MARKER_ICON_SIZE: f64 = 72.0;
/// Radius of the solid point markers.
pub const POINT_MARKER_RADIUS: f64 = 9.0;
/// Small constant that keeps the chart from looking crammed against the edges.
pub const OPTICAL_BALANCE: f64 = 12.0;
/// Header reservation without any text.
pub const HEADER_BASE: f64 = 72.0;
/// Where the header cursor starts when no top watermark is present.
pub const HEADER_TOP_INSET: f64 = 36.0;
/// Title typography.
pub const TITLE_FONT_SIZE: f32 = 56.0;
/// Vertical space taken by the title line.
pub const TITLE_BLOCK: f64 = 80.0;
/// Description typography.
pub const DESCRIPTION_FONT_SIZE: f32 = 32.0;
/// Vertical space taken by the description line.
pub const DESCRIPTION_BLOCK: f64 = 52.0;
/// Stroke width of the travelled path.
pub const PATH_STROKE_WIDTH: f64 = 6.0;
/// Dash pattern of the travelled path (on, off).
pub const PATH_DASH: [f64; 2] = [18.0, 12.0];
/// Minimum vertical gap between stacked labels.
pub const LABEL_GAP: f64 = 6.0;
/// Horizontal inset that keeps labels inside the canvas.
pub const LABEL_EDGE_INSET: f64 = 8.0;
/// Multiple of the label font size reserved above the chart for the highest labels.
pub const LABEL_HEADROOM_EM: f64 = 4.5;

/// Rendered size of the watermark, estimated before any frame is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatermarkSize {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Font size for text watermarks (unused for images).
    pub font_size: f32,
}

impl WatermarkSize {
    /// Estimate the watermark box.
    ///
    /// Images scale to `min(width, height) * size_ratio` wide and keep their natural aspect
    /// ratio; text uses a font size derived from the same base.
    pub fn estimate(
        wm: &WatermarkConfig,
        canvas: Canvas,
        image_natural_size: Option<(u32, u32)>,
        measure: &mut dyn TextMeasure,
    ) -> Self {
        let base = canvas.width_f64().min(canvas.height_f64()) * wm.size_ratio;
        match wm.kind {
            WatermarkKind::Image => {
                let aspect = image_natural_size
                    .filter(|(w, h)| *w > 0 && *h > 0)
                    .map(|(w, h)| f64::from(h) / f64::from(w))
                    .unwrap_or(1.0);
                Self {
                    width: base,
                    height: base * aspect,
                    font_size: 0.0,
                }
            }
            WatermarkKind::Text => {
                let font_size = (base * 0.2).max(12.0) as f32;
                let text = wm.text_content().unwrap_or_default();
                let extent = measure.measure(text, font_size, 600.0);
                Self {
                    width: extent.width,
                    height: f64::from(font_size) * 1.25,
                    font_size,
                }
            }
        }
    }
}

/// The watermark as placed for one snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct WatermarkPlacement {
    /// Anchor used for layer ordering (top layers draw before the header, bottom ones last).
    pub position: WatermarkPosition,
    /// Destination rectangle on the canvas.
    pub rect: Rect,
    /// Font size for text watermarks.
    pub font_size: f32,
}

impl WatermarkPlacement {
    fn new(wm: &WatermarkConfig, size: WatermarkSize, canvas: Canvas) -> Self {
        let (w, h) = (canvas.width_f64(), canvas.height_f64());
        let x = match wm.position {
            WatermarkPosition::TopLeft | WatermarkPosition::BottomLeft => wm.margin,
            WatermarkPosition::TopCenter | WatermarkPosition::BottomCenter => {
                (w - size.width) / 2.0
            }
            WatermarkPosition::TopRight | WatermarkPosition::BottomRight => {
                w - size.width - wm.margin
            }
        };
        let y = if wm.position.is_top() {
            wm.margin
        } else {
            h - size.height - wm.margin
        };
        Self {
            position: wm.position,
            rect: Rect::new(x, y, x + size.width, y + size.height),
            font_size: size.font_size,
        }
    }

    /// Vertical space this watermark takes from the chart.
    pub fn reserve(&self, margin: f64) -> f64 {
        self.rect.height() + margin
    }
}

/// Every layout constant and padding for one snapshot, computed in a single place.
///
/// Drawing code reads these values instead of re-deriving them.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutMetrics {
    /// Output canvas.
    pub canvas: Canvas,
    /// Label font size in pixels.
    pub label_font_size: f64,
    /// Numeric label font weight.
    pub label_font_weight: f32,
    /// Total vertical header reservation.
    pub header_height: f64,
    /// Y where the first header line starts.
    pub header_text_top: f64,
    /// Left and right padding.
    pub side_padding: f64,
    /// Bottom padding.
    pub bottom_padding: f64,
    /// Drawable chart rectangle.
    pub chart: Rect,
    /// Placed watermark, if enabled.
    pub watermark: Option<WatermarkPlacement>,
}

impl LayoutMetrics {
    /// Compute paddings and the chart rectangle.
    pub fn compute(config: &FlightConfig, watermark_size: Option<WatermarkSize>) -> Self {
        let canvas = config.aspect_ratio.canvas();
        let label_font_size = f64::from(config.label_style.font_size);

        let watermark = config
            .active_watermark()
            .zip(watermark_size)
            .map(|(wm, size)| (wm, WatermarkPlacement::new(wm, size, canvas)));
        let top_reserve = watermark
            .as_ref()
            .filter(|(_, p)| p.position.is_top())
            .map(|(wm, p)| p.reserve(wm.margin))
            .unwrap_or(0.0);
        let bottom_reserve = watermark
            .as_ref()
            .filter(|(_, p)| !p.position.is_top())
            .map(|(wm, p)| p.reserve(wm.margin))
            .unwrap_or(0.0);

        let mut header_height = HEADER_BASE + top_reserve;
        if config.title_text().is_some() {
            header_height += TITLE_BLOCK;
        }
        if config.description_text().is_some() {
            header_height += DESCRIPTION_BLOCK;
        }

        let icon_half = MARKER_ICON_SIZE / 2.0;
        let side_padding = label_font_size * 3.0 + icon_half + OPTICAL_BALANCE;
        let bottom_padding = label_font_size * 2.0 + icon_half + OPTICAL_BALANCE + bottom_reserve;

        let (w, h) = (canvas.width_f64(), canvas.height_f64());
        let top = header_height + label_font_size * LABEL_HEADROOM_EM;
        let bottom = (h - bottom_padding).max(top);
        let right = (w - side_padding).max(side_padding);
        let chart = Rect::new(side_padding, top, right, bottom);

        Self {
            canvas,
            label_font_size,
            label_font_weight: config.label_style.weight_value(),
            header_height,
            header_text_top: HEADER_TOP_INSET + top_reserve,
            side_padding,
            bottom_padding,
            chart,
            watermark: watermark.map(|(_, p)| p),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/metrics.rs"]
mod tests;
