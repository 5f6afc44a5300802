use std::path::Path;

use crate::assets::decode::PreparedGraphic;
use crate::assets::store::LoadedAssets;
use crate::config::model::{FlightConfig, WatermarkConfig};
use crate::foundation::core::{Affine, Point, Rgba8, Vec2};
use crate::foundation::error::FlightResult;
use crate::layout::geometry::{GeometrySnapshot, Trend};
use crate::layout::labels::{LabelPlacement, place_labels};
use crate::layout::metrics::{
    DESCRIPTION_FONT_SIZE, MARKER_ICON_SIZE, PATH_DASH, PATH_STROKE_WIDTH,
    POINT_MARKER_RADIUS, TITLE_BLOCK, TITLE_FONT_SIZE, WatermarkPlacement, WatermarkSize,
};
use crate::render::cpu::CpuCanvas;
use crate::render::frame::FrameRGBA;
use crate::text::engine::{ShapedText, TextEngine};

/// Frame background.
pub const BACKGROUND: Rgba8 = Rgba8::from_hex(0x0f172a);
/// Stroke color of rising segments.
pub const INCREASE_STROKE: Rgba8 = Rgba8::from_hex(0x22c55e);
/// Stroke color of falling segments.
pub const DECREASE_STROKE: Rgba8 = Rgba8::from_hex(0xef4444);
/// Point marker fill.
pub const POINT_MARKER_FILL: Rgba8 = Rgba8::from_hex(0xffffff);
const TITLE_COLOR: Rgba8 = Rgba8::from_hex(0xf8fafc);
const DESCRIPTION_COLOR: Rgba8 = Rgba8::from_hex(0xcbd5e1);
const LABEL_TEXT_COLOR: Rgba8 = Rgba8::from_hex(0xffffff);
const LABEL_TICK_COLOR: Rgba8 = Rgba8::from_hex(0x94a3b8);
const WATERMARK_TEXT_COLOR: Rgba8 = Rgba8::from_hex(0xffffff);
const LABEL_TICK_WIDTH: f64 = 2.0;

/// Stroke color for a segment trend.
pub fn trend_color(trend: Trend) -> Rgba8 {
    match trend {
        Trend::Increase => INCREASE_STROKE,
        Trend::Decrease => DECREASE_STROKE,
    }
}

struct WatermarkLayer {
    placement: WatermarkPlacement,
    opacity: f32,
    content: WatermarkContent,
}

enum WatermarkContent {
    Image(PreparedGraphic),
    Text(ShapedText),
}

struct LabelText {
    placement: LabelPlacement,
    lines: Vec<ShapedText>,
}

/// Draws complete frames for one recording pass.
///
/// Everything frame-invariant (snapshot, label boxes, shaped text, rasterized graphics) is
/// prepared once in [`FrameRenderer::new`]; [`FrameRenderer::render`] only varies the path
/// and the icon position.
pub struct FrameRenderer {
    snapshot: GeometrySnapshot,
    canvas: CpuCanvas,
    icon: PreparedGraphic,
    title: Option<ShapedText>,
    description: Option<ShapedText>,
    labels: Vec<LabelText>,
    watermark: Option<WatermarkLayer>,
}

impl FrameRenderer {
    /// Build the snapshot and every static layer for `config`.
    #[tracing::instrument(skip_all)]
    pub fn new(config: &FlightConfig, assets: LoadedAssets) -> FlightResult<Self> {
        config.validate()?;

        let mut text = TextEngine::new(&assets.font)?;

        let canvas_size = config.aspect_ratio.canvas();
        let wm_size = config.active_watermark().map(|wm| {
            let natural = assets.watermark.as_ref().map(|g| g.natural_size());
            WatermarkSize::estimate(wm, canvas_size, natural, &mut text)
        });
        let snapshot = GeometrySnapshot::compute(config, wm_size)?;

        let placements = place_labels(&snapshot, config, &mut text);
        let size = snapshot.metrics.label_font_size as f32;
        let weight = snapshot.metrics.label_font_weight;
        let labels = placements
            .into_iter()
            .map(|placement| {
                let lines = placement
                    .lines
                    .iter()
                    .map(|l| text.shape(l, size, weight, LABEL_TEXT_COLOR.into()))
                    .collect::<FlightResult<Vec<_>>>()?;
                Ok(LabelText { placement, lines })
            })
            .collect::<FlightResult<Vec<_>>>()?;

        let title = config
            .title_text()
            .map(|t| text.shape(t, TITLE_FONT_SIZE, 700.0, TITLE_COLOR.into()))
            .transpose()?;
        let description = config
            .description_text()
            .map(|t| text.shape(t, DESCRIPTION_FONT_SIZE, 400.0, DESCRIPTION_COLOR.into()))
            .transpose()?;

        let watermark = match (config.active_watermark(), snapshot.metrics.watermark.clone()) {
            (Some(wm), Some(placement)) => {
                Some(watermark_layer(wm, placement, assets.watermark, &mut text)?)
            }
            _ => None,
        };

        let canvas = CpuCanvas::new(snapshot.canvas())?;
        tracing::debug!(
            labels = labels.len(),
            segments = snapshot.segments.len(),
            "frame renderer ready"
        );
        Ok(Self {
            snapshot,
            canvas,
            icon: assets.icon,
            title,
            description,
            labels,
            watermark,
        })
    }

    /// Geometry this renderer draws.
    pub fn snapshot(&self) -> &GeometrySnapshot {
        &self.snapshot
    }

    /// Label boxes (identical for every frame).
    pub fn label_placements(&self) -> impl Iterator<Item = &LabelPlacement> {
        self.labels.iter().map(|l| &l.placement)
    }

    /// Draw the frame for `progress` in `0..=1`.
    pub fn render(&mut self, progress: f64) -> FlightResult<FrameRGBA> {
        self.canvas.begin(BACKGROUND);

        if let Some(wm) = self.watermark.as_ref().filter(|w| w.placement.position.is_top()) {
            draw_watermark(&mut self.canvas, wm)?;
        }

        self.draw_header();
        self.draw_path(progress);
        for &p in &self.snapshot.points {
            self.canvas.fill_circle(p, POINT_MARKER_RADIUS, POINT_MARKER_FILL);
        }
        self.draw_labels();
        self.draw_icon(progress)?;

        if let Some(wm) = self.watermark.as_ref().filter(|w| !w.placement.position.is_top()) {
            draw_watermark(&mut self.canvas, wm)?;
        }

        Ok(self.canvas.finish())
    }

    /// Render one frame and write it as a PNG.
    pub fn render_png(&mut self, progress: f64, path: &Path) -> FlightResult<()> {
        self.render(progress)?.save_png(path)
    }

    fn draw_header(&mut self) {
        let width = self.snapshot.canvas().width_f64();
        let mut cursor = self.snapshot.metrics.header_text_top;
        if let Some(title) = self.title.as_ref() {
            self.canvas
                .draw_text(title, Point::new((width - title.width()) / 2.0, cursor));
            cursor += TITLE_BLOCK;
        }
        if let Some(desc) = self.description.as_ref() {
            self.canvas
                .draw_text(desc, Point::new((width - desc.width()) / 2.0, cursor));
        }
    }

    fn draw_path(&mut self, progress: f64) {
        for span in self.snapshot.segment_spans(progress) {
            self.canvas.stroke_line(
                span.start,
                span.end,
                PATH_STROKE_WIDTH,
                &PATH_DASH,
                trend_color(span.trend),
            );
        }
    }

    fn draw_labels(&mut self) {
        for label in &self.labels {
            let p = &label.placement;
            let reach = p.anchor - p.point;
            if reach.hypot() > POINT_MARKER_RADIUS {
                // The tick starts at the marker's rim so the marker stays solid.
                let from = p.point + reach.normalize() * POINT_MARKER_RADIUS;
                self.canvas
                    .stroke_line(from, p.anchor, LABEL_TICK_WIDTH, &[], LABEL_TICK_COLOR);
            }
            self.canvas.fill_rect(p.rect, p.background);
            for (i, shaped) in label.lines.iter().enumerate() {
                let slot_top = p.rect.y0 + p.pad_y + i as f64 * p.line_height;
                let y = slot_top + (p.line_height - shaped.height()).max(0.0) / 2.0;
                self.canvas.draw_text(shaped, Point::new(p.rect.x0 + p.pad_x, y));
            }
        }
    }

    fn draw_icon(&mut self, progress: f64) -> FlightResult<()> {
        let pos = self.snapshot.position_at(progress);
        let half = MARKER_ICON_SIZE / 2.0;
        let transform = Affine::translate(pos.point.to_vec2())
            * Affine::rotate(pos.angle)
            * Affine::translate(Vec2::new(-half, -half));
        self.canvas
            .draw_graphic(&self.icon, MARKER_ICON_SIZE, MARKER_ICON_SIZE, transform)
    }
}

fn watermark_layer(
    wm: &WatermarkConfig,
    placement: WatermarkPlacement,
    image: Option<PreparedGraphic>,
    text: &mut TextEngine,
) -> FlightResult<WatermarkLayer> {
    let content = match image {
        Some(g) => WatermarkContent::Image(g),
        None => {
            let content = wm.text_content().unwrap_or_default();
            WatermarkContent::Text(text.shape(
                content,
                placement.font_size,
                600.0,
                WATERMARK_TEXT_COLOR.into(),
            )?)
        }
    };
    Ok(WatermarkLayer {
        placement,
        opacity: wm.opacity as f32,
        content,
    })
}

fn draw_watermark(canvas: &mut CpuCanvas, wm: &WatermarkLayer) -> FlightResult<()> {
    let rect = wm.placement.rect;
    canvas.with_opacity(wm.opacity, |c| match &wm.content {
        WatermarkContent::Image(g) => c.draw_graphic(
            g,
            rect.width(),
            rect.height(),
            Affine::translate(Vec2::new(rect.x0, rect.y0)),
        ),
        WatermarkContent::Text(shaped) => {
            c.draw_text(shaped, Point::new(rect.x0, rect.y0));
            Ok(())
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
