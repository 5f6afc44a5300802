use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::{PreparedGraphic, PreparedImage};
use crate::assets::svg_raster::{raster_dims, rasterize_svg_to_premul_rgba8};
use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rect, Rgba8};
use crate::foundation::error::{FlightError, FlightResult};
use crate::render::frame::FrameRGBA;
use crate::text::engine::ShapedText;

/// `vello_cpu` surface the frame renderer draws into.
///
/// One canvas is reused for every frame of a pass; [`CpuCanvas::begin`] resets it.
pub struct CpuCanvas {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    raster_cache: HashMap<RasterKey, vello_cpu::Image>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct RasterKey {
    source: usize,
    width: u32,
    height: u32,
}

impl CpuCanvas {
    /// Allocate a surface of `canvas` size.
    pub fn new(canvas: Canvas) -> FlightResult<Self> {
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| FlightError::validation("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| FlightError::validation("canvas height exceeds u16"))?;
        Ok(Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
            raster_cache: HashMap::new(),
        })
    }

    /// Start a new frame filled with `background`.
    pub fn begin(&mut self, background: Rgba8) {
        self.ctx.reset();
        clear_pixmap(&mut self.pixmap, [0, 0, 0, 0]);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(background));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
    }

    /// Run `draw` inside an opacity layer (skipped when fully opaque).
    pub fn with_opacity<R>(&mut self, opacity: f32, draw: impl FnOnce(&mut Self) -> R) -> R {
        let layered = opacity < 1.0;
        if layered {
            self.ctx.push_opacity_layer(opacity.clamp(0.0, 1.0));
        }
        let out = draw(self);
        if layered {
            self.ctx.pop_layer();
        }
        out
    }

    /// Fill an axis-aligned rectangle.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    /// Fill a circle.
    pub fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) {
        use vello_cpu::kurbo::Shape;

        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        let circle = vello_cpu::kurbo::Circle::new(point_to_cpu(center), radius);
        self.ctx.fill_path(&circle.to_path(0.1));
    }

    /// Stroke a straight line, optionally dashed (`dash` as on/off lengths).
    pub fn stroke_line(&mut self, from: Point, to: Point, width: f64, dash: &[f64], color: Rgba8) {
        let mut path = BezPath::new();
        path.move_to(from);
        path.line_to(to);

        let mut stroke =
            vello_cpu::kurbo::Stroke::new(width).with_caps(vello_cpu::kurbo::Cap::Butt);
        if !dash.is_empty() {
            stroke = stroke.with_dashes(0.0, dash.iter().copied());
        }
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.set_stroke(stroke);
        self.ctx.stroke_path(&bezpath_to_cpu(&path));
    }

    /// Draw `graphic` so that its `(0, 0)..(w, h)` box lands under `transform`.
    ///
    /// SVGs are rasterized at `(w, h)` and cached for the lifetime of the canvas.
    pub fn draw_graphic(
        &mut self,
        graphic: &PreparedGraphic,
        w: f64,
        h: f64,
        transform: Affine,
    ) -> FlightResult<()> {
        let (paint, pw, ph) = self.paint_for(graphic, w, h)?;
        let fit = Affine::scale_non_uniform(w / pw, h / ph);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(transform * fit));
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, pw, ph));
        Ok(())
    }

    /// Draw shaped text with its layout origin at `origin`.
    pub fn draw_text(&mut self, text: &ShapedText, origin: Point) {
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        for line in text.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&text.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    /// Rasterize everything drawn since [`CpuCanvas::begin`] and read it back.
    pub fn finish(&mut self) -> FrameRGBA {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    fn paint_for(
        &mut self,
        graphic: &PreparedGraphic,
        w: f64,
        h: f64,
    ) -> FlightResult<(vello_cpu::Image, f64, f64)> {
        match graphic {
            PreparedGraphic::Raster(img) => {
                let key = RasterKey {
                    source: Arc::as_ptr(&img.rgba8_premul) as usize,
                    width: img.width,
                    height: img.height,
                };
                let paint = match self.raster_cache.get(&key) {
                    Some(p) => p.clone(),
                    None => {
                        let paint = image_paint(prepared_to_pixmap(img)?);
                        self.raster_cache.insert(key, paint.clone());
                        paint
                    }
                };
                Ok((paint, f64::from(img.width), f64::from(img.height)))
            }
            PreparedGraphic::Svg(svg) => {
                let (rw, rh) = raster_dims(w, h);
                let key = RasterKey {
                    source: Arc::as_ptr(&svg.tree) as usize,
                    width: rw,
                    height: rh,
                };
                let paint = match self.raster_cache.get(&key) {
                    Some(p) => p.clone(),
                    None => {
                        let bytes = rasterize_svg_to_premul_rgba8(&svg.tree, rw, rh)?;
                        let paint = image_paint(premul_bytes_to_pixmap(&bytes, rw, rh)?);
                        self.raster_cache.insert(key, paint.clone());
                        paint
                    }
                };
                Ok((paint, f64::from(rw), f64::from(rh)))
            }
        }
    }
}

fn image_paint(pixmap: vello_cpu::Pixmap) -> vello_cpu::Image {
    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    }
}

fn prepared_to_pixmap(img: &PreparedImage) -> FlightResult<vello_cpu::Pixmap> {
    premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> FlightResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FlightError::validation("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FlightError::validation("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(FlightError::validation("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
