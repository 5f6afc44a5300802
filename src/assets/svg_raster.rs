use crate::foundation::error::{FlightError, FlightResult};

const MAX_DIM: u32 = 16_384;

/// Rasterize `tree` into a `width x height` premultiplied RGBA8 buffer, stretching its viewport.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> FlightResult<Vec<u8>> {
    if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
        return Err(FlightError::validation(format!(
            "svg raster size out of range: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| FlightError::validation("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

/// Pixel size to rasterize at so that drawing into `(w, h)` does not upscale.
pub fn raster_dims(w: f64, h: f64) -> (u32, u32) {
    let px = |v: f64| (v.ceil().max(1.0) as u32).min(MAX_DIM);
    (px(w), px(h))
}
