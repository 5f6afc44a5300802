use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{FlightError, FlightResult};

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone, Debug)]
/// SVG asset represented as a parsed `usvg` tree.
pub struct PreparedSvg {
    /// Parsed SVG tree.
    pub tree: Arc<usvg::Tree>,
}

/// Any graphic the renderer can place into a rectangle.
#[derive(Clone, Debug)]
pub enum PreparedGraphic {
    /// Bitmap (PNG, JPEG, ...).
    Raster(PreparedImage),
    /// Vector, rasterized at draw size.
    Svg(PreparedSvg),
}

impl PreparedGraphic {
    /// Intrinsic size in pixels (SVG size is its declared viewport).
    pub fn natural_size(&self) -> (u32, u32) {
        match self {
            Self::Raster(img) => (img.width, img.height),
            Self::Svg(svg) => {
                let size = svg.tree.size();
                (
                    (size.width().ceil() as u32).max(1),
                    (size.height().ceil() as u32).max(1),
                )
            }
        }
    }
}

/// Decode a bitmap and premultiply its alpha.
pub fn decode_image(bytes: &[u8]) -> FlightResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> FlightResult<PreparedSvg> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

/// Decode bytes as SVG or bitmap, picking by file extension and falling back to sniffing.
pub fn decode_graphic(bytes: &[u8], name_hint: &str) -> FlightResult<PreparedGraphic> {
    let is_svg = name_hint.to_ascii_lowercase().ends_with(".svg") || looks_like_svg(bytes);
    let decoded = if is_svg {
        parse_svg(bytes).map(PreparedGraphic::Svg)
    } else {
        decode_image(bytes).map(PreparedGraphic::Raster)
    };
    decoded.map_err(|e| FlightError::asset_load(format!("{name_hint}: {e}")))
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start();
    trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && text.contains("<svg"))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
