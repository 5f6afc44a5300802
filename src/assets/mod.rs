//! Marker icons, watermark images and fonts: decoding, rasterization and caching.

pub mod decode;
pub mod fonts;
pub mod icon;
pub mod store;
pub mod svg_raster;
