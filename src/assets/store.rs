use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use crate::assets::decode::{PreparedGraphic, decode_graphic};
use crate::assets::fonts::{FontBytes, system_sans_font};
use crate::assets::icon::builtin_plane;
use crate::config::model::{FlightConfig, WatermarkKind};
use crate::foundation::error::{FlightError, FlightResult};

/// Everything a render pass needs from disk, loaded before the first frame.
#[derive(Clone, Debug)]
pub struct LoadedAssets {
    /// Moving marker icon.
    pub icon: PreparedGraphic,
    /// Watermark image, for enabled image watermarks.
    pub watermark: Option<PreparedGraphic>,
    /// Font for every text layer: the configured file, or a system sans-serif face.
    pub font: FontBytes,
}

/// Path-keyed cache of decoded assets.
///
/// Every disk read is bounded by the configured timeout so a stuck source cannot hold the
/// pipeline before its first frame.
#[derive(Debug)]
pub struct AssetStore {
    timeout: Duration,
    graphics: HashMap<PathBuf, PreparedGraphic>,
    fonts: HashMap<PathBuf, Arc<Vec<u8>>>,
    system_font: Option<FontBytes>,
}

impl AssetStore {
    /// Empty store with the given per-read timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            graphics: HashMap::new(),
            fonts: HashMap::new(),
            system_font: None,
        }
    }

    /// Number of cached graphics.
    pub fn cached_graphics(&self) -> usize {
        self.graphics.len()
    }

    /// Decode (or fetch from cache) the graphic at `path`.
    pub fn graphic(&mut self, path: &Path) -> FlightResult<PreparedGraphic> {
        if let Some(g) = self.graphics.get(path) {
            return Ok(g.clone());
        }
        let bytes = read_with_timeout(path, self.timeout)?;
        let graphic = decode_graphic(&bytes, &path.to_string_lossy())?;
        self.graphics.insert(path.to_path_buf(), graphic.clone());
        Ok(graphic)
    }

    /// Read (or fetch from cache) font bytes at `path`.
    pub fn font(&mut self, path: &Path) -> FlightResult<Arc<Vec<u8>>> {
        if let Some(f) = self.fonts.get(path) {
            return Ok(f.clone());
        }
        let bytes = Arc::new(read_with_timeout(path, self.timeout)?);
        self.fonts.insert(path.to_path_buf(), bytes.clone());
        Ok(bytes)
    }

    /// Resolve (once) the system sans-serif face used when no font file is configured.
    pub fn system_font(&mut self) -> FlightResult<FontBytes> {
        if let Some(f) = &self.system_font {
            return Ok(f.clone());
        }
        let font = system_sans_font()?;
        self.system_font = Some(font.clone());
        Ok(font)
    }

    /// Load the icon, watermark image and font a config refers to.
    #[tracing::instrument(skip_all)]
    pub fn load_for(&mut self, config: &FlightConfig) -> FlightResult<LoadedAssets> {
        let icon = match config.marker_icon.as_deref() {
            Some(path) => self.graphic(path)?,
            None => PreparedGraphic::Svg(builtin_plane()?),
        };

        let watermark = match config.active_watermark() {
            Some(wm) if wm.kind == WatermarkKind::Image => {
                let path = wm.image_path().ok_or_else(|| {
                    FlightError::asset_load("image watermark has no image source")
                })?;
                Some(self.graphic(&path)?)
            }
            _ => None,
        };

        let font = match config.font_path.as_deref() {
            Some(path) => FontBytes::single(self.font(path)?),
            None => self.system_font()?,
        };

        tracing::debug!(
            custom_icon = config.marker_icon.is_some(),
            watermark = watermark.is_some(),
            custom_font = config.font_path.is_some(),
            "assets loaded"
        );
        Ok(LoadedAssets {
            icon,
            watermark,
            font,
        })
    }
}

fn read_with_timeout(path: &Path, timeout: Duration) -> FlightResult<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    let owned = path.to_path_buf();
    std::thread::Builder::new()
        .name("flightpath-asset-read".to_string())
        .spawn(move || {
            let _ = tx.send(std::fs::read(&owned));
        })
        .map_err(|e| FlightError::asset_load(format!("spawn asset reader: {e}")))?;

    match rx.recv_timeout(timeout) {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(FlightError::asset_load(format!(
            "read '{}': {e}",
            path.display()
        ))),
        Err(mpsc::RecvTimeoutError::Timeout) => Err(FlightError::asset_load(format!(
            "timed out after {timeout:?} reading '{}'",
            path.display()
        ))),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(FlightError::asset_load(format!(
            "asset reader for '{}' exited without a result",
            path.display()
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
