use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::config::time::ClockTime;
use crate::foundation::core::Canvas;
use crate::foundation::error::{FlightError, FlightResult};

/// One sample of the flight path.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DataPoint {
    /// Plotted value (vertical axis).
    pub value: f64,
    /// Time of day as `"HH:MM"` (horizontal axis).
    pub time: String,
}

impl DataPoint {
    /// Convenience constructor.
    pub fn new(value: f64, time: impl Into<String>) -> Self {
        Self {
            value,
            time: time.into(),
        }
    }

    /// Parse the time field.
    pub fn clock_time(&self) -> FlightResult<ClockTime> {
        ClockTime::parse(&self.time)
    }
}

/// Supported output aspect ratios.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AspectRatio {
    /// Landscape 1920x1080.
    #[serde(rename = "16:9")]
    Landscape16x9,
    /// Square 1080x1080.
    #[serde(rename = "1:1")]
    Square1x1,
    /// Portrait 1080x1920.
    #[serde(rename = "9:16")]
    Portrait9x16,
    /// Portrait 1080x1350.
    #[serde(rename = "4:5")]
    Portrait4x5,
}

impl AspectRatio {
    /// Pixel dimensions for this ratio.
    pub fn canvas(self) -> Canvas {
        let (width, height) = match self {
            Self::Landscape16x9 => (1920, 1080),
            Self::Square1x1 => (1080, 1080),
            Self::Portrait9x16 => (1080, 1920),
            Self::Portrait4x5 => (1080, 1350),
        };
        Canvas { width, height }
    }

    /// The `"W:H"` label of this ratio.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landscape16x9 => "16:9",
            Self::Square1x1 => "1:1",
            Self::Portrait9x16 => "9:16",
            Self::Portrait4x5 => "4:5",
        }
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "16:9" => Ok(Self::Landscape16x9),
            "1:1" => Ok(Self::Square1x1),
            "9:16" => Ok(Self::Portrait9x16),
            "4:5" => Ok(Self::Portrait4x5),
            other => Err(FlightError::validation(format!(
                "unsupported aspect ratio '{other}'"
            ))),
        }
    }
}

/// Watermark content type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatermarkKind {
    /// Raster or SVG image loaded from `image_source`.
    Image,
    /// Text rendered from `text`.
    Text,
}

/// Anchor of the watermark on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    /// Top edge, left corner.
    TopLeft,
    /// Top edge, centered.
    TopCenter,
    /// Top edge, right corner.
    TopRight,
    /// Bottom edge, left corner.
    BottomLeft,
    /// Bottom edge, centered.
    BottomCenter,
    /// Bottom edge, right corner.
    BottomRight,
}

impl WatermarkPosition {
    /// Return `true` for the three top-anchored positions.
    pub fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopCenter | Self::TopRight)
    }
}

/// Watermark overlay settings. Treated as read-only by the pipeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WatermarkConfig {
    /// Disabled watermarks are ignored entirely.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Image or text content.
    #[serde(rename = "type")]
    pub kind: WatermarkKind,
    /// Image path (a `file://` prefix is accepted).
    #[serde(default)]
    pub image_source: Option<String>,
    /// Text content for text watermarks.
    #[serde(default)]
    pub text: Option<String>,
    /// Anchor position.
    pub position: WatermarkPosition,
    /// Watermark size relative to the shorter canvas side, `0.05..=1`.
    #[serde(default = "default_size_ratio")]
    pub size_ratio: f64,
    /// Layer opacity, `0.1..=1`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Distance from the anchored canvas edges in pixels.
    #[serde(default = "default_margin")]
    pub margin: f64,
}

fn default_true() -> bool {
    true
}

fn default_size_ratio() -> f64 {
    0.2
}

fn default_opacity() -> f64 {
    0.6
}

fn default_margin() -> f64 {
    24.0
}

impl WatermarkConfig {
    /// Text watermark with default sizing.
    pub fn text(text: impl Into<String>, position: WatermarkPosition) -> Self {
        Self {
            enabled: true,
            kind: WatermarkKind::Text,
            image_source: None,
            text: Some(text.into()),
            position,
            size_ratio: default_size_ratio(),
            opacity: default_opacity(),
            margin: default_margin(),
        }
    }

    /// Image watermark with default sizing.
    pub fn image(source: impl Into<String>, position: WatermarkPosition) -> Self {
        Self {
            enabled: true,
            kind: WatermarkKind::Image,
            image_source: Some(source.into()),
            text: None,
            position,
            size_ratio: default_size_ratio(),
            opacity: default_opacity(),
            margin: default_margin(),
        }
    }

    /// Validate ranges and content.
    pub fn validate(&self) -> FlightResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if !(0.05..=1.0).contains(&self.size_ratio) {
            return Err(FlightError::validation(
                "watermark size_ratio must be within 0.05..=1",
            ));
        }
        if !(0.1..=1.0).contains(&self.opacity) {
            return Err(FlightError::validation(
                "watermark opacity must be within 0.1..=1",
            ));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(FlightError::validation(
                "watermark margin must be finite and >= 0",
            ));
        }
        match self.kind {
            WatermarkKind::Image if self.image_path().is_none() => Err(FlightError::validation(
                "image watermark requires image_source",
            )),
            WatermarkKind::Text if self.text_content().is_none() => Err(
                FlightError::validation("text watermark requires non-empty text"),
            ),
            _ => Ok(()),
        }
    }

    /// Filesystem path of the image source, with any `file://` scheme stripped.
    pub fn image_path(&self) -> Option<PathBuf> {
        let src = self.image_source.as_deref()?.trim();
        if src.is_empty() {
            return None;
        }
        Some(PathBuf::from(src.strip_prefix("file://").unwrap_or(src)))
    }

    /// Trimmed text content, if any.
    pub fn text_content(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Label typography.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LabelStyle {
    /// Label font size in pixels.
    #[serde(default = "default_label_font_size")]
    pub font_size: f32,
    /// CSS-like weight: `"normal"`, `"bold"`, or a number such as `"600"`.
    #[serde(default = "default_label_font_weight")]
    pub font_weight: String,
}

fn default_label_font_size() -> f32 {
    28.0
}

fn default_label_font_weight() -> String {
    "bold".to_string()
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size: default_label_font_size(),
            font_weight: default_label_font_weight(),
        }
    }
}

impl LabelStyle {
    /// Numeric font weight (100..=900). Unknown names map to 400.
    pub fn weight_value(&self) -> f32 {
        let w = self.font_weight.trim();
        match w.to_ascii_lowercase().as_str() {
            "thin" => 100.0,
            "light" | "lighter" => 300.0,
            "normal" | "regular" => 400.0,
            "medium" => 500.0,
            "semibold" => 600.0,
            "bold" | "bolder" => 700.0,
            "black" => 900.0,
            _ => w
                .parse::<f32>()
                .ok()
                .filter(|v| (1.0..=1000.0).contains(v))
                .unwrap_or(400.0),
        }
    }
}

/// Pre-resolved strings for the two fixed label keys.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LabelStrings {
    /// Tag shown on the first point.
    #[serde(default = "default_start_label")]
    pub start: String,
    /// Tag shown on the last point.
    #[serde(default = "default_destination_label")]
    pub destination: String,
}

fn default_start_label() -> String {
    "start".to_string()
}

fn default_destination_label() -> String {
    "final destination".to_string()
}

impl Default for LabelStrings {
    fn default() -> Self {
        Self {
            start: default_start_label(),
            destination: default_destination_label(),
        }
    }
}

impl LabelStrings {
    /// Start tag, falling back to the raw key when unresolved.
    pub fn start_text(&self) -> &str {
        non_empty_or(&self.start, "start")
    }

    /// Destination tag, falling back to the raw key when unresolved.
    pub fn destination_text(&self) -> &str {
        non_empty_or(&self.destination, "final destination")
    }
}

fn non_empty_or<'a>(s: &'a str, fallback: &'a str) -> &'a str {
    let t = s.trim();
    if t.is_empty() { fallback } else { t }
}

/// Finalized configuration for one recording.
///
/// The host application owns it; the pipeline never mutates it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlightConfig {
    /// Ordered points; order is chronological.
    pub points: Vec<DataPoint>,
    /// Output aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Animation duration in seconds.
    #[serde(alias = "duration")]
    pub duration_secs: f64,
    /// Optional header title.
    #[serde(default)]
    pub title: Option<String>,
    /// Optional header description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional watermark overlay.
    #[serde(default)]
    pub watermark: Option<WatermarkConfig>,
    /// Label typography.
    #[serde(default)]
    pub label_style: LabelStyle,
    /// Resolved label tags.
    #[serde(default)]
    pub labels: LabelStrings,
    /// Font used for all text. Without it a system sans-serif face is used.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    /// Moving marker icon (PNG/JPEG/SVG). Defaults to the built-in plane.
    #[serde(default)]
    pub marker_icon: Option<PathBuf>,
}

impl FlightConfig {
    /// Configuration with default styling and no optional layers.
    pub fn new(points: Vec<DataPoint>, aspect_ratio: AspectRatio, duration_secs: f64) -> Self {
        Self {
            points,
            aspect_ratio,
            duration_secs,
            title: None,
            description: None,
            watermark: None,
            label_style: LabelStyle::default(),
            labels: LabelStrings::default(),
            font_path: None,
            marker_icon: None,
        }
    }

    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FlightResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| FlightError::validation(format!("parse flight config JSON: {e}")))
    }

    /// Parse a configuration from a JSON file; relative asset paths resolve against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> FlightResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FlightError::validation(format!("open flight config '{}': {e}", path.display()))
        })?;
        let mut cfg = Self::from_reader(BufReader::new(f))?;
        if let Some(base) = path.parent() {
            cfg.resolve_relative_paths(base);
        }
        Ok(cfg)
    }

    /// Rebase relative asset paths onto `base`.
    pub fn resolve_relative_paths(&mut self, base: &Path) {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(p) = self.font_path.as_mut() {
            rebase(p);
        }
        if let Some(p) = self.marker_icon.as_mut() {
            rebase(p);
        }
        if let Some(wm) = self.watermark.as_mut()
            && let Some(path) = wm.image_path()
            && path.is_relative()
        {
            wm.image_source = Some(base.join(path).to_string_lossy().into_owned());
        }
    }

    /// Check the boundary contract.
    ///
    /// Non-increasing times are tolerated (the layout degrades gracefully) and only logged.
    pub fn validate(&self) -> FlightResult<()> {
        if self.points.is_empty() {
            return Err(FlightError::validation("at least one point is required"));
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(FlightError::validation(
                "duration_secs must be finite and > 0",
            ));
        }
        let size = self.label_style.font_size;
        if !size.is_finite() || size <= 0.0 {
            return Err(FlightError::validation(
                "label font_size must be finite and > 0",
            ));
        }

        let mut prev: Option<ClockTime> = None;
        for (i, p) in self.points.iter().enumerate() {
            if !p.value.is_finite() {
                return Err(FlightError::validation(format!(
                    "point {i} has a non-finite value"
                )));
            }
            let t = p.clock_time()?;
            if let Some(prev) = prev
                && t <= prev
            {
                tracing::warn!(index = i, time = %t, "point times are not strictly increasing");
            }
            prev = Some(t);
        }

        if let Some(wm) = self.watermark.as_ref() {
            wm.validate()?;
        }
        Ok(())
    }

    /// Title when present and non-blank.
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Description when present and non-blank.
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// The watermark when it is enabled.
    pub fn active_watermark(&self) -> Option<&WatermarkConfig> {
        self.watermark.as_ref().filter(|w| w.enabled)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
