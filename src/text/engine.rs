use std::borrow::Cow;

use crate::assets::fonts::FontBytes;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{FlightError, FlightResult};
use crate::text::measure::{EstimatedMetrics, TextExtent, TextMeasure};

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Shaped single-paragraph text ready to be drawn.
pub struct ShapedText {
    /// Parley layout (glyph positions relative to the layout origin).
    pub layout: parley::Layout<TextBrushRgba8>,
    /// Font the glyphs index into.
    pub font: vello_cpu::peniko::FontData,
}

impl ShapedText {
    /// Advance width of the widest line.
    pub fn width(&self) -> f64 {
        f64::from(self.layout.width())
    }

    /// Total layout height.
    pub fn height(&self) -> f64 {
        f64::from(self.layout.height())
    }
}

/// Parley contexts plus the one registered font family used for every string.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl TextEngine {
    /// Register `font` (TTF/OTF/TTC) and prepare layout contexts.
    ///
    /// For collections the family containing `font.index` is used.
    pub fn new(font: &FontBytes) -> FlightResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.as_ref().clone()), None);
        let family_id = families
            .iter()
            .find(|(_, faces)| faces.iter().any(|f| f.index() == font.index))
            .or_else(|| families.first())
            .map(|(id, _)| *id)
            .ok_or_else(|| {
                FlightError::asset_load("no font families registered from font bytes")
            })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| FlightError::asset_load("registered font family has no name"))?
            .to_string();

        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
            font.index,
        );

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font: data,
        })
    }

    /// Family name of the registered font.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape `text` on a single unbounded line.
    pub fn shape(
        &mut self,
        text: &str,
        size_px: f32,
        weight: f32,
        brush: TextBrushRgba8,
    ) -> FlightResult<ShapedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(FlightError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(weight),
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        Ok(ShapedText {
            layout,
            font: self.font.clone(),
        })
    }
}

impl TextMeasure for TextEngine {
    fn measure(&mut self, text: &str, size_px: f32, weight: f32) -> TextExtent {
        match self.shape(text, size_px, weight, TextBrushRgba8::default()) {
            Ok(shaped) => TextExtent {
                width: shaped.width(),
                height: shaped.height(),
            },
            Err(err) => {
                tracing::debug!(%err, "falling back to estimated text metrics");
                EstimatedMetrics.measure(text, size_px, weight)
            }
        }
    }
}
