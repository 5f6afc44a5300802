/// Size of a laid-out single-line string in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextExtent {
    /// Advance width.
    pub width: f64,
    /// Line box height.
    pub height: f64,
}

/// Anything that can report text extents for layout.
pub trait TextMeasure {
    /// Measure `text` at `size_px` and numeric `weight`.
    fn measure(&mut self, text: &str, size_px: f32, weight: f32) -> TextExtent;
}

/// Font-independent metrics, used when shaping fails.
///
/// Deterministic by construction, which keeps layout tests stable.
#[derive(Clone, Copy, Debug, Default)]
pub struct EstimatedMetrics;

impl EstimatedMetrics {
    const ADVANCE_EM: f64 = 0.56;
    const BOLD_ADVANCE_EM: f64 = 0.6;
    const LINE_EM: f64 = 1.2;
}

impl TextMeasure for EstimatedMetrics {
    fn measure(&mut self, text: &str, size_px: f32, weight: f32) -> TextExtent {
        let size = f64::from(size_px);
        let advance = if weight >= 600.0 {
            Self::BOLD_ADVANCE_EM
        } else {
            Self::ADVANCE_EM
        };
        TextExtent {
            width: text.chars().count() as f64 * size * advance,
            height: size * Self::LINE_EM,
        }
    }
}
