use crate::config::model::FlightConfig;
use crate::config::time::ClockTime;
use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::FlightResult;
use crate::foundation::math::{clamp01, lerp_point, normalize_in_range};
use crate::layout::metrics::{LayoutMetrics, WatermarkSize};

/// Direction of a segment's value change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trend {
    /// End value is greater than or equal to the start value (flat counts as increase).
    Increase,
    /// End value is strictly less than the start value.
    Decrease,
}

impl Trend {
    /// Classify the change from `start` to `end`.
    pub fn between(start: f64, end: f64) -> Self {
        if end >= start {
            Self::Increase
        } else {
            Self::Decrease
        }
    }
}

/// One straight piece of the path between consecutive points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Start pixel.
    pub start: Point,
    /// End pixel.
    pub end: Point,
    /// Euclidean length in pixels.
    pub length: f64,
    /// Value trend, drives the stroke color.
    pub trend: Trend,
}

impl Segment {
    /// Direction angle in radians (`atan2(dy, dx)`).
    pub fn angle(&self) -> f64 {
        (self.end.y - self.start.y).atan2(self.end.x - self.start.x)
    }
}

/// Part of a segment to stroke for a given progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentSpan {
    /// Index into [`GeometrySnapshot::segments`].
    pub index: usize,
    /// Start pixel (always the segment start).
    pub start: Point,
    /// End pixel (segment end, or the leading edge for the remainder span).
    pub end: Point,
    /// Segment trend.
    pub trend: Trend,
    /// `true` for the fractional remainder span.
    pub partial: bool,
}

/// Position and heading of the moving marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathPosition {
    /// Leading edge of the drawn path.
    pub point: Point,
    /// Heading in radians.
    pub angle: f64,
    /// Segment the marker is on, if any.
    pub segment: Option<usize>,
}

/// Frozen per-pass geometry: metrics, pixel coordinates, segments, total length.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometrySnapshot {
    /// Consolidated layout metrics.
    pub metrics: LayoutMetrics,
    /// Pixel coordinate per input point.
    pub points: Vec<Point>,
    /// Input values, in order.
    pub values: Vec<f64>,
    /// Parsed input times, in order.
    pub times: Vec<ClockTime>,
    /// Consecutive segments (`points.len() - 1` of them).
    pub segments: Vec<Segment>,
    /// Sum of segment lengths.
    pub total_length: f64,
}

impl GeometrySnapshot {
    /// Map the configured points onto the canvas.
    #[tracing::instrument(skip_all, fields(points = config.points.len()))]
    pub fn compute(
        config: &FlightConfig,
        watermark_size: Option<WatermarkSize>,
    ) -> FlightResult<Self> {
        let metrics = LayoutMetrics::compute(config, watermark_size);
        let chart = metrics.chart;

        let times = config
            .points
            .iter()
            .map(|p| p.clock_time())
            .collect::<FlightResult<Vec<_>>>()?;
        let values: Vec<f64> = config.points.iter().map(|p| p.value).collect();

        let minutes: Vec<f64> = times
            .iter()
            .map(|t| f64::from(t.minutes_since_midnight()))
            .collect();
        let (t_min, t_max) = min_max(&minutes);
        let (v_min, v_max) = min_max(&values);

        let points: Vec<Point> = minutes
            .iter()
            .zip(&values)
            .map(|(&m, &v)| {
                let x = chart.x0 + normalize_in_range(m, t_min, t_max) * chart.width();
                let y = chart.y1 - normalize_in_range(v, v_min, v_max) * chart.height();
                Point::new(x, y)
            })
            .collect();

        let segments: Vec<Segment> = points
            .windows(2)
            .zip(values.windows(2))
            .map(|(p, v)| Segment {
                start: p[0],
                end: p[1],
                length: p[0].distance(p[1]),
                trend: Trend::between(v[0], v[1]),
            })
            .collect();
        let total_length = segments.iter().map(|s| s.length).sum();

        tracing::debug!(total_length, chart = ?chart, "geometry snapshot computed");
        Ok(Self {
            metrics,
            points,
            values,
            times,
            segments,
            total_length,
        })
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.metrics.canvas
    }

    /// Return `true` when nothing is left to animate at `progress`.
    ///
    /// A path without length is complete immediately.
    pub fn is_complete_at(&self, progress: f64) -> bool {
        self.total_length <= 0.0 || clamp01(progress) >= 1.0
    }

    /// Spans to stroke at `progress`: whole segments first, then the fractional remainder.
    pub fn segment_spans(&self, progress: f64) -> Vec<SegmentSpan> {
        let target = self.total_length * clamp01(progress);
        let mut spans = Vec::with_capacity(self.segments.len());
        let mut drawn = 0.0;
        for (index, seg) in self.segments.iter().enumerate() {
            if drawn + seg.length <= target {
                spans.push(SegmentSpan {
                    index,
                    start: seg.start,
                    end: seg.end,
                    trend: seg.trend,
                    partial: false,
                });
                drawn += seg.length;
                continue;
            }
            let remainder = target - drawn;
            if remainder > 0.0 && seg.length > 0.0 {
                spans.push(SegmentSpan {
                    index,
                    start: seg.start,
                    end: lerp_point(seg.start, seg.end, remainder / seg.length),
                    trend: seg.trend,
                    partial: true,
                });
            }
            break;
        }
        spans
    }

    /// Marker position at `progress`, walking the same distance as [`Self::segment_spans`].
    pub fn position_at(&self, progress: f64) -> PathPosition {
        let Some(&last) = self.points.last() else {
            return PathPosition {
                point: Point::ZERO,
                angle: 0.0,
                segment: None,
            };
        };
        let last_heading = self
            .segments
            .iter()
            .enumerate()
            .rev()
            .find(|(_, s)| s.length > 0.0);

        if self.is_complete_at(progress) {
            return PathPosition {
                point: last,
                angle: last_heading.map(|(_, s)| s.angle()).unwrap_or(0.0),
                segment: last_heading.map(|(i, _)| i),
            };
        }

        let target = self.total_length * clamp01(progress);
        let mut drawn = 0.0;
        for (i, seg) in self.segments.iter().enumerate() {
            if seg.length > 0.0 && target <= drawn + seg.length {
                let t = (target - drawn) / seg.length;
                let point = if t >= 1.0 {
                    seg.end
                } else {
                    lerp_point(seg.start, seg.end, t)
                };
                return PathPosition {
                    point,
                    angle: seg.angle(),
                    segment: Some(i),
                };
            }
            drawn += seg.length;
        }

        PathPosition {
            point: last,
            angle: last_heading.map(|(_, s)| s.angle()).unwrap_or(0.0),
            segment: last_heading.map(|(i, _)| i),
        }
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/geometry.rs"]
mod tests;
