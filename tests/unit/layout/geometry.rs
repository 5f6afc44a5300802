use approx::assert_relative_eq;

use super::*;
use crate::config::model::{AspectRatio, DataPoint};

fn cfg(points: &[(f64, &str)]) -> FlightConfig {
    FlightConfig::new(
        points.iter().map(|(v, t)| DataPoint::new(*v, *t)).collect(),
        AspectRatio::Square1x1,
        3.0,
    )
}

fn trip() -> GeometrySnapshot {
    GeometrySnapshot::compute(
        &cfg(&[(10.0, "09:00"), (15.0, "09:05"), (8.0, "09:10")]),
        None,
    )
    .unwrap()
}

#[test]
fn points_span_the_chart_rectangle() {
    let g = trip();
    let chart = g.metrics.chart;
    assert_eq!(g.points[0].x, chart.x0);
    assert_relative_eq!(g.points[2].x, chart.x1, epsilon = 1e-9);
    assert_relative_eq!(g.points[1].x, chart.center().x, epsilon = 1e-9);
    // Largest value renders highest, smallest lowest.
    assert_relative_eq!(g.points[1].y, chart.y0, epsilon = 1e-9);
    assert_eq!(g.points[2].y, chart.y1);
}

#[test]
fn total_length_is_sum_of_segment_distances() {
    let g = trip();
    assert_eq!(g.segments.len(), 2);
    let expected: f64 = g
        .points
        .windows(2)
        .map(|w| ((w[1].x - w[0].x).powi(2) + (w[1].y - w[0].y).powi(2)).sqrt())
        .sum();
    assert_relative_eq!(g.total_length, expected, epsilon = 1e-9);
}

#[test]
fn progress_one_lands_exactly_on_last_point() {
    let g = trip();
    let pos = g.position_at(1.0);
    assert_eq!(pos.point, g.points[2]);
    assert_eq!(pos.segment, Some(1));
    assert_eq!(g.position_at(7.0).point, g.points[2]);
}

#[test]
fn marker_follows_leading_edge_of_drawn_path() {
    let g = trip();
    for progress in [0.1, 0.35, 0.5, 0.8, 0.99] {
        let spans = g.segment_spans(progress);
        let edge = spans.last().unwrap().end;
        let pos = g.position_at(progress);
        assert!((edge - pos.point).hypot() < 1e-6, "progress {progress}");
    }
    assert!(g.segment_spans(0.0).is_empty());
    assert_eq!(g.position_at(0.0).point, g.points[0]);
}

#[test]
fn spans_are_distance_based() {
    let g = trip();
    let first_share = g.segments[0].length / g.total_length;
    let spans = g.segment_spans(first_share / 2.0);
    assert_eq!(spans.len(), 1);
    assert!(spans[0].partial);
    let mid = g.segments[0].start.midpoint(g.segments[0].end);
    assert!((spans[0].end - mid).hypot() < 1e-6);

    let all = g.segment_spans(1.0);
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|s| !s.partial));
}

#[test]
fn trend_follows_greater_or_equal_rule() {
    assert_eq!(Trend::between(1.0, 2.0), Trend::Increase);
    assert_eq!(Trend::between(2.0, 2.0), Trend::Increase);
    assert_eq!(Trend::between(2.0, 1.999), Trend::Decrease);

    let g = trip();
    assert_eq!(g.segments[0].trend, Trend::Increase);
    assert_eq!(g.segments[1].trend, Trend::Decrease);
}

#[test]
fn equal_values_share_one_y() {
    let g = GeometrySnapshot::compute(
        &cfg(&[(5.0, "08:00"), (5.0, "08:10"), (5.0, "08:20")]),
        None,
    )
    .unwrap();
    assert!(g.points.iter().all(|p| p.y == g.points[0].y));
    assert!(g.segments.iter().all(|s| s.trend == Trend::Increase));
}

#[test]
fn equal_times_share_one_x_without_panicking() {
    let g = GeometrySnapshot::compute(
        &cfg(&[(1.0, "08:00"), (4.0, "08:00"), (2.0, "08:00")]),
        None,
    )
    .unwrap();
    assert!(g.points.iter().all(|p| p.x == g.points[0].x));
    assert!(g.total_length > 0.0);
    let pos = g.position_at(0.5);
    assert!(pos.point.x.is_finite() && pos.point.y.is_finite());
}

#[test]
fn single_point_is_complete_immediately() {
    let g = GeometrySnapshot::compute(&cfg(&[(3.0, "12:00")]), None).unwrap();
    assert!(g.segments.is_empty());
    assert_eq!(g.total_length, 0.0);
    assert!(g.is_complete_at(0.0));
    assert!(g.segment_spans(0.5).is_empty());
    let pos = g.position_at(0.0);
    assert_eq!(pos.point, g.points[0]);
    assert_eq!(pos.angle, 0.0);
    assert_eq!(pos.segment, None);
}

#[test]
fn heading_matches_segment_direction() {
    let g = trip();
    let up = g.position_at(0.1);
    assert_eq!(up.segment, Some(0));
    assert!(up.angle < 0.0, "rising segment heads up-screen");
    let down = g.position_at(0.9);
    assert_eq!(down.segment, Some(1));
    assert!(down.angle > 0.0, "falling segment heads down-screen");
}
