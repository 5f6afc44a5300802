use super::*;
use crate::config::model::{AspectRatio, DataPoint};
use crate::text::measure::EstimatedMetrics;

fn strictly_disjoint(a: &Rect, b: &Rect) -> bool {
    a.x1 <= b.x0 || b.x1 <= a.x0 || a.y1 <= b.y0 || b.y1 <= a.y0
}

fn snapshot(points: &[(f64, &str)]) -> (FlightConfig, GeometrySnapshot) {
    let cfg = FlightConfig::new(
        points.iter().map(|(v, t)| DataPoint::new(*v, *t)).collect(),
        AspectRatio::Square1x1,
        3.0,
    );
    let g = GeometrySnapshot::compute(&cfg, None).unwrap();
    (cfg, g)
}

#[test]
fn overlapping_pair_is_pushed_below_the_earlier_box() {
    let mut rects = vec![
        Rect::new(100.0, 100.0, 200.0, 150.0),
        Rect::new(150.0, 120.0, 250.0, 170.0),
    ];
    resolve_collisions(&mut rects, 6.0);
    assert_eq!(rects[0], Rect::new(100.0, 100.0, 200.0, 150.0));
    assert_eq!(rects[1].y0, 156.0);
    assert_eq!(rects[1].height(), 50.0);
    assert!(strictly_disjoint(&rects[0], &rects[1]));
}

#[test]
fn push_is_transitive_across_three_boxes() {
    let mut rects = vec![
        Rect::new(0.0, 0.0, 100.0, 40.0),
        Rect::new(10.0, 10.0, 110.0, 50.0),
        Rect::new(20.0, 5.0, 120.0, 45.0),
    ];
    resolve_collisions(&mut rects, 6.0);
    assert_eq!(rects[1].y0, 46.0);
    // Clears the first box, then collides with the moved second box and clears it too.
    assert_eq!(rects[2].y0, 92.0);
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            assert!(strictly_disjoint(&rects[i], &rects[j]), "{i} vs {j}");
        }
    }
}

#[test]
fn disjoint_boxes_stay_put() {
    let mut rects = vec![
        Rect::new(0.0, 0.0, 50.0, 20.0),
        Rect::new(60.0, 0.0, 110.0, 20.0),
    ];
    let before = rects.clone();
    resolve_collisions(&mut rects, 6.0);
    assert_eq!(rects, before);
}

#[test]
fn roles_tags_and_backgrounds() {
    let (cfg, g) = snapshot(&[(10.0, "09:00"), (15.0, "09:05"), (8.0, "09:10")]);
    let labels = place_labels(&g, &cfg, &mut EstimatedMetrics);
    assert_eq!(labels.len(), 3);

    assert_eq!(labels[0].role, LabelRole::Start);
    assert_eq!(labels[0].lines, vec!["start", "10 @ 09:00"]);
    assert_eq!(labels[0].background, START_LABEL_BG.with_alpha(LABEL_BG_ALPHA));

    assert_eq!(labels[1].role, LabelRole::Waypoint);
    assert_eq!(labels[1].lines, vec!["15 @ 09:05"]);

    assert_eq!(labels[2].role, LabelRole::Destination);
    assert_eq!(labels[2].lines, vec!["final destination", "8 @ 09:10"]);
    assert_eq!(labels[2].background.a, LABEL_BG_ALPHA);
}

#[test]
fn dense_points_produce_no_residual_overlap() {
    let (cfg, g) = snapshot(&[
        (10.0, "09:00"),
        (10.5, "09:01"),
        (10.2, "09:02"),
        (10.4, "09:03"),
        (10.1, "09:04"),
    ]);
    let labels = place_labels(&g, &cfg, &mut EstimatedMetrics);
    for i in 0..labels.len() {
        for j in (i + 1)..labels.len() {
            assert!(
                strictly_disjoint(&labels[i].rect, &labels[j].rect),
                "labels {i} and {j} overlap"
            );
        }
    }
}

#[test]
fn labels_stay_inside_horizontal_canvas_bounds() {
    let (cfg, g) = snapshot(&[(1.0, "00:00"), (2.0, "23:59")]);
    let labels = place_labels(&g, &cfg, &mut EstimatedMetrics);
    let width = g.canvas().width_f64();
    for l in &labels {
        assert!(l.rect.x0 >= LABEL_EDGE_INSET - 1e-9);
        assert!(l.rect.x1 <= width - LABEL_EDGE_INSET + 1e-9);
    }
}

#[test]
fn tick_anchor_touches_the_nearest_box_edge() {
    let (cfg, g) = snapshot(&[(10.0, "09:00"), (15.0, "09:05")]);
    let labels = place_labels(&g, &cfg, &mut EstimatedMetrics);
    for l in &labels {
        assert!(l.anchor.y == l.rect.y0 || l.anchor.y == l.rect.y1);
        assert!(l.anchor.x >= l.rect.x0 && l.anchor.x <= l.rect.x1);
    }
    // Unobstructed labels sit above their points.
    assert_eq!(labels[0].anchor.y, labels[0].rect.y1);
    assert!(labels[0].rect.y1 < labels[0].point.y);
}

#[test]
fn single_point_gets_the_start_tag() {
    let (cfg, g) = snapshot(&[(3.0, "12:00")]);
    let labels = place_labels(&g, &cfg, &mut EstimatedMetrics);
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].role, LabelRole::Start);
}

#[test]
fn value_formatting_trims_trailing_zeros() {
    assert_eq!(format_value(10.0), "10");
    assert_eq!(format_value(100.0), "100");
    assert_eq!(format_value(10.5), "10.5");
    assert_eq!(format_value(10.257), "10.26");
    assert_eq!(format_value(-0.001), "0");
    assert_eq!(format_value(-2.5), "-2.5");
}
