use super::*;
use crate::config::model::{AspectRatio, DataPoint};
use crate::text::measure::EstimatedMetrics;

fn cfg() -> FlightConfig {
    FlightConfig::new(
        vec![DataPoint::new(1.0, "10:00"), DataPoint::new(2.0, "11:00")],
        AspectRatio::Landscape16x9,
        2.0,
    )
}

#[test]
fn header_grows_with_title_and_description() {
    let mut c = cfg();
    let bare = LayoutMetrics::compute(&c, None);
    assert_eq!(bare.header_height, HEADER_BASE);

    c.title = Some("Trip".to_string());
    let titled = LayoutMetrics::compute(&c, None);
    assert_eq!(titled.header_height, HEADER_BASE + TITLE_BLOCK);

    c.description = Some("Route".to_string());
    let both = LayoutMetrics::compute(&c, None);
    assert_eq!(both.header_height, HEADER_BASE + TITLE_BLOCK + DESCRIPTION_BLOCK);
    assert!(both.chart.y0 > titled.chart.y0);
}

#[test]
fn paddings_scale_with_label_font_size() {
    let mut c = cfg();
    let small = LayoutMetrics::compute(&c, None);
    c.label_style.font_size = 40.0;
    let large = LayoutMetrics::compute(&c, None);
    assert!(large.side_padding > small.side_padding);
    assert!(large.bottom_padding > small.bottom_padding);
    assert_eq!(
        small.side_padding,
        28.0 * 3.0 + MARKER_ICON_SIZE / 2.0 + OPTICAL_BALANCE
    );
    assert_eq!(small.chart.x0, small.side_padding);
    assert_eq!(small.chart.x1, 1920.0 - small.side_padding);
    assert_eq!(small.chart.y1, 1080.0 - small.bottom_padding);
}

#[test]
fn top_watermark_reserves_header_space() {
    let mut c = cfg();
    let wm = WatermarkConfig::image("logo.png", WatermarkPosition::TopRight);
    let size = WatermarkSize::estimate(&wm, c.aspect_ratio.canvas(), Some((200, 100)), &mut EstimatedMetrics);
    assert_eq!(size.width, 1080.0 * 0.2);
    assert_eq!(size.height, 1080.0 * 0.2 * 0.5);

    c.watermark = Some(wm.clone());
    let m = LayoutMetrics::compute(&c, Some(size));
    let reserve = size.height + wm.margin;
    assert_eq!(m.header_height, HEADER_BASE + reserve);
    assert_eq!(m.header_text_top, HEADER_TOP_INSET + reserve);
    assert_eq!(m.bottom_padding, LayoutMetrics::compute(&cfg(), None).bottom_padding);

    let placed = m.watermark.unwrap();
    assert_eq!(placed.rect.x1, 1920.0 - wm.margin);
    assert_eq!(placed.rect.y0, wm.margin);
}

#[test]
fn bottom_watermark_grows_bottom_padding() {
    let mut c = cfg();
    let wm = WatermarkConfig::text("demo", WatermarkPosition::BottomCenter);
    let size = WatermarkSize::estimate(&wm, c.aspect_ratio.canvas(), None, &mut EstimatedMetrics);
    assert_eq!(size.font_size, (1080.0 * 0.2 * 0.2) as f32);
    c.watermark = Some(wm.clone());
    let m = LayoutMetrics::compute(&c, Some(size));
    let base = LayoutMetrics::compute(&cfg(), None);
    assert_eq!(m.bottom_padding, base.bottom_padding + size.height + wm.margin);
    assert_eq!(m.header_height, HEADER_BASE);

    let placed = m.watermark.unwrap();
    assert!((placed.rect.center().x - 960.0).abs() < 1e-9);
    assert_eq!(placed.rect.y1, 1080.0 - wm.margin);
}
