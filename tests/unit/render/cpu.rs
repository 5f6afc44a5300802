use super::*;
use crate::assets::decode::decode_image;

fn close(a: [u8; 4], b: [u8; 4], tol: u8) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= tol)
}

fn png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn canvas(w: u32, h: u32) -> CpuCanvas {
    CpuCanvas::new(Canvas {
        width: w,
        height: h,
    })
    .unwrap()
}

#[test]
fn oversized_canvas_is_rejected() {
    assert!(
        CpuCanvas::new(Canvas {
            width: 70_000,
            height: 10
        })
        .is_err()
    );
}

#[test]
fn begin_fills_background_and_resets_between_frames() {
    let mut c = canvas(8, 8);
    c.begin(Rgba8::from_hex(0xff0000));
    c.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Rgba8::from_hex(0x00ff00));
    let first = c.finish();
    assert_eq!(first.pixel(1, 1), Some([0, 255, 0, 255]));
    assert_eq!(first.pixel(6, 6), Some([255, 0, 0, 255]));

    c.begin(Rgba8::from_hex(0x0000ff));
    let second = c.finish();
    assert_eq!(second.pixel(1, 1), Some([0, 0, 255, 255]));
    assert!(second.premultiplied);
}

#[test]
fn opacity_layer_blends_over_background() {
    let mut c = canvas(4, 4);
    c.begin(Rgba8::from_hex(0x000000));
    c.with_opacity(0.5, |c| {
        c.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Rgba8::from_hex(0xffffff));
    });
    let f = c.finish();
    assert!(close(f.pixel(2, 2).unwrap(), [128, 128, 128, 255], 2));
}

#[test]
fn circle_covers_its_center() {
    let mut c = canvas(32, 32);
    c.begin(Rgba8::from_hex(0x000000));
    c.fill_circle(Point::new(16.0, 16.0), 9.0, Rgba8::from_hex(0xffffff));
    let f = c.finish();
    assert_eq!(f.pixel(16, 16), Some([255, 255, 255, 255]));
    assert_eq!(f.pixel(0, 0), Some([0, 0, 0, 255]));
}

#[test]
fn raster_graphic_is_scaled_into_destination() {
    let g = PreparedGraphic::Raster(decode_image(&png(2, 2, [255, 0, 0, 255])).unwrap());
    let mut c = canvas(16, 16);
    c.begin(Rgba8::from_hex(0x000000));
    c.draw_graphic(&g, 8.0, 8.0, Affine::translate((4.0, 4.0)))
        .unwrap();
    let f = c.finish();
    assert!(close(f.pixel(8, 8).unwrap(), [255, 0, 0, 255], 2));
    assert_eq!(f.pixel(1, 1), Some([0, 0, 0, 255]));
    assert_eq!(f.pixel(14, 14), Some([0, 0, 0, 255]));
}

#[test]
fn dashed_line_leaves_gaps() {
    let mut c = canvas(64, 8);
    c.begin(Rgba8::from_hex(0x000000));
    c.stroke_line(
        Point::new(0.0, 4.0),
        Point::new(64.0, 4.0),
        6.0,
        &[18.0, 12.0],
        Rgba8::from_hex(0x22c55e),
    );
    let f = c.finish();
    assert!(close(f.pixel(9, 4).unwrap(), [0x22, 0xc5, 0x5e, 255], 2));
    assert_eq!(f.pixel(24, 4), Some([0, 0, 0, 255]));
    assert!(close(f.pixel(39, 4).unwrap(), [0x22, 0xc5, 0x5e, 255], 2));
}
