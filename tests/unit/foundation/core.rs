use super::*;

#[test]
fn fps_validation_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(60, 0).is_err());
    assert_eq!(Fps::new(60, 1).unwrap(), Fps::CAPTURE);
}

#[test]
fn fps_frame_conversions() {
    let fps = Fps::CAPTURE;
    assert_eq!(fps.secs_to_frames_ceil(3.0), 180);
    assert_eq!(fps.secs_to_frames_ceil(3.001), 181);
    assert_eq!(fps.secs_to_frames_floor(0.05), 3);
    approx::assert_abs_diff_eq!(fps.frames_to_secs(180), 3.0, epsilon = 1e-12);
}

#[test]
fn rgba8_from_hex_and_premultiply() {
    let c = Rgba8::from_hex(0x22c55e);
    assert_eq!((c.r, c.g, c.b, c.a), (0x22, 0xc5, 0x5e, 255));
    assert_eq!(c.premultiplied(), [0x22, 0xc5, 0x5e, 255]);

    let half = Rgba8::from_hex(0xff0000).with_alpha(128);
    assert_eq!(half.premultiplied(), [128, 0, 0, 128]);
}

#[test]
fn canvas_rect_covers_full_size() {
    let c = Canvas {
        width: 1080,
        height: 1350,
    };
    assert_eq!(c.rect(), Rect::new(0.0, 0.0, 1080.0, 1350.0));
}
