use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::CAPTURE,
    }
}

fn frame(w: u32, h: u32) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: vec![0; (w * h * 4) as usize],
        premultiplied: true,
    }
}

#[test]
fn in_memory_sink_keeps_frames_in_order() {
    let mut s = InMemorySink::new();
    s.begin(cfg()).unwrap();
    s.push_frame(FrameIndex(0), &frame(2, 2)).unwrap();
    s.push_frame(FrameIndex(1), &frame(2, 2)).unwrap();
    s.end().unwrap();

    assert!(s.ended());
    assert_eq!(s.config(), Some(cfg()));
    let idx: Vec<u64> = s.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1]);
}

#[test]
fn out_of_order_and_mismatched_frames_are_rejected() {
    let mut s = InMemorySink::new();
    s.begin(cfg()).unwrap();
    s.push_frame(FrameIndex(3), &frame(2, 2)).unwrap();

    let err = s.push_frame(FrameIndex(3), &frame(2, 2)).unwrap_err();
    assert!(err.to_string().contains("out-of-order"));

    let err = s.push_frame(FrameIndex(4), &frame(4, 2)).unwrap_err();
    assert!(err.to_string().contains("size mismatch"));
}

#[test]
fn push_before_begin_is_a_capture_error() {
    let mut s = InMemorySink::new();
    let err = s.push_frame(FrameIndex(0), &frame(2, 2)).unwrap_err();
    assert!(matches!(err, FlightError::Capture(_)));
}

#[test]
fn blob_extension_follows_mime() {
    assert_eq!(VideoBlob::webm(vec![1]).extension(), "webm");
    assert_eq!(VideoBlob::mp4(vec![]).extension(), "mp4");
    assert!(VideoBlob::mp4(vec![]).is_empty());
    assert_eq!(
        format!("{:?}", VideoBlob::webm(vec![0; 5])),
        "VideoBlob { mime: \"video/webm\", len: 5 }"
    );
}
