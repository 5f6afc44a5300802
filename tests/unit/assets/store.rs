use std::io::Cursor;

use super::*;
use crate::config::model::{AspectRatio, DataPoint, WatermarkConfig, WatermarkPosition};

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "flightpath_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn write_png(path: &Path, w: u32, h: u32) {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(path, &buf).unwrap();
}

const TUFFY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/fonts/Tuffy.ttf");

fn cfg() -> FlightConfig {
    let mut c = FlightConfig::new(
        vec![DataPoint::new(1.0, "09:00"), DataPoint::new(2.0, "09:30")],
        AspectRatio::Landscape16x9,
        2.0,
    );
    c.font_path = Some(PathBuf::from(TUFFY));
    c
}

#[test]
fn graphic_is_decoded_once_and_served_from_cache() {
    let tmp = temp_dir("store_cache");
    std::fs::create_dir_all(&tmp).unwrap();
    let png = tmp.join("wm.png");
    write_png(&png, 3, 2);

    let mut store = AssetStore::new(Duration::from_secs(5));
    let first = store.graphic(&png).unwrap();
    assert_eq!(first.natural_size(), (3, 2));

    std::fs::remove_file(&png).unwrap();
    let second = store.graphic(&png).unwrap();
    assert_eq!(second.natural_size(), (3, 2));
    assert_eq!(store.cached_graphics(), 1);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn missing_file_is_asset_load_error() {
    let mut store = AssetStore::new(Duration::from_secs(5));
    let err = store
        .graphic(Path::new("/definitely/not/here/icon.png"))
        .unwrap_err();
    assert!(matches!(err, FlightError::AssetLoad(_)));
    assert!(err.to_string().contains("icon.png"));
}

#[test]
fn default_config_uses_builtin_icon_and_configured_font() {
    let mut store = AssetStore::new(Duration::from_secs(5));
    let loaded = store.load_for(&cfg()).unwrap();
    assert!(matches!(loaded.icon, PreparedGraphic::Svg(_)));
    assert!(loaded.watermark.is_none());
    assert_eq!(loaded.font.index, 0);
    assert_eq!(
        loaded.font.bytes.as_slice(),
        std::fs::read(TUFFY).unwrap().as_slice()
    );
}

#[test]
fn missing_font_path_falls_back_to_a_system_face() {
    let mut c = cfg();
    c.font_path = None;
    let mut store = AssetStore::new(Duration::from_secs(5));
    match store.load_for(&c) {
        Ok(loaded) => {
            assert!(!loaded.font.bytes.is_empty());
            let again = store.system_font().unwrap();
            assert!(Arc::ptr_eq(&loaded.font.bytes, &again.bytes));
        }
        // Hosts without any installed font must fail up front rather than render blank text.
        Err(err) => assert!(matches!(err, FlightError::AssetLoad(_))),
    }
}

#[test]
fn unreadable_font_path_is_asset_load_error() {
    let mut c = cfg();
    c.font_path = Some(PathBuf::from("/definitely/not/here/font.ttf"));
    let err = AssetStore::new(Duration::from_secs(5))
        .load_for(&c)
        .unwrap_err();
    assert!(matches!(err, FlightError::AssetLoad(_)));
    assert!(err.to_string().contains("font.ttf"));
}

#[test]
fn image_watermark_is_loaded_and_text_watermark_is_not() {
    let tmp = temp_dir("store_watermark");
    std::fs::create_dir_all(&tmp).unwrap();
    let png = tmp.join("logo.png");
    write_png(&png, 4, 4);

    let mut c = cfg();
    c.watermark = Some(WatermarkConfig::image(
        format!("file://{}", png.display()),
        WatermarkPosition::BottomRight,
    ));
    let mut store = AssetStore::new(Duration::from_secs(5));
    let loaded = store.load_for(&c).unwrap();
    assert_eq!(loaded.watermark.unwrap().natural_size(), (4, 4));

    c.watermark = Some(WatermarkConfig::text("hello", WatermarkPosition::TopLeft));
    let loaded = store.load_for(&c).unwrap();
    assert!(loaded.watermark.is_none());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn broken_marker_icon_fails_before_any_frame() {
    let tmp = temp_dir("store_bad_icon");
    std::fs::create_dir_all(&tmp).unwrap();
    let icon = tmp.join("icon.png");
    std::fs::write(&icon, b"not a png").unwrap();

    let mut c = cfg();
    c.marker_icon = Some(icon);
    let err = AssetStore::new(Duration::from_secs(5))
        .load_for(&c)
        .unwrap_err();
    assert!(matches!(err, FlightError::AssetLoad(_)));

    std::fs::remove_dir_all(&tmp).ok();
}
