//! Flightpath turns a short series of timestamped values into an animated "flight path" video.
//!
//! A marker icon travels along a dashed polyline connecting the points, with labels, an optional
//! header and watermark. The pipeline is:
//!
//! - Validate a [`FlightConfig`]
//! - Create a [`FlightRecorder`], which loads assets and freezes the layout into a
//!   [`GeometrySnapshot`]
//! - Capture frames into a raw VP8/WebM [`VideoBlob`] (or any [`FrameSink`])
//! - Transcode the capture to an H.264/AAC MP4, optionally muxed with an audio track
#![forbid(unsafe_code)]
#![deny(missing_docs)]
// Layout and asset helpers expose a few accessors only the tests and the CLI use.
#![allow(dead_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod assets;
pub(crate) mod config;
pub(crate) mod encode;
pub(crate) mod layout;
pub(crate) mod render;
pub(crate) mod session;
pub(crate) mod text;
/// Opt-in tracing setup.
pub mod telemetry;

pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::core::{
    Affine, BezPath, Canvas, Fps, FrameIndex, Point, Rect, Rgba8, Vec2,
};
pub use crate::foundation::error::{FlightError, FlightResult};

pub use crate::config::model::{
    AspectRatio, DataPoint, FlightConfig, LabelStrings, LabelStyle, WatermarkConfig,
    WatermarkKind, WatermarkPosition,
};
pub use crate::config::time::ClockTime;

pub use crate::layout::geometry::{GeometrySnapshot, PathPosition, Segment, SegmentSpan, Trend};
pub use crate::layout::labels::{LabelPlacement, LabelRole};
pub use crate::layout::metrics::{LayoutMetrics, WatermarkPlacement, WatermarkSize};

pub use crate::animation::clock::Pacing;
pub use crate::assets::fonts::FontBytes;
pub use crate::assets::store::{AssetStore, LoadedAssets};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::scene::FrameRenderer;

pub use crate::encode::capture::{WebmCaptureOpts, WebmCaptureSink};
pub use crate::encode::engine::{EncodeEngine, FfmpegEngine};
pub use crate::encode::ffmpeg::{
    ffmpeg_has_encoder, is_ffmpeg_on_path, is_ffprobe_on_path, probe_duration_secs,
};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig, VideoBlob};
pub use crate::encode::transcode::{Transcoder, transcode_args};

pub use crate::session::naming::{artifact_stem, sanitize_title};
pub use crate::session::recorder::{
    DEFAULT_TRAILING_DELAY, ExportOutcome, FlightRecorder, RecordOpts, RecordStats, RecorderOpts,
};
