use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::animation::clock::Pacing;
use crate::animation::driver::{AnimationDriver, Tick, Timeline};
use crate::assets::store::AssetStore;
use crate::config::model::FlightConfig;
use crate::encode::capture::{WebmCaptureOpts, WebmCaptureSink};
use crate::encode::sink::{FrameSink, SinkConfig, VideoBlob};
use crate::encode::transcode::Transcoder;
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::Fps;
use crate::foundation::error::{FlightError, FlightResult};
use crate::render::frame::FrameRGBA;
use crate::render::scene::{BACKGROUND, FrameRenderer};
use crate::session::downloads::save_artifact;
use crate::session::naming::artifact_stem;

/// Hold after the final frame so the encoder flushes it before the capture stops.
pub const DEFAULT_TRAILING_DELAY: Duration = Duration::from_millis(200);

/// Options for one recording pass.
#[derive(Clone, Debug)]
pub struct RecordOpts {
    /// Capture rate.
    pub fps: Fps,
    /// Offline (as fast as possible) or realtime pacing.
    pub pacing: Pacing,
    /// How long the final frame is held after the destination is reached.
    pub trailing_delay: Duration,
    /// Upper bound for loading each asset before the first frame.
    pub asset_timeout: Duration,
}

impl Default for RecordOpts {
    fn default() -> Self {
        Self {
            fps: Fps::CAPTURE,
            pacing: Pacing::Offline,
            trailing_delay: DEFAULT_TRAILING_DELAY,
            asset_timeout: Duration::from_secs(10),
        }
    }
}

/// Recorder-level options.
#[derive(Clone, Debug)]
pub struct RecorderOpts {
    /// Directory artifacts are saved into.
    pub out_dir: PathBuf,
    /// Per-pass options.
    pub record: RecordOpts,
}

impl Default for RecorderOpts {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            record: RecordOpts::default(),
        }
    }
}

/// Counters for one recording pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Frames drawn by the renderer.
    pub frames_rendered: u64,
    /// Repeats of the final frame during the trailing hold.
    pub frames_held: u64,
}

/// Result of [`FlightRecorder::export`].
#[derive(Clone, Debug)]
pub struct ExportOutcome {
    /// The raw capture (still valid for another transcode attempt).
    pub raw: VideoBlob,
    /// The MP4 deliverable.
    pub video: VideoBlob,
    /// Where the MP4 was saved.
    pub video_path: PathBuf,
    /// Where the raw capture was saved, when requested.
    pub raw_path: Option<PathBuf>,
}

/// Marks the recorder busy for as long as it lives.
pub(crate) struct SessionGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SessionGuard<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> FlightResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| FlightError::Busy)?;
        Ok(Self { flag })
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

type TimestampSource = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Records a flight animation and turns it into video artifacts.
///
/// One recorder runs at most one session at a time; a second concurrent call fails with
/// [`FlightError::Busy`]. Assets and the encode engine are cached across sessions.
pub struct FlightRecorder {
    config: FlightConfig,
    opts: RecorderOpts,
    busy: AtomicBool,
    assets: Mutex<AssetStore>,
    transcoder: Transcoder,
    now: TimestampSource,
}

impl FlightRecorder {
    /// Create a recorder for a validated `config`.
    pub fn new(config: FlightConfig, opts: RecorderOpts) -> FlightResult<Self> {
        config.validate()?;
        let assets = AssetStore::new(opts.record.asset_timeout);
        Ok(Self {
            config,
            opts,
            busy: AtomicBool::new(false),
            assets: Mutex::new(assets),
            transcoder: Transcoder::ffmpeg(),
            now: Box::new(|| chrono::Local::now().naive_local()),
        })
    }

    /// Replace the transcoder (custom engines, tests).
    pub fn with_transcoder(mut self, transcoder: Transcoder) -> Self {
        self.transcoder = transcoder;
        self
    }

    /// Replace the clock used for artifact names.
    pub fn with_timestamp_source(
        mut self,
        now: impl Fn() -> NaiveDateTime + Send + Sync + 'static,
    ) -> Self {
        self.now = Box::new(now);
        self
    }

    /// The configuration being recorded.
    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    /// Recorder options.
    pub fn opts(&self) -> &RecorderOpts {
        &self.opts
    }

    /// `true` while a session is running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Load assets (bounded by the asset timeout) and build a renderer with a fresh snapshot.
    pub fn prepare_renderer(&self) -> FlightResult<FrameRenderer> {
        let loaded = self
            .assets
            .lock()
            .map_err(|_| FlightError::asset_load("asset store lock poisoned"))?
            .load_for(&self.config)?;
        FrameRenderer::new(&self.config, loaded)
    }

    /// Drive one recording pass into `sink`.
    #[tracing::instrument(skip_all)]
    pub fn record_into(
        &self,
        sink: &mut dyn FrameSink,
        cancel: &CancelToken,
    ) -> FlightResult<RecordStats> {
        let _guard = SessionGuard::acquire(&self.busy)?;
        self.run_pass(sink, cancel)
    }

    /// Capture the animation into a raw WebM blob, saving it too when `capture_raw_output`.
    #[tracing::instrument(skip(self, cancel))]
    pub fn record_animation(
        &self,
        capture_raw_output: bool,
        cancel: &CancelToken,
    ) -> FlightResult<VideoBlob> {
        let _guard = SessionGuard::acquire(&self.busy)?;
        let blob = self.capture_raw(cancel)?;
        if capture_raw_output {
            self.save(&blob, &self.stem())?;
        }
        Ok(blob)
    }

    /// Transcode a raw capture to MP4 (muxing `audio` when given) and save it.
    ///
    /// On failure nothing is written and `raw` stays usable for a retry.
    #[tracing::instrument(skip(self, raw, cancel))]
    pub fn export_final_video(
        &self,
        raw: &VideoBlob,
        audio: Option<&Path>,
        cancel: &CancelToken,
    ) -> FlightResult<VideoBlob> {
        let _guard = SessionGuard::acquire(&self.busy)?;
        let video = self.transcode(raw, audio, cancel)?;
        self.save(&video, &self.stem())?;
        Ok(video)
    }

    /// Record, then transcode, as one session; the raw capture is also saved when `keep_raw`.
    ///
    /// Both artifacts share one timestamped name stem, and the recorder stays busy between the
    /// two stages.
    #[tracing::instrument(skip(self, cancel))]
    pub fn export(
        &self,
        audio: Option<&Path>,
        keep_raw: bool,
        cancel: &CancelToken,
    ) -> FlightResult<ExportOutcome> {
        self.export_with(Self::capture_raw, audio, keep_raw, cancel)
    }

    fn export_with(
        &self,
        capture: impl FnOnce(&Self, &CancelToken) -> FlightResult<VideoBlob>,
        audio: Option<&Path>,
        keep_raw: bool,
        cancel: &CancelToken,
    ) -> FlightResult<ExportOutcome> {
        let _guard = SessionGuard::acquire(&self.busy)?;
        let stem = self.stem();

        let raw = capture(self, cancel)?;
        let raw_path = if keep_raw {
            Some(self.save(&raw, &stem)?)
        } else {
            None
        };
        let video = self.transcode(&raw, audio, cancel)?;
        let video_path = self.save(&video, &stem)?;
        Ok(ExportOutcome {
            raw,
            video,
            video_path,
            raw_path,
        })
    }

    fn capture_raw(&self, cancel: &CancelToken) -> FlightResult<VideoBlob> {
        let [r, g, b, _] = BACKGROUND.premultiplied();
        let mut sink = WebmCaptureSink::new(WebmCaptureOpts {
            bg_rgba: [r, g, b, 255],
            ..WebmCaptureOpts::default()
        });
        let stats = self.run_pass(&mut sink, cancel)?;
        let blob = sink.take_blob()?;
        tracing::info!(
            frames = stats.frames_total,
            bytes = blob.len(),
            "raw capture finished"
        );
        Ok(blob)
    }

    fn transcode(
        &self,
        raw: &VideoBlob,
        audio: Option<&Path>,
        cancel: &CancelToken,
    ) -> FlightResult<VideoBlob> {
        let video = self.transcoder.transcode(raw, audio, cancel)?;
        cancel.check()?;
        Ok(video)
    }

    fn stem(&self) -> String {
        artifact_stem(self.config.title_text(), (self.now)())
    }

    fn save(&self, blob: &VideoBlob, stem: &str) -> FlightResult<PathBuf> {
        save_artifact(
            &self.opts.out_dir,
            &format!("{stem}.{}", blob.extension()),
            &blob.bytes,
        )
    }

    fn run_pass(&self, sink: &mut dyn FrameSink, cancel: &CancelToken) -> FlightResult<RecordStats> {
        cancel.check()?;
        let mut renderer = self.prepare_renderer()?;

        let record = &self.opts.record;
        let snapshot = renderer.snapshot();
        let canvas = snapshot.canvas();
        let timeline = Timeline {
            fps: record.fps,
            duration_secs: self.config.duration_secs,
            trailing_delay: record.trailing_delay,
            instant: snapshot.total_length <= 0.0,
        };
        let mut driver = AnimationDriver::new(record.pacing.clock(), timeline)?;

        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: record.fps,
        })?;

        let mut stats = RecordStats::default();
        let mut last: Option<FrameRGBA> = None;
        loop {
            cancel.check()?;
            match driver.tick() {
                Tick::Frame { index, progress } => {
                    let frame = renderer.render(progress)?;
                    sink.push_frame(index, &frame)?;
                    stats.frames_rendered += 1;
                    last = Some(frame);
                }
                Tick::Hold { index } => {
                    let frame = last
                        .as_ref()
                        .ok_or_else(|| FlightError::capture("hold requested before any frame"))?;
                    sink.push_frame(index, frame)?;
                    stats.frames_held += 1;
                }
                Tick::Stopped => break,
            }
            stats.frames_total += 1;
        }
        sink.end()?;

        tracing::debug!(
            frames = stats.frames_total,
            held = stats.frames_held,
            "recording pass finished"
        );
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/recorder.rs"]
mod tests;
