use std::io::{Read, Write as _};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::ffmpeg::{
    flatten_premul_over_bg_to_opaque_rgba8, is_ffmpeg_on_path, join_drain, spawn_drain,
};
use crate::encode::sink::{FrameSink, SinkConfig, VideoBlob, check_frame};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FlightError, FlightResult};
use crate::render::frame::FrameRGBA;

const STDOUT_CHUNK: usize = 64 * 1024;

/// Options for [`WebmCaptureSink`].
#[derive(Clone, Debug)]
pub struct WebmCaptureOpts {
    /// Background used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Target VP8 bitrate, in ffmpeg syntax.
    pub bitrate: String,
}

impl Default for WebmCaptureOpts {
    fn default() -> Self {
        Self {
            bg_rgba: [0, 0, 0, 255],
            bitrate: "8M".to_string(),
        }
    }
}

/// Captures frames into a VP8/WebM byte stream.
///
/// Spawns `ffmpeg` reading raw RGBA frames from stdin and writing WebM to stdout. A reader
/// thread collects stdout chunks in arrival order; [`WebmCaptureSink::take_blob`] hands out the
/// concatenated stream after `end`.
pub struct WebmCaptureSink {
    opts: WebmCaptureOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<JoinHandle<std::io::Result<Vec<Vec<u8>>>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    blob: Option<VideoBlob>,
}

impl WebmCaptureSink {
    /// Create a sink; nothing is spawned until `begin`.
    pub fn new(opts: WebmCaptureOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stdout_drain: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            blob: None,
        }
    }

    /// The finished capture. Only available once after a successful `end`.
    pub fn take_blob(&mut self) -> FlightResult<VideoBlob> {
        self.blob
            .take()
            .ok_or_else(|| FlightError::capture("capture has not finished"))
    }

    fn capture_command(&self, cfg: &SinkConfig) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libvpx",
            "-b:v",
            &self.opts.bitrate,
            "-deadline",
            "realtime",
            "-cpu-used",
            "8",
            "-f",
            "webm",
            "pipe:1",
        ]);
        cmd
    }
}

impl FrameSink for WebmCaptureSink {
    fn begin(&mut self, cfg: SinkConfig) -> FlightResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(FlightError::validation(
                "capture width/height must be non-zero",
            ));
        }
        if !is_ffmpeg_on_path() {
            return Err(FlightError::capture(
                "ffmpeg is required for capture, but was not found on PATH",
            ));
        }

        let mut child = self.capture_command(&cfg).spawn().map_err(|e| {
            FlightError::capture(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| FlightError::capture("failed to open ffmpeg stdin"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| FlightError::capture("failed to open ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| FlightError::capture("failed to open ffmpeg stderr"))?;

        let stdout_drain = std::thread::Builder::new()
            .name("flightpath-capture-stdout".to_string())
            .spawn(move || {
                let mut chunks = Vec::new();
                let mut buf = vec![0u8; STDOUT_CHUNK];
                loop {
                    let n = stdout.read(&mut buf)?;
                    if n == 0 {
                        return Ok(chunks);
                    }
                    chunks.push(buf[..n].to_vec());
                }
            })
            .map_err(|e| FlightError::capture(format!("spawn capture reader: {e}")))?;
        let stderr_drain = spawn_drain("flightpath-capture-stderr", stderr)?;

        tracing::debug!(width = cfg.width, height = cfg.height, "webm capture started");
        self.scratch = vec![0u8; cfg.frame_len()];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.blob = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> FlightResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| FlightError::capture("capture sink not started"))?;
        check_frame(cfg, self.last_idx, idx, frame)?;
        self.last_idx = Some(idx);

        if frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(
                &mut self.scratch,
                &frame.data,
                self.opts.bg_rgba,
            )?;
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(FlightError::capture("capture sink is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            FlightError::capture(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    fn end(&mut self) -> FlightResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| FlightError::capture("capture sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| FlightError::capture(format!("failed to wait for ffmpeg: {e}")))?;
        let chunks = match self.stdout_drain.take() {
            Some(h) => h
                .join()
                .map_err(|_| FlightError::capture("capture reader thread panicked"))?
                .map_err(|e| FlightError::capture(format!("capture stream read failed: {e}")))?,
            None => Vec::new(),
        };
        let stderr = join_drain(self.stderr_drain.take()).map_err(FlightError::capture)?;

        if !status.success() {
            return Err(FlightError::capture(format!(
                "ffmpeg exited with status {}: {}",
                status,
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        if chunks.is_empty() {
            return Err(FlightError::capture("capture produced no data"));
        }

        let bytes = chunks.concat();
        tracing::debug!(
            chunks = chunks.len(),
            bytes = bytes.len(),
            "webm capture finished"
        );
        self.blob = Some(VideoBlob::webm(bytes));
        self.cfg = None;
        Ok(())
    }
}

impl Drop for WebmCaptureSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
