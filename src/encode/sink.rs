use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{FlightError, FlightResult};
use crate::render::frame::FrameRGBA;

/// MIME type of the raw capture.
pub const MIME_WEBM: &str = "video/webm";
/// MIME type of the final deliverable.
pub const MIME_MP4: &str = "video/mp4";

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

impl SinkConfig {
    /// Bytes in one RGBA8 frame.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Sink contract for consuming rendered frames in capture order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> FlightResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> FlightResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> FlightResult<()>;
}

/// Encoded video bytes plus their MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct VideoBlob {
    /// Container bytes.
    pub bytes: Vec<u8>,
    /// `video/webm` or `video/mp4`.
    pub mime: &'static str,
}

impl VideoBlob {
    /// Raw VP8/WebM capture.
    pub fn webm(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime: MIME_WEBM,
        }
    }

    /// H.264/AAC MP4 deliverable.
    pub fn mp4(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime: MIME_MP4,
        }
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        if self.mime == MIME_MP4 { "mp4" } else { "webm" }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` when no bytes were produced.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for VideoBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoBlob")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// `true` once `end` was called.
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> FlightResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> FlightResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| FlightError::capture("in-memory sink not started"))?;
        check_frame(cfg, self.frames.last().map(|(i, _)| *i), idx, frame)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> FlightResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Shared `push_frame` checks: strictly increasing index and matching dimensions.
pub(crate) fn check_frame(
    cfg: &SinkConfig,
    last: Option<FrameIndex>,
    idx: FrameIndex,
    frame: &FrameRGBA,
) -> FlightResult<()> {
    if let Some(last) = last
        && idx.0 <= last.0
    {
        return Err(FlightError::validation(
            "sink received out-of-order frame index",
        ));
    }
    if frame.width != cfg.width || frame.height != cfg.height {
        return Err(FlightError::validation(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width, frame.height, cfg.width, cfg.height
        )));
    }
    if frame.data.len() != cfg.frame_len() {
        return Err(FlightError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
