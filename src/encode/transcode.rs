use std::path::Path;
use std::sync::Mutex;

use crate::encode::engine::{EncodeEngine, FfmpegEngine};
use crate::encode::sink::VideoBlob;
use crate::foundation::cancel::CancelToken;
use crate::foundation::error::{FlightError, FlightResult};

/// Engine file name of the raw capture.
pub const INPUT_NAME: &str = "input.webm";
/// Engine file name of the deliverable.
pub const OUTPUT_NAME: &str = "output.mp4";

type EngineLoader = Box<dyn Fn() -> FlightResult<Box<dyn EncodeEngine>> + Send + Sync>;

/// Command line for the final H.264/AAC export.
///
/// With audio, the two inputs are mapped explicitly and `-shortest` cuts the result to the
/// shorter stream.
pub fn transcode_args(audio_name: Option<&str>) -> Vec<String> {
    let mut args: Vec<&str> = vec!["-i", INPUT_NAME];
    match audio_name {
        Some(audio) => args.extend([
            "-i",
            audio,
            "-map",
            "0:v:0",
            "-map",
            "1:a:0",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-shortest",
        ]),
        None => args.extend(["-an", "-c:v", "libx264", "-pix_fmt", "yuv420p"]),
    }
    args.extend(["-movflags", "+faststart", OUTPUT_NAME]);
    args.into_iter().map(str::to_string).collect()
}

/// Turns raw captures into MP4 deliverables through a lazily loaded [`EncodeEngine`].
///
/// The engine is loaded on first use and reused afterwards; calls are serialized by a mutex.
pub struct Transcoder {
    loader: EngineLoader,
    engine: Mutex<Option<Box<dyn EncodeEngine>>>,
}

impl Transcoder {
    /// Transcoder over the system `ffmpeg`.
    pub fn ffmpeg() -> Self {
        Self::with_loader(|| Ok(Box::new(FfmpegEngine::load()?) as Box<dyn EncodeEngine>))
    }

    /// Transcoder with a custom engine loader.
    pub fn with_loader(
        loader: impl Fn() -> FlightResult<Box<dyn EncodeEngine>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            loader: Box::new(loader),
            engine: Mutex::new(None),
        }
    }

    /// `true` once the engine has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.engine.lock().map(|e| e.is_some()).unwrap_or(false)
    }

    /// Transcode `raw` to MP4, muxing `audio` when given.
    ///
    /// Scratch files are removed whether or not the run succeeds; `raw` is left untouched so a
    /// failed attempt can be retried.
    #[tracing::instrument(skip_all, fields(raw_bytes = raw.len(), audio = audio.is_some()))]
    pub fn transcode(
        &self,
        raw: &VideoBlob,
        audio: Option<&Path>,
        cancel: &CancelToken,
    ) -> FlightResult<VideoBlob> {
        if raw.is_empty() {
            return Err(FlightError::validation("raw capture is empty"));
        }
        let audio = audio.map(read_audio).transpose()?;

        let mut guard = self
            .engine
            .lock()
            .map_err(|_| FlightError::encode("encode engine lock poisoned"))?;
        if guard.is_none() {
            *guard = Some((self.loader)().map_err(as_encode)?);
        }
        let engine = guard
            .as_mut()
            .ok_or_else(|| FlightError::encode("encode engine unavailable"))?;

        let audio_name = audio.as_ref().map(|(name, _)| name.as_str());
        let result = run(engine.as_mut(), raw, audio.as_ref(), cancel);

        for name in [Some(INPUT_NAME), audio_name, Some(OUTPUT_NAME)]
            .into_iter()
            .flatten()
        {
            if let Err(e) = engine.delete_file(name) {
                tracing::debug!(file = name, error = %e, "engine cleanup failed");
            }
        }

        let bytes = result?;
        tracing::debug!(bytes = bytes.len(), "transcode finished");
        Ok(VideoBlob::mp4(bytes))
    }
}

fn run(
    engine: &mut dyn EncodeEngine,
    raw: &VideoBlob,
    audio: Option<&(String, Vec<u8>)>,
    cancel: &CancelToken,
) -> FlightResult<Vec<u8>> {
    cancel.check()?;
    engine.write_file(INPUT_NAME, &raw.bytes).map_err(as_encode)?;
    if let Some((name, bytes)) = audio {
        engine.write_file(name, bytes).map_err(as_encode)?;
    }
    let args = transcode_args(audio.map(|(name, _)| name.as_str()));
    engine.exec(&args, cancel).map_err(as_encode)?;
    let bytes = engine.read_file(OUTPUT_NAME).map_err(as_encode)?;
    if bytes.is_empty() {
        return Err(FlightError::encode("engine produced an empty output"));
    }
    Ok(bytes)
}

fn read_audio(path: &Path) -> FlightResult<(String, Vec<u8>)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("bin")
        .to_ascii_lowercase();
    let bytes = std::fs::read(path).map_err(|e| {
        FlightError::encode(format!("read audio track '{}': {e}", path.display()))
    })?;
    Ok((format!("audio.{ext}"), bytes))
}

fn as_encode(e: FlightError) -> FlightError {
    match e {
        FlightError::Encode(_) | FlightError::Cancelled => e,
        other => FlightError::encode(other.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/transcode.rs"]
mod tests;
