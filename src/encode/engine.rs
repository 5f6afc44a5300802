use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::encode::ffmpeg::{is_ffmpeg_on_path, join_drain, spawn_drain, wait_with_cancel};
use crate::foundation::cancel::CancelToken;
use crate::foundation::error::{FlightError, FlightResult};

/// A transcoding engine with its own private file namespace.
///
/// Files are addressed by bare names (`input.webm`, `output.mp4`); `exec` runs one command line
/// against that namespace.
pub trait EncodeEngine: Send {
    /// Store `bytes` under `name`.
    fn write_file(&mut self, name: &str, bytes: &[u8]) -> FlightResult<()>;
    /// Run the engine with `args`; cancellation aborts the run.
    fn exec(&mut self, args: &[String], cancel: &CancelToken) -> FlightResult<()>;
    /// Read back the file stored under `name`.
    fn read_file(&mut self, name: &str) -> FlightResult<Vec<u8>>;
    /// Remove `name` from the namespace.
    fn delete_file(&mut self, name: &str) -> FlightResult<()>;
}

static ENGINE_SEQ: AtomicU64 = AtomicU64::new(0);

/// [`EncodeEngine`] backed by the system `ffmpeg` and a scratch directory.
///
/// The scratch directory is removed when the engine is dropped.
#[derive(Debug)]
pub struct FfmpegEngine {
    scratch: PathBuf,
}

impl FfmpegEngine {
    /// Check that `ffmpeg` is available and create the scratch directory.
    #[tracing::instrument]
    pub fn load() -> FlightResult<Self> {
        if !is_ffmpeg_on_path() {
            return Err(FlightError::encode(
                "encode engine failed to load: ffmpeg was not found on PATH",
            ));
        }
        let scratch = std::env::temp_dir().join(format!(
            "flightpath-engine-{}-{}",
            std::process::id(),
            ENGINE_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&scratch).map_err(|e| {
            FlightError::encode(format!(
                "encode engine failed to load: create scratch dir '{}': {e}",
                scratch.display()
            ))
        })?;
        tracing::debug!(scratch = %scratch.display(), "encode engine loaded");
        Ok(Self { scratch })
    }

    /// Scratch directory backing the file namespace.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch
    }

    fn path_for(&self, name: &str) -> FlightResult<PathBuf> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !valid {
            return Err(FlightError::encode(format!(
                "invalid engine file name '{name}'"
            )));
        }
        Ok(self.scratch.join(name))
    }
}

impl EncodeEngine for FfmpegEngine {
    fn write_file(&mut self, name: &str, bytes: &[u8]) -> FlightResult<()> {
        let path = self.path_for(name)?;
        std::fs::write(&path, bytes)
            .map_err(|e| FlightError::encode(format!("write '{name}' into engine: {e}")))
    }

    fn exec(&mut self, args: &[String], cancel: &CancelToken) -> FlightResult<()> {
        cancel.check()?;
        let mut child = Command::new("ffmpeg")
            .current_dir(&self.scratch)
            .args(["-y", "-hide_banner", "-loglevel", "error"])
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FlightError::encode(format!("failed to spawn ffmpeg: {e}")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| FlightError::encode("failed to open ffmpeg stderr"))?;
        let drain = spawn_drain("flightpath-engine-stderr", stderr)?;

        let status = wait_with_cancel(&mut child, cancel);
        let stderr = join_drain(Some(drain)).map_err(FlightError::encode)?;
        let status = status?;
        if !status.success() {
            return Err(FlightError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(())
    }

    fn read_file(&mut self, name: &str) -> FlightResult<Vec<u8>> {
        let path = self.path_for(name)?;
        std::fs::read(&path)
            .map_err(|e| FlightError::encode(format!("read '{name}' from engine: {e}")))
    }

    fn delete_file(&mut self, name: &str) -> FlightResult<()> {
        let path = self.path_for(name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FlightError::encode(format!(
                "delete '{name}' from engine: {e}"
            ))),
        }
    }
}

impl Drop for FfmpegEngine {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.scratch) {
            tracing::debug!(error = %e, "failed to remove engine scratch dir");
        }
    }
}
