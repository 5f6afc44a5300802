use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::cancel::CancelToken;
use crate::foundation::error::{FlightError, FlightResult};
use crate::foundation::math::mul_div255_u16;

const CHILD_POLL: Duration = Duration::from_millis(10);

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    tool_runs("ffmpeg")
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    tool_runs("ffprobe")
}

fn tool_runs(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return `true` when the local `ffmpeg` build lists `encoder` (e.g. `libvpx`, `libx264`).
pub fn ffmpeg_has_encoder(encoder: &str) -> bool {
    let Ok(out) = Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stderr(Stdio::null())
        .output()
    else {
        return false;
    };
    String::from_utf8_lossy(&out.stdout)
        .lines()
        .any(|l| l.split_whitespace().nth(1) == Some(encoder))
}

/// Duration of a media file in seconds, as reported by `ffprobe`.
pub fn probe_duration_secs(path: &Path) -> FlightResult<f64> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .with_context(|| format!("run ffprobe on '{}'", path.display()))?;
    if !out.status.success() {
        return Err(FlightError::validation(format!(
            "ffprobe failed on '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    let text = String::from_utf8_lossy(&out.stdout);
    text.trim().parse::<f64>().map_err(|e| {
        FlightError::validation(format!("ffprobe returned '{}': {e}", text.trim()))
    })
}

/// Read a child pipe to the end on a background thread.
pub(crate) fn spawn_drain<R: Read + Send + 'static>(
    name: &str,
    mut reader: R,
) -> FlightResult<JoinHandle<std::io::Result<Vec<u8>>>> {
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            Ok(bytes)
        })
        .with_context(|| format!("spawn {name} thread"))
        .map_err(FlightError::from)
}

/// Join a drain thread, mapping its failures to a message.
pub(crate) fn join_drain(
    handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
) -> Result<Vec<u8>, String> {
    match handle {
        Some(h) => h
            .join()
            .map_err(|_| "drain thread panicked".to_string())?
            .map_err(|e| format!("pipe read failed: {e}")),
        None => Ok(Vec::new()),
    }
}

/// Wait for `child`, killing it if `cancel` fires first.
pub(crate) fn wait_with_cancel(child: &mut Child, cancel: &CancelToken) -> FlightResult<ExitStatus> {
    loop {
        if let Some(status) = child.try_wait().context("poll ffmpeg child")? {
            return Ok(status);
        }
        if cancel.is_cancelled() {
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!("ffmpeg child killed after cancellation");
            return Err(FlightError::Cancelled);
        }
        std::thread::sleep(CHILD_POLL);
    }
}

/// Composite premultiplied RGBA8 over an opaque background color.
pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> FlightResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(FlightError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        d[0] = (s[0] as u16 + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (s[1] as u16 + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (s[2] as u16 + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}
