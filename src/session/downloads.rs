use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::FlightResult;

/// Write `bytes` to `out_dir/file_name` atomically (temp file, then rename).
///
/// Readers never observe a partially written artifact.
pub fn save_artifact(out_dir: &Path, file_name: &str, bytes: &[u8]) -> FlightResult<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory '{}'", out_dir.display()))?;
    let final_path = out_dir.join(file_name);
    let tmp_path = out_dir.join(format!(".{file_name}.part"));

    let written = std::fs::write(&tmp_path, bytes)
        .with_context(|| format!("write '{}'", tmp_path.display()))
        .and_then(|()| {
            std::fs::rename(&tmp_path, &final_path)
                .with_context(|| format!("move artifact into '{}'", final_path.display()))
        });
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    tracing::info!(path = %final_path.display(), bytes = bytes.len(), "artifact saved");
    Ok(final_path)
}
