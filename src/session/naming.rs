use chrono::NaiveDateTime;

/// Stem used when the title has nothing usable in it.
pub const DEFAULT_STEM: &str = "default";

/// Lowercase `title`, collapse every run of non-alphanumerics to one `-`, trim dashes.
///
/// Blank or symbol-only titles become [`DEFAULT_STEM`].
pub fn sanitize_title(title: Option<&str>) -> String {
    let mut out = String::new();
    let mut pending_dash = false;
    for c in title.unwrap_or_default().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        DEFAULT_STEM.to_string()
    } else {
        out
    }
}

/// `{sanitized-title}-{YYYY-MM-DD_HH-mm-ss}`.
pub fn artifact_stem(title: Option<&str>, timestamp: NaiveDateTime) -> String {
    format!(
        "{}-{}",
        sanitize_title(title),
        timestamp.format("%Y-%m-%d_%H-%M-%S")
    )
}
