//! Serve files from the static directory.

use std::path::{Path, PathBuf};
use tokio::fs;

/// Get the path of a file under `root`.
///
/// Returns `None` if any segment is empty, hidden (starts with `.`, which
/// includes `..`), or contains a path separator.
pub fn resolve<S: AsRef<str>>(root: &Path, segments: &[S]) -> Option<PathBuf> {
    if segments.is_empty() {
        return None;
    }

    let mut path = root.to_path_buf();
    for segment in segments {
        let segment = segment.as_ref();
        if segment.is_empty()
            || segment.starts_with('.')
            || segment.contains(['/', '\\'])
        {
            return None;
        }
        path.push(segment);
    }
    Some(path)
}

/// Get the MIME type for a file based on its extension.
#[must_use]
pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

/// Read a file under `root`.
///
/// Returns the contents and MIME type, or `None` if the path is not allowed
/// (see [`resolve()`]) or is not a readable file.
pub async fn load<S: AsRef<str>>(
    root: &Path,
    segments: &[S],
) -> Option<(Vec<u8>, &'static str)> {
    let path = resolve(root, segments)?;
    if !fs::metadata(&path).await.ok()?.is_file() {
        return None;
    }
    let content = fs::read(&path).await.ok()?;
    Some((content, content_type(&path)))
}
