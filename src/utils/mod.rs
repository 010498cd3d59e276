use std::path::{Component, Path};
use std::time::{SystemTime, UNIX_EPOCH};
use time::OffsetDateTime;

use crate::errors::WikiError;

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    text.replace("&", "&amp;")
        .replace("<", "&lt;")
        .replace(">", "&gt;")
        .replace("\"", "&quot;")
        .replace("'", "&#39;")
}

/// Generate last modified metadata HTML
pub fn last_modified_html(modified: Option<SystemTime>) -> String {
    let Some(mtime) = modified else {
        return String::new();
    };
    match mtime.duration_since(UNIX_EPOCH) {
        Ok(dur) => {
            let secs = dur.as_secs() as i64;
            let datetime = OffsetDateTime::from_unix_timestamp(secs).ok();
            if let Some(dt) = datetime {
                let fmt = time::format_description::well_known::Rfc3339;
                if let Ok(s) = dt.format(&fmt) {
                    return format!("<p class=\"meta\">Last modified: {}</p>", escape_html(&s));
                }
            }
            String::new()
        }
        Err(_) => String::new(),
    }
}

/// Normalize request path
pub fn normalize_path(path: &str) -> String {
    let mut parts = Vec::new();
    for part in path.trim_matches('/').split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        parts.push(part);
    }
    parts.join("/")
}

/// Reject paths that could leave the directory they are joined onto
pub fn ensure_safe_path(req_path: &str) -> Result<(), WikiError> {
    if req_path.is_empty() {
        return Err(WikiError::InvalidPath);
    }
    for comp in Path::new(req_path).components() {
        match comp {
            Component::Normal(_) => {}
            _ => return Err(WikiError::InvalidPath),
        }
    }
    Ok(())
}

/// Determine content type for a file based on its extension
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase()) {
        Some(ref ext) if ext == "svg" => "image/svg+xml",
        Some(ref ext) if ext == "png" => "image/png",
        Some(ref ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ref ext) if ext == "gif" => "image/gif",
        Some(ref ext) if ext == "webp" => "image/webp",
        Some(ref ext) if ext == "ico" => "image/x-icon",
        Some(ref ext) if ext == "css" => "text/css; charset=utf-8",
        Some(ref ext) if ext == "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<a href=\"x\">&'</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn modified_time_is_rfc3339() {
        let at = UNIX_EPOCH + Duration::from_secs(86_400);
        assert_eq!(
            last_modified_html(Some(at)),
            "<p class=\"meta\">Last modified: 1970-01-02T00:00:00Z</p>"
        );
        assert_eq!(last_modified_html(None), "");
    }

    #[test]
    fn normalize_drops_empty_and_dot_segments() {
        assert_eq!(normalize_path("/logo.png"), "logo.png");
        assert_eq!(normalize_path("a//./b/"), "a/b");
    }

    #[test]
    fn unsafe_paths_are_rejected() {
        assert!(ensure_safe_path("logo.png").is_ok());
        assert!(ensure_safe_path("icons/edit.svg").is_ok());
        assert!(matches!(ensure_safe_path("../secret"), Err(WikiError::InvalidPath)));
        assert!(matches!(ensure_safe_path("a/../../b"), Err(WikiError::InvalidPath)));
        assert!(matches!(ensure_safe_path("/etc/passwd"), Err(WikiError::InvalidPath)));
        assert!(matches!(ensure_safe_path(""), Err(WikiError::InvalidPath)));
    }

    #[test]
    fn image_content_types() {
        assert_eq!(content_type_for(Path::new("a.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("a")), "application/octet-stream");
    }
}
