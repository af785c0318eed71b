use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ImageError;

const MAX_FILENAME_LEN: usize = 200;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9._-]+").expect("filename pattern is valid")
});

/// Lower-cased extension of `file_name` if it is in `allowed` (compared case-insensitively).
pub fn allowed_extension(file_name: &str, allowed: &[String]) -> Result<String, ImageError> {
    let ext = Path::new(file_name.trim())
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or(ImageError::MissingExtension)?;

    if allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)) {
        Ok(ext)
    } else {
        Err(ImageError::UnsupportedFormat(ext))
    }
}

/// Display-only version of a user supplied file name. Never used as a storage path.
pub fn sanitize_filename(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned = UNSAFE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');

    if cleaned.is_empty() {
        return "image".to_string();
    }

    cleaned.chars().take(MAX_FILENAME_LEN).collect()
}
