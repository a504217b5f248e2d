//! Attachment filename sanitization and extension allow-list checks.
//!
//! Uploaded files are stored flat in one directory under their sanitized
//! client-supplied name, so the sanitizer must never yield a path component
//! or a hidden file.

use crate::error::CoreError;

/// Extensions accepted when no allow-list is configured.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "pdf"];

/// Maximum length of a stored attachment filename.
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Parse a comma-separated extension list (`"png, .JPG,gif"`).
///
/// Entries are trimmed, lowercased and stripped of a leading dot; empty
/// entries are dropped.
pub fn parse_extension_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Lowercased extension of `filename`, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Whether `filename` carries an extension from `allowed`.
pub fn is_allowed_extension(filename: &str, allowed: &[String]) -> bool {
    extension_of(filename).is_some_and(|ext| allowed.iter().any(|a| *a == ext))
}

/// Reduce a client-supplied filename to a safe flat name.
///
/// Non-ASCII characters are dropped, path separators become spaces,
/// whitespace runs collapse to `_`, anything outside `[A-Za-z0-9_.-]` is
/// removed and leading/trailing `.`/`_` are trimmed. The result may be empty.
pub fn sanitize_filename(raw: &str) -> String {
    let ascii: String = raw
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');

    if trimmed.len() > MAX_FILENAME_LENGTH {
        // Keep the extension when truncating.
        match trimmed.rsplit_once('.') {
            Some((stem, ext)) if ext.len() < MAX_FILENAME_LENGTH - 1 => {
                let keep = MAX_FILENAME_LENGTH - ext.len() - 1;
                format!("{}.{}", &stem[..keep.min(stem.len())], ext)
            }
            _ => trimmed[..MAX_FILENAME_LENGTH].to_string(),
        }
    } else {
        trimmed.to_string()
    }
}

/// Sanitize `raw` and check it against `allowed`, returning the stored name.
pub fn validate_upload(raw: &str, allowed: &[String]) -> Result<String, CoreError> {
    let sanitized = sanitize_filename(raw);
    if sanitized.is_empty() {
        return Err(CoreError::Validation(format!(
            "Filename '{raw}' has no usable characters"
        )));
    }
    if !is_allowed_extension(&sanitized, allowed) {
        return Err(CoreError::Validation(format!(
            "File type of '{raw}' is not allowed. Allowed extensions: {}",
            allowed.join(", ")
        )));
    }
    Ok(sanitized)
}
