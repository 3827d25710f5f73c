//! Name sanitizers.
//!
//! Two distinct rule sets live here. Folder keys become directory names
//! under the output root and use a strict alphabet. Attachment and archive
//! filenames keep more of their original shape (dots, `@`) since they only
//! ever name regular files inside an already-sanitized folder.

/// Maximum length of a folder key, in characters.
pub const MAX_KEY_LEN: usize = 80;

/// Maximum length of a sanitized filename, in characters.
const MAX_FILENAME_LEN: usize = 150;

/// Normalize an extracted key into a filesystem-safe folder name.
///
/// Returns `None` (Reject) when nothing usable remains — an all-punctuation
/// subject must never produce an empty or root-level folder name.
///
/// Rules: every character outside `[A-Za-z0-9_-]` becomes `_`, runs of `_`
/// collapse to one, leading/trailing `_`/`-` are trimmed, and the result is
/// truncated to [`MAX_KEY_LEN`] without leaving a dangling `_`/`-`.
pub fn folder_key(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len().min(MAX_KEY_LEN));

    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c);
        } else if !out.ends_with('_') {
            // '_' itself also lands here, collapsing runs
            out.push('_');
        }
    }

    let trimmed = out.trim_matches(|c| c == '_' || c == '-');
    let truncated: String = trimmed.chars().take(MAX_KEY_LEN).collect();
    let key = truncated.trim_end_matches(|c| c == '_' || c == '-');

    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Sanitize an attachment or archive filename.
///
/// Keeps alphanumerics and `. - _ @`, replaces everything else with `_`,
/// strips leading/trailing `_`/`.`, and falls back to `attachment.bin` when
/// nothing remains (some senders attach parts with no name at all).
pub fn filename(raw: &str) -> String {
    let mapped: String = raw
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | '@') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_LEN)
        .collect();

    let trimmed = mapped.trim_matches(|c| c == '_' || c == '.');
    if trimmed.is_empty() {
        "attachment.bin".to_string()
    } else {
        trimmed.to_string()
    }
}
