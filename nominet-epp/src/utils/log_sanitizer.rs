//! Log sanitization utilities
//!
//! Prevents credentials and auth codes from leaking into debug logs of raw EPP traffic,
//! and keeps large frames from flooding them.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum number of characters to include in truncated log output.
const TRUNCATE_LIMIT: usize = 256;

static SECRET_ELEMENTS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?s)<((?:[A-Za-z0-9_-]+:)?(?:pw|newPW))(\s[^>]*)?>.*?</")
        .ok()
});

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
///
/// Returns the original string if it's within the limit,
/// otherwise returns the first `TRUNCATE_LIMIT` characters with a suffix
/// indicating the total length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Masks the content of every `<pw>` / `<newPW>` element, whatever its prefix.
pub fn redact_secrets(xml: &str) -> String {
    match SECRET_ELEMENTS.as_ref() {
        Some(re) => re.replace_all(xml, "<$1$2>***</").into_owned(),
        None => xml.to_string(),
    }
}

/// Redact then truncate: the form raw frames are logged in.
pub fn sanitize_frame(xml: &str) -> String {
    truncate_for_log(&redact_secrets(xml))
}
