//! URL modeling and filename derivation.
//!
//! Derives download names from page URLs, safe target filenames from
//! adapter output, and checks user-supplied page URLs before any fetch.

mod path;
mod sanitize;
mod validate;

pub use path::{extension_from_url_path, filename_from_url_path};
pub use sanitize::{sanitize_filename, NAME_MAX};
pub use validate::{validate_page_url, UrlRejected};

/// Derives a download name from a page URL when the caller gave none.
///
/// Uses the last path segment with non-word characters removed and runs of
/// `-`/whitespace collapsed to a single `-`; falls back to the host with dots
/// replaced by `-`. Anything shorter than 3 characters becomes
/// `audio-download-YYYYmmdd-HHMMSS`.
///
/// # Examples
///
/// - `https://example.com/books/the-final-empire` → `the-final-empire`
/// - `https://audio.example.com/` → `audio-example-com`
pub fn derive_download_name(url: &str, now: chrono::DateTime<chrono::Utc>) -> String {
    let parsed = url::Url::parse(url).ok();
    let last_segment = parsed
        .as_ref()
        .and_then(|u| u.path_segments())
        .and_then(|segs| segs.filter(|s| !s.is_empty()).last().map(str::to_string));

    let candidate = match last_segment {
        Some(seg) => collapse_dashes(&strip_non_word(&seg)),
        None => parsed
            .as_ref()
            .and_then(|u| u.host_str())
            .map(|h| h.replace('.', "-"))
            .unwrap_or_default(),
    };

    if candidate.chars().count() < 3 {
        format!("audio-download-{}", now.format("%Y%m%d-%H%M%S"))
    } else {
        candidate
    }
}

fn strip_non_word(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect()
}

fn collapse_dashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        if c == '-' || c.is_whitespace() {
            if !in_run {
                out.push('-');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}
