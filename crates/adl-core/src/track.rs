//! Track descriptors: what an adapter hands over, and what the downloader fetches.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::url_model::{extension_from_url_path, sanitize_filename};

const DEFAULT_EXTENSION: &str = "mp3";

/// One resource as reported by a scrape adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSpec {
    pub url: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
}

impl TrackSpec {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            original_filename: None,
        }
    }

    pub fn with_original_filename(mut self, filename: impl Into<String>) -> Self {
        self.original_filename = Some(filename.into());
        self
    }
}

/// A resolved track. Identity is `ordinal` (position in the source list) plus `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    pub ordinal: usize,
    pub url: String,
    /// Sanitized target filename, used on disk and as the archive entry name.
    pub filename: String,
    pub display_name: Option<String>,
    pub original_filename: Option<String>,
}

impl Track {
    /// Resolves the target filename for `spec` at position `ordinal`.
    ///
    /// Preference: sanitized `original_filename`, then sanitized `name` plus the
    /// URL's extension (default `.mp3`), then `<download_name>_<NNN>.<ext>`
    /// numbered from 1.
    pub fn resolve(ordinal: usize, spec: TrackSpec, download_name: &str, max_bytes: usize) -> Self {
        let ext =
            extension_from_url_path(&spec.url).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
        let suffix = format!(".{}", ext);

        let from_original = spec
            .original_filename
            .as_deref()
            .map(|f| sanitize_filename(f, max_bytes))
            .filter(|f| is_usable(f));

        let filename = from_original
            .or_else(|| {
                let stem_budget = max_bytes.saturating_sub(suffix.len()).max(1);
                let stem = sanitize_filename(spec.name.trim(), stem_budget);
                is_usable(&stem).then(|| format!("{}{}", stem, suffix))
            })
            .unwrap_or_else(|| fallback_filename(ordinal, download_name, &suffix, max_bytes));

        let display_name = Some(spec.name.trim().to_string()).filter(|n| !n.is_empty());

        Self {
            ordinal,
            url: spec.url,
            filename,
            display_name,
            original_filename: spec.original_filename,
        }
    }
}

fn is_usable(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".."
}

fn fallback_filename(
    ordinal: usize,
    download_name: &str,
    suffix: &str,
    max_bytes: usize,
) -> String {
    let numbered = format!("_{:03}{}", ordinal + 1, suffix);
    let prefix = sanitize_filename(download_name, max_bytes.saturating_sub(numbered.len()).max(1));
    let prefix = if is_usable(&prefix) { prefix } else { "track".to_string() };
    format!("{}{}", prefix, numbered)
}

/// Resolves a whole adapter result, assigning ordinals in list order.
///
/// Filenames are unique within the list (compared case-insensitively): a
/// name already taken gets `_<NNN>` (ordinal from 1) before its extension.
pub fn resolve_tracks(specs: Vec<TrackSpec>, download_name: &str, max_bytes: usize) -> Vec<Track> {
    let mut taken = HashSet::new();
    specs
        .into_iter()
        .enumerate()
        .map(|(i, spec)| {
            let mut track = Track::resolve(i, spec, download_name, max_bytes);
            if taken.contains(&track.filename.to_lowercase()) {
                track.filename = disambiguate(&track.filename, i, max_bytes, &taken);
            }
            taken.insert(track.filename.to_lowercase());
            track
        })
        .collect()
}

fn disambiguate(
    filename: &str,
    ordinal: usize,
    max_bytes: usize,
    taken: &HashSet<String>,
) -> String {
    let (stem, ext) = match filename.rfind('.') {
        Some(i) if i > 0 => filename.split_at(i),
        _ => (filename, ""),
    };
    let mut n = ordinal + 1;
    loop {
        let suffix = format!("_{:03}{}", n, ext);
        let mut take = max_bytes.saturating_sub(suffix.len()).min(stem.len());
        while take > 0 && !stem.is_char_boundary(take) {
            take -= 1;
        }
        let candidate = format!("{}{}", &stem[..take], suffix);
        if !taken.contains(&candidate.to_lowercase()) {
            return candidate;
        }
        n += 1;
    }
}
