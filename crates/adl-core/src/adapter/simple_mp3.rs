//! Direct `.mp3` links: `<a href="...mp3">` and any element with `data-url="...mp3"`.

use std::collections::HashSet;

use url::Url;

use super::html::{anchor_text, start_tags};
use super::{AdapterInfo, ScrapeAdapter, ScrapeError};
use crate::config::FetchConfig;
use crate::fetch::fetch_page;
use crate::track::TrackSpec;

pub struct SimpleMp3Adapter {
    opts: FetchConfig,
}

impl SimpleMp3Adapter {
    pub const TAG: &'static str = "simple_mp3";

    pub fn new(opts: FetchConfig) -> Self {
        Self { opts }
    }
}

fn is_mp3(value: &str) -> bool {
    value.to_ascii_lowercase().ends_with(".mp3")
}

/// Link candidates in document order: (raw attribute value, link text).
fn mp3_links(html: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for tag in start_tags(html) {
        if tag.name == "a" {
            if let Some(href) = tag.attr("href").filter(|h| is_mp3(h)) {
                out.push((href, anchor_text(html, tag.end)));
                continue;
            }
        }
        if let Some(data_url) = tag.attr("data-url").filter(|u| is_mp3(u)) {
            let text = if tag.name == "a" {
                anchor_text(html, tag.end)
            } else {
                String::new()
            };
            out.push((data_url, text));
        }
    }
    out
}

/// Resolves links against `page_url`, drops duplicates and non-HTTP targets,
/// and names each track by its link text or `Track N`.
pub(crate) fn tracks_from_html(page_url: &Url, html: &str) -> Vec<TrackSpec> {
    let mut seen = HashSet::new();
    let mut tracks = Vec::new();
    for (raw, text) in mp3_links(html) {
        let Ok(url) = page_url.join(&raw) else {
            tracing::debug!(link = %raw, "skipping unresolvable link");
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") || !seen.insert(url.to_string()) {
            continue;
        }
        let name = if text.is_empty() {
            format!("Track {}", tracks.len() + 1)
        } else {
            text
        };
        tracks.push(TrackSpec::new(url.as_str(), name));
    }
    tracks
}

impl ScrapeAdapter for SimpleMp3Adapter {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn info(&self) -> AdapterInfo {
        AdapterInfo {
            tag: Self::TAG,
            name: "Simple MP3 Links",
            description: "Direct MP3 file links on the page",
        }
    }

    fn detect(&self, html: &str) -> bool {
        !mp3_links(html).is_empty()
    }

    fn scrape(&self, page_url: &Url, _name: &str) -> Result<Vec<TrackSpec>, ScrapeError> {
        let html = fetch_page(page_url.as_str(), &self.opts)?;
        let tracks = tracks_from_html(page_url, &html);
        tracing::info!(url = %page_url, tracks = tracks.len(), "simple_mp3 scrape finished");
        Ok(tracks)
    }
}
