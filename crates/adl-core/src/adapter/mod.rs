//! Scrape adapters: turn a page into a list of downloadable tracks.
//!
//! Adapters are looked up by tag. Detection runs over the fetched HTML in
//! registration order; the first match wins.

mod html;
mod simple_mp3;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::FetchConfig;
use crate::fetch::FetchError;
use crate::track::TrackSpec;

pub use simple_mp3::SimpleMp3Adapter;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to fetch page: {0}")]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    Page(String),
}

/// Listing entry for `/api/players` and `adl adapters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterInfo {
    pub tag: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub trait ScrapeAdapter: Send + Sync {
    fn tag(&self) -> &'static str;

    fn info(&self) -> AdapterInfo;

    /// Whether this adapter recognizes the page.
    fn detect(&self, html: &str) -> bool;

    /// Produces the track list for `page_url`. Blocking: performs network I/O.
    fn scrape(&self, page_url: &Url, name: &str) -> Result<Vec<TrackSpec>, ScrapeError>;
}

/// Tag -> adapter. Registering an adapter is adding an entry.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn ScrapeAdapter>>,
    by_tag: BTreeMap<&'static str, usize>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in adapters.
    pub fn with_builtin(opts: &FetchConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SimpleMp3Adapter::new(opts.clone())));
        registry
    }

    /// Adds `adapter`, replacing any adapter with the same tag.
    pub fn register(&mut self, adapter: Arc<dyn ScrapeAdapter>) {
        let tag = adapter.tag();
        match self.by_tag.get(tag) {
            Some(&i) => self.adapters[i] = adapter,
            None => {
                self.by_tag.insert(tag, self.adapters.len());
                self.adapters.push(adapter);
            }
        }
    }

    pub fn get(&self, tag: &str) -> Option<Arc<dyn ScrapeAdapter>> {
        self.by_tag.get(tag).map(|&i| Arc::clone(&self.adapters[i]))
    }

    /// First adapter, in registration order, that recognizes `html`.
    pub fn detect(&self, html: &str) -> Option<Arc<dyn ScrapeAdapter>> {
        self.adapters.iter().find(|a| a.detect(html)).cloned()
    }

    pub fn infos(&self) -> Vec<AdapterInfo> {
        self.adapters.iter().map(|a| a.info()).collect()
    }
}
