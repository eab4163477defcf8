//! Pull-based download run: each `next()` yields one finished track.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::task::{self, JoinSet};

use super::summary::DownloadSummary;
use crate::control::CancelFlag;
use crate::fetch::{FetchError, TrackFetcher};
use crate::track::Track;

/// Result of one fetch, tagged with the track it belongs to (completion
/// order differs from list order).
#[derive(Debug)]
pub struct TrackOutcome<T> {
    pub track: Track,
    pub result: Result<T, FetchError>,
}

impl<T> TrackOutcome<T> {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// A download run over one track list.
///
/// Fetches are admitted lazily: up to `workers` when `next()` is first
/// called, then one more each time a fetch finishes, unless the cancel flag
/// is set.
pub struct DownloadRun<F: TrackFetcher> {
    fetcher: Arc<F>,
    queue: VecDeque<Track>,
    in_flight: JoinSet<Result<F::Output, FetchError>>,
    /// Track behind each task in `in_flight`.
    running: HashMap<task::Id, Track>,
    workers: usize,
    cancel: CancelFlag,
    summary: DownloadSummary,
}

impl<F: TrackFetcher> DownloadRun<F> {
    pub fn new(tracks: Vec<Track>, workers: usize, fetcher: Arc<F>, cancel: CancelFlag) -> Self {
        let summary = DownloadSummary::new(tracks.len());
        Self {
            fetcher,
            queue: tracks.into(),
            in_flight: JoinSet::new(),
            running: HashMap::new(),
            workers: workers.max(1),
            cancel,
            summary,
        }
    }

    pub fn summary(&self) -> DownloadSummary {
        self.summary
    }

    fn admit(&mut self) {
        while self.in_flight.len() < self.workers {
            if self.cancel.is_cancelled() {
                if !self.queue.is_empty() {
                    tracing::info!(
                        skipped = self.queue.len(),
                        "cancelled, not starting queued tracks"
                    );
                    self.queue.clear();
                }
                self.summary.cancelled = true;
                return;
            }
            let Some(track) = self.queue.pop_front() else {
                return;
            };
            tracing::debug!(track = track.ordinal, url = %track.url, "fetch started");
            let fetcher = Arc::clone(&self.fetcher);
            let fetched = track.clone();
            let handle = self.in_flight.spawn(async move {
                match task::spawn_blocking(move || fetcher.fetch(&fetched)).await {
                    Ok(result) => result,
                    Err(e) => Err(FetchError::Worker(e.to_string())),
                }
            });
            self.running.insert(handle.id(), track);
        }
    }

    fn tally(&mut self, outcome: &TrackOutcome<F::Output>) {
        let track = &outcome.track;
        match &outcome.result {
            Ok(_) => {
                self.summary.completed += 1;
                tracing::debug!(track = track.ordinal, "fetch succeeded");
            }
            Err(e) => {
                self.summary.failed += 1;
                if e.is_transport() {
                    tracing::warn!(track = track.ordinal, url = %track.url, "fetch failed: {}", e);
                } else {
                    tracing::error!(track = track.ordinal, url = %track.url, "fetch failed: {}", e);
                }
            }
        }
    }

    /// Waits for the next fetch to finish. Returns `None` once nothing is
    /// queued or in flight; `summary()` is final from then on.
    ///
    /// Every admitted track yields exactly one outcome, including one whose
    /// task died (reported as `FetchError::Worker`).
    pub async fn next(&mut self) -> Option<TrackOutcome<F::Output>> {
        self.admit();
        loop {
            let (id, result) = match self.in_flight.join_next_with_id().await {
                None => {
                    if self.cancel.is_cancelled() {
                        self.summary.cancelled = true;
                    }
                    return None;
                }
                Some(Ok((id, result))) => (id, result),
                Some(Err(e)) => (e.id(), Err(FetchError::Worker(e.to_string()))),
            };
            let Some(track) = self.running.remove(&id) else {
                tracing::error!("finished download task has no track");
                continue;
            };
            let outcome = TrackOutcome { track, result };
            self.tally(&outcome);
            self.admit();
            return Some(outcome);
        }
    }
}
