//! In-process fetcher for unit tests: canned bodies, optional delay,
//! concurrency accounting.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{FetchError, TrackFetcher};
use crate::track::{resolve_tracks, Track, TrackSpec};
use crate::url_model::NAME_MAX;

/// CURLE_COULDNT_CONNECT.
const COULDNT_CONNECT: u32 = 7;

pub(crate) struct ScriptedFetcher {
    bodies: HashMap<String, Vec<u8>>,
    delay: Duration,
    current: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    /// URLs without a body fail with a transport error.
    pub(crate) fn new(bodies: HashMap<String, Vec<u8>>, delay: Duration) -> Self {
        Self {
            bodies,
            delay,
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TrackFetcher for ScriptedFetcher {
    type Output = Vec<u8>;

    fn fetch(&self, track: &Track) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.current.fetch_sub(1, Ordering::SeqCst);
        self.bodies
            .get(&track.url)
            .cloned()
            .ok_or_else(|| FetchError::Curl(curl::Error::new(COULDNT_CONNECT)))
    }
}

/// `n` tracks at `https://cdn.test/<i>.mp3` named `Track <i>`, plus bodies
/// for every ordinal not in `failing`.
pub(crate) fn tracks_with_bodies(
    n: usize,
    failing: &[usize],
) -> (Vec<Track>, HashMap<String, Vec<u8>>) {
    let specs: Vec<TrackSpec> = (0..n)
        .map(|i| TrackSpec::new(format!("https://cdn.test/{}.mp3", i), format!("Track {}", i)))
        .collect();
    let tracks = resolve_tracks(specs, "test", NAME_MAX);
    let bodies = tracks
        .iter()
        .filter(|t| !failing.contains(&t.ordinal))
        .map(|t| {
            let body: Vec<u8> = (0..(100 + t.ordinal * 37))
                .map(|b| (b * 7 + t.ordinal) as u8)
                .collect();
            (t.url.clone(), body)
        })
        .collect();
    (tracks, bodies)
}
