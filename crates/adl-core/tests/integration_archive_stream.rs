//! Integration test: detect the adapter on a live page, download over HTTP and
//! stream the result as a ZIP that a standard reader accepts.

mod common;

use std::io::{Cursor, Read};
use std::sync::Arc;

use adl_core::adapter::AdapterRegistry;
use adl_core::broadcast::UpdateBroadcaster;
use adl_core::config::AdlConfig;
use adl_core::fetch::MemoryFetcher;
use adl_core::job::{DownloadMode, JobRegistry, JobStatus};
use adl_core::pipeline::{JobPipeline, JobRequest, PipelineError, MSG_NO_TRACKS, MSG_UNDETECTED};
use common::track_server::{self, TrackServerOptions};
use tempfile::tempdir;
use url::Url;

fn pipeline(dir: &std::path::Path) -> JobPipeline {
    let config = AdlConfig {
        download_dir: dir.to_path_buf(),
        allow_private_hosts: true,
        ..AdlConfig::default()
    };
    JobPipeline::new(
        Arc::new(JobRegistry::new()),
        Arc::new(UpdateBroadcaster::new()),
        Arc::new(AdapterRegistry::with_builtin(&config.fetch)),
        Arc::new(config),
    )
}

#[tokio::test]
async fn five_tracks_third_fails_archive_has_four_entries() {
    let base = track_server::start(TrackServerOptions {
        tracks: 5,
        failing: vec![2],
        ..Default::default()
    });
    let tmp = tempdir().unwrap();
    let p = pipeline(tmp.path());
    let id = p.registry().create(DownloadMode::Browser, None).job_id;

    let request = JobRequest {
        name: Some("book".into()),
        ..JobRequest::new(Url::parse(&format!("{}book/", base)).unwrap(), 2)
    };
    let job = p.prepare(id, &request).await.expect("prepare");
    assert_eq!(job.tracks.len(), 5);
    assert_eq!(p.registry().get(id).unwrap().message, "Scraping with simple_mp3 plugin...");

    let mut out = Vec::new();
    let fetcher = MemoryFetcher::new(p.config().fetch.clone());
    let done = p.stream(job, fetcher, &mut out).await.expect("stream");

    assert_eq!(done.status, JobStatus::Completed);
    let progress = done.progress.unwrap();
    assert_eq!((progress.total, progress.completed, progress.failed), (5, 4, 1));
    assert_eq!(done.result.unwrap().archive_bytes, Some(out.len() as u64));

    let mut archive = zip::ZipArchive::new(Cursor::new(out)).unwrap();
    assert_eq!(archive.len(), 4);
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["Chapter_1.mp3", "Chapter_2.mp3", "Chapter_4.mp3", "Chapter_5.mp3"]);

    let expected = [
        (0, "Chapter_1.mp3"),
        (1, "Chapter_2.mp3"),
        (3, "Chapter_4.mp3"),
        (4, "Chapter_5.mp3"),
    ];
    for (ordinal, name) in expected {
        let mut entry = archive.by_name(name).unwrap();
        assert_eq!(entry.compression(), zip::CompressionMethod::Stored);
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, track_server::body(ordinal), "{}", name);
    }
}

#[tokio::test]
async fn explicit_adapter_on_empty_page_reports_no_tracks() {
    let base = track_server::start(TrackServerOptions::default());
    let tmp = tempdir().unwrap();
    let p = pipeline(tmp.path());
    let id = p.registry().create(DownloadMode::Browser, None).job_id;

    let request = JobRequest {
        plugin: Some("simple_mp3".into()),
        ..JobRequest::new(Url::parse(&format!("{}empty/", base)).unwrap(), 2)
    };
    let err = p.prepare(id, &request).await.unwrap_err();
    assert!(matches!(err, PipelineError::Failed(ref m) if m == MSG_NO_TRACKS));
    let snap = p.registry().get(id).unwrap();
    assert_eq!(snap.status, JobStatus::Error);
    assert_eq!(snap.message, MSG_NO_TRACKS);
}

#[tokio::test]
async fn undetectable_page_is_an_error() {
    let base = track_server::start(TrackServerOptions::default());
    let tmp = tempdir().unwrap();
    let p = pipeline(tmp.path());
    let id = p.registry().create(DownloadMode::Browser, None).job_id;

    let request = JobRequest::new(Url::parse(&format!("{}empty/", base)).unwrap(), 2);
    p.prepare(id, &request).await.unwrap_err();
    assert_eq!(p.registry().get(id).unwrap().message, MSG_UNDETECTED);
}

#[tokio::test]
async fn identical_link_texts_give_distinct_entries() {
    let base = track_server::start(TrackServerOptions {
        tracks: 4,
        link_text: Some("Download".into()),
        ..Default::default()
    });
    let tmp = tempdir().unwrap();
    let p = pipeline(tmp.path());
    let id = p.registry().create(DownloadMode::Browser, None).job_id;

    let request = JobRequest::new(Url::parse(&format!("{}book/", base)).unwrap(), 4);
    let job = p.prepare(id, &request).await.expect("prepare");
    let mut out = Vec::new();
    let fetcher = MemoryFetcher::new(p.config().fetch.clone());
    let done = p.stream(job, fetcher, &mut out).await.expect("stream");
    assert_eq!(done.progress.unwrap().completed, 4);

    let mut archive = zip::ZipArchive::new(Cursor::new(out)).unwrap();
    assert_eq!(archive.len(), 4);
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        vec!["Download.mp3", "Download_002.mp3", "Download_003.mp3", "Download_004.mp3"]
    );
    let mut content = Vec::new();
    archive.by_name("Download_003.mp3").unwrap().read_to_end(&mut content).unwrap();
    assert_eq!(content, track_server::body(2));
}
