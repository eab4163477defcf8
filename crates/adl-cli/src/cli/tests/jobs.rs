//! Tests for serve, fetch and pack.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_parse_serve_defaults() {
    match parse(&["adl", "serve"]) {
        CliCommand::Serve { bind, download_dir } => {
            assert!(bind.is_none());
            assert!(download_dir.is_none());
        }
        _ => panic!("expected Serve"),
    }
}

#[test]
fn cli_parse_serve_overrides() {
    match parse(&["adl", "serve", "--bind", "0.0.0.0:9000", "--download-dir", "/srv/audio"]) {
        CliCommand::Serve { bind, download_dir } => {
            assert_eq!(bind.as_deref(), Some("0.0.0.0:9000"));
            assert_eq!(download_dir, Some(PathBuf::from("/srv/audio")));
        }
        _ => panic!("expected Serve"),
    }
}

#[test]
fn cli_parse_fetch_minimal() {
    match parse(&["adl", "fetch", "https://example.com/book"]) {
        CliCommand::Fetch { job, download_dir } => {
            assert_eq!(job.url, "https://example.com/book");
            assert!(job.name.is_none());
            assert!(job.plugin.is_none());
            assert!(job.workers.is_none());
            assert!(download_dir.is_none());
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_all_options() {
    match parse(&[
        "adl",
        "fetch",
        "https://example.com/book",
        "--name",
        "My Book",
        "--plugin",
        "simple_mp3",
        "-w",
        "8",
    ]) {
        CliCommand::Fetch { job, .. } => {
            assert_eq!(job.name.as_deref(), Some("My Book"));
            assert_eq!(job.plugin.as_deref(), Some("simple_mp3"));
            assert_eq!(job.workers, Some(8));
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_pack_output() {
    match parse(&["adl", "pack", "https://example.com/book", "-o", "/tmp/book.zip"]) {
        CliCommand::Pack { job, output } => {
            assert_eq!(job.url, "https://example.com/book");
            assert_eq!(output, Some(PathBuf::from("/tmp/book.zip")));
        }
        _ => panic!("expected Pack"),
    }
}

#[test]
fn cli_rejects_non_numeric_workers() {
    let args = ["adl", "pack", "https://example.com/book", "--workers", "many"];
    assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn cli_fetch_requires_url() {
    assert!(Cli::try_parse_from(["adl", "fetch"]).is_err());
}
