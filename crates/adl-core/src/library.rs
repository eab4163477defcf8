//! Saved server-mode downloads: one directory per job name under the
//! download root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncWrite;

use crate::archive::{ArchiveError, ArchiveSummary, DosDateTime, ZipStreamWriter};
use crate::url_model::{sanitize_filename, NAME_MAX};

/// Extensions listed and archived; anything else in the directory is ignored.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "aac", "ogg", "opus", "webm", "wav", "flac"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedDownload {
    pub name: String,
    pub files: usize,
    pub size: u64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("download not found")]
    NotFound,
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn is_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Audio files directly inside `dir`, sorted by name.
pub fn audio_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && is_audio(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Every saved download under `root`, newest first. A missing root is empty.
pub fn list_saved(root: &Path) -> io::Result<Vec<SavedDownload>> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut saved = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let files = audio_files(&entry.path())?;
        let mut size = 0;
        for f in &files {
            size += fs::metadata(f)?.len();
        }
        let meta = entry.metadata()?;
        let created = meta.created().or_else(|_| meta.modified())?;
        saved.push(SavedDownload {
            name,
            files: files.len(),
            size,
            created: DateTime::<Utc>::from(created),
        });
    }
    saved.sort_by(|a, b| b.created.cmp(&a.created));
    Ok(saved)
}

/// `<root>/<name>` if `name` is a plain directory name that exists.
pub fn saved_dir(root: &Path, name: &str) -> Result<PathBuf, LibraryError> {
    if name.is_empty() || sanitize_filename(name, NAME_MAX) != name {
        return Err(LibraryError::NotFound);
    }
    let dir = root.join(name);
    if !dir.is_dir() {
        return Err(LibraryError::NotFound);
    }
    Ok(dir)
}

pub fn delete_saved(root: &Path, name: &str) -> Result<(), LibraryError> {
    let dir = saved_dir(root, name)?;
    fs::remove_dir_all(&dir)?;
    tracing::info!(name, "deleted saved download");
    Ok(())
}

/// Writes `files` as a stored ZIP to `out`, one file in memory at a time.
pub async fn write_archive<W>(files: &[PathBuf], out: W) -> Result<ArchiveSummary, ArchiveError>
where
    W: AsyncWrite + Unpin,
{
    let mut archive = ZipStreamWriter::new(out);
    for path in files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let data = tokio::fs::read(path).await?;
        let modified = tokio::fs::metadata(path)
            .await
            .and_then(|m| m.modified())
            .map(|t| DosDateTime::from_naive(DateTime::<Local>::from(t).naive_local()))
            .unwrap_or(DosDateTime::EPOCH);
        archive.add_entry(name, &data, modified).await?;
    }
    archive.finish().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn populate(root: &Path, name: &str, files: &[(&str, &[u8])]) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        for (f, data) in files {
            fs::write(dir.join(f), data).unwrap();
        }
    }

    #[test]
    fn missing_root_lists_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(list_saved(&tmp.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn counts_audio_files_only() {
        let tmp = tempfile::tempdir().unwrap();
        let contents: &[(&str, &[u8])] =
            &[("a.mp3", b"12345"), ("b.FLAC", b"678"), ("cover.jpg", b"xxxxxxxx")];
        populate(tmp.path(), "book", contents);
        fs::write(tmp.path().join("stray.mp3"), b"not a dir").unwrap();

        let saved = list_saved(tmp.path()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "book");
        assert_eq!(saved[0].files, 2);
        assert_eq!(saved[0].size, 8);
    }

    #[test]
    fn saved_dir_rejects_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        populate(tmp.path(), "book", &[]);
        assert!(saved_dir(tmp.path(), "book").is_ok());
        assert!(matches!(saved_dir(tmp.path(), ".."), Err(LibraryError::NotFound)));
        assert!(matches!(saved_dir(tmp.path(), "a/../book"), Err(LibraryError::NotFound)));
        assert!(matches!(saved_dir(tmp.path(), "missing"), Err(LibraryError::NotFound)));
    }

    #[test]
    fn delete_removes_directory() {
        let tmp = tempfile::tempdir().unwrap();
        populate(tmp.path(), "book", &[("a.mp3", b"1")]);
        delete_saved(tmp.path(), "book").unwrap();
        assert!(!tmp.path().join("book").exists());
        assert!(matches!(delete_saved(tmp.path(), "book"), Err(LibraryError::NotFound)));
    }

    #[tokio::test]
    async fn archive_of_saved_files() {
        let tmp = tempfile::tempdir().unwrap();
        let contents: &[(&str, &[u8])] =
            &[("01.mp3", b"first"), ("02.mp3", b"second"), ("notes.txt", b"n")];
        populate(tmp.path(), "book", contents);
        let files = audio_files(&tmp.path().join("book")).unwrap();

        let mut out = Vec::new();
        let summary = write_archive(&files, &mut out).await.unwrap();
        assert_eq!(summary.entries, 2);

        let mut zip = zip::ZipArchive::new(Cursor::new(out)).unwrap();
        let mut content = String::new();
        zip.by_name("02.mp3").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "second");
    }
}
