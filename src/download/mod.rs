//! Chapter downloads.
//!
//! A chapter is fetched page by page into a hidden staging directory next
//! to its final location, then renamed into place once every page is on
//! disk. Progress is reported on the caller's sink channel at the
//! downloader's own cadence; the interface forwards those readings
//! verbatim.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::NamedTempFile;
use tokio::sync::mpsc::Sender;

use crate::catalog::{Entry, Source, SourceError};

/// Per-chapter progress: pages fetched so far, and whether the chapter is
/// being assembled into its final location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub pages: usize,
    pub assembling: bool,
}

#[derive(Debug)]
pub enum DownloadError {
    Source(SourceError),
    Network(String),
    Http { status: u16 },
    Io(io::Error),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::Source(e) => write!(f, "source error: {e}"),
            DownloadError::Network(msg) => write!(f, "network error: {msg}"),
            DownloadError::Http { status } => write!(f, "page fetch failed (HTTP {status})"),
            DownloadError::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for DownloadError {}

impl From<io::Error> for DownloadError {
    fn from(e: io::Error) -> Self {
        DownloadError::Io(e)
    }
}

/// Download one chapter into `library/<series>/<chapter>/`.
///
/// Pages land in a `.part` staging directory first; the staging directory
/// is renamed over the final one only after the last page and the metadata
/// sidecar are written, so a finished chapter directory is always complete.
pub async fn fetch_chapter(
    client: &reqwest::Client,
    source: &dyn Source,
    library: &Path,
    series: &str,
    chapter: &Entry,
    sink: &Sender<PageInfo>,
) -> Result<PathBuf, DownloadError> {
    let refs = source.pages(chapter).await.map_err(DownloadError::Source)?;

    let series_dir = library.join(sanitize(series));
    ensure_dir(&series_dir)?;

    let chapter_name = sanitize(&chapter.title);
    let final_dir = series_dir.join(&chapter_name);
    let staging = series_dir.join(format!(".{chapter_name}.part"));
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;

    info!(
        "downloading '{}' / '{}': {} pages",
        series,
        chapter.title,
        refs.len()
    );

    let mut fetched = 0usize;
    for page in &refs {
        let response = client
            .get(&page.url)
            .send()
            .await
            .map_err(|e| DownloadError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Http {
                status: status.as_u16(),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DownloadError::Network(e.to_string()))?;

        fs::write(staging.join(&page.filename), &bytes)?;
        fetched += 1;
        debug!("page {}/{} of '{}'", fetched, refs.len(), chapter.title);
        let _ = sink.send(PageInfo { pages: fetched, assembling: false }).await;
    }

    let _ = sink.send(PageInfo { pages: fetched, assembling: true }).await;

    write_sidecar(&staging, series, chapter, fetched)?;
    if final_dir.exists() {
        fs::remove_dir_all(&final_dir)?;
    }
    fs::rename(&staging, &final_dir)?;

    Ok(final_dir)
}

/// Ensure the directory exists and is writable.
fn ensure_dir(dir: &Path) -> Result<(), DownloadError> {
    if dir.exists() {
        if !fs::metadata(dir)?.is_dir() {
            return Err(DownloadError::Io(io::Error::other(format!(
                "{} is not a directory",
                dir.display()
            ))));
        }
    } else {
        fs::create_dir_all(dir)?;
    }
    // Writability probe.
    NamedTempFile::new_in(dir)?;
    Ok(())
}

/// Atomically write a `chapter.json` sidecar describing the download.
fn write_sidecar(
    dir: &Path,
    series: &str,
    chapter: &Entry,
    pages: usize,
) -> Result<(), DownloadError> {
    let meta = serde_json::json!({
        "series": series,
        "source": chapter.source,
        "id": chapter.id,
        "title": chapter.title,
        "pages": pages,
    });
    let body = serde_json::to_string_pretty(&meta).map_err(io::Error::other)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(body.as_bytes())?;
    tmp.flush()?;
    tmp.persist(dir.join("chapter.json"))
        .map_err(|e| DownloadError::Io(e.error))?;
    Ok(())
}

/// Turn a display title into a filesystem-safe directory name.
fn sanitize(title: &str) -> String {
    const MAX_LEN: usize = 120;

    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim_matches([' ', '.']);
    let mut name: String = trimmed.chars().take(MAX_LEN).collect();
    if name.is_empty() {
        name = String::from("untitled");
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_separators() {
        assert_eq!(sanitize("One/Two\\Three"), "One_Two_Three");
        assert_eq!(sanitize("What? \"Why\""), "What_ _Why_");
    }

    #[test]
    fn test_sanitize_trims_dots_and_spaces() {
        assert_eq!(sanitize("  Chapter 1. "), "Chapter 1");
        assert_eq!(sanitize("..."), "untitled");
        assert_eq!(sanitize(""), "untitled");
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = "x".repeat(500);
        assert_eq!(sanitize(&long).chars().count(), 120);
    }
}
