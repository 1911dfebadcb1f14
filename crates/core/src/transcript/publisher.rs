use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use super::{render_html, TranscriptError, TranscriptRecord};

/// Where a published transcript ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedTranscript {
    pub filename: String,
    /// Publicly dereferenceable link.
    pub url: String,
}

/// Attempts at finding a free name before giving up.
pub const MAX_NAME_ATTEMPTS: u32 = 16;

/// `name` for the first attempt, then `stem-N.html` for attempt `N`.
pub fn numbered_filename(name: &str, attempt: u32) -> String {
    if attempt <= 1 {
        return name.to_string();
    }
    let stem = name.strip_suffix(".html").unwrap_or(name);
    format!("{}-{}.html", stem, attempt)
}

/// Durable storage for transcripts, exposed over HTTP by the server.
#[async_trait]
pub trait TranscriptPublisher: Send + Sync {
    async fn publish(&self, record: &TranscriptRecord)
        -> Result<PublishedTranscript, TranscriptError>;
}

/// Writes rendered transcripts into a directory served at `{base_url}/transcripts/`.
pub struct FsTranscriptPublisher {
    dir: PathBuf,
    base_url: String,
}

impl FsTranscriptPublisher {
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a file that did not exist before, numbering the name on collision.
    async fn create_unique(
        &self,
        name: &str,
    ) -> Result<(String, PathBuf, fs::File), TranscriptError> {
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let filename = numbered_filename(name, attempt);
            let path = self.dir.join(&filename);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((filename, path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(TranscriptError::WriteFailed { path, source: e }),
            }
        }
        Err(TranscriptError::AlreadyExists(name.to_string()))
    }

    pub fn url_for(&self, filename: &str) -> String {
        format!(
            "{}/transcripts/{}",
            self.base_url,
            urlencoding::encode(filename)
        )
    }
}

/// Write the whole document, removing the file again if the write fails.
///
/// A half-written file would otherwise be listed and keep its name taken.
async fn write_or_discard<W>(
    path: &Path,
    mut writer: W,
    contents: &[u8],
) -> Result<(), TranscriptError>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(contents).await?;
        writer.flush().await
    }
    .await;

    let Err(source) = written else {
        return Ok(());
    };
    drop(writer);
    if let Err(e) = fs::remove_file(path).await {
        warn!(path = ?path, error = %e, "Failed to remove partial transcript");
    }
    Err(TranscriptError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

#[async_trait]
impl TranscriptPublisher for FsTranscriptPublisher {
    async fn publish(
        &self,
        record: &TranscriptRecord,
    ) -> Result<PublishedTranscript, TranscriptError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| TranscriptError::WriteFailed {
                path: self.dir.clone(),
                source: e,
            })?;

        let (filename, path, file) = self.create_unique(record.filename()).await?;
        let html = render_html(record);
        write_or_discard(&path, file, html.as_bytes()).await?;

        let url = self.url_for(&filename);
        info!(
            filename = %filename,
            messages = record.entries().len(),
            "Transcript written"
        );
        Ok(PublishedTranscript { filename, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    /// Accepts nothing, as a full disk would.
    struct FullDisk;

    impl AsyncWrite for FullDisk {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "no space left")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn record() -> TranscriptRecord {
        let at = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        TranscriptRecord::new("beginner_middleman-2", at, vec![])
    }

    #[tokio::test]
    async fn test_publish_writes_file_and_returns_url() {
        let temp = TempDir::new().unwrap();
        let publisher = FsTranscriptPublisher::new(temp.path(), "https://example.com/");

        let published = publisher.publish(&record()).await.unwrap();

        assert_eq!(
            published.filename,
            "transcript-beginner_middleman-2-20240203-040506.html"
        );
        assert_eq!(
            published.url,
            "https://example.com/transcripts/transcript-beginner_middleman-2-20240203-040506.html"
        );
        let written = std::fs::read_to_string(temp.path().join(&published.filename)).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
    }

    #[tokio::test]
    async fn test_publish_never_overwrites() {
        let temp = TempDir::new().unwrap();
        let publisher = FsTranscriptPublisher::new(temp.path(), "http://localhost:5000");
        let first_name = record().filename().to_string();
        std::fs::write(temp.path().join(&first_name), "original").unwrap();

        let published = publisher.publish(&record()).await.unwrap();
        assert_eq!(
            published.filename,
            "transcript-beginner_middleman-2-20240203-040506-2.html"
        );
        let original = std::fs::read_to_string(temp.path().join(&first_name)).unwrap();
        assert_eq!(original, "original");

        let third = publisher.publish(&record()).await.unwrap();
        assert!(third.filename.ends_with("-3.html"));
    }

    #[test]
    fn test_numbered_filename() {
        assert_eq!(numbered_filename("t-a-1.html", 1), "t-a-1.html");
        assert_eq!(numbered_filename("t-a-1.html", 4), "t-a-1-4.html");
    }

    #[tokio::test]
    async fn test_publish_creates_missing_directory() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("static").join("transcripts");
        let publisher = FsTranscriptPublisher::new(&nested, "http://localhost:5000");

        publisher.publish(&record()).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(record().filename());
        std::fs::write(&path, "").unwrap();

        let err = write_or_discard(&path, FullDisk, b"<!DOCTYPE html>")
            .await
            .unwrap_err();

        assert!(matches!(err, TranscriptError::WriteFailed { .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_name_is_free_after_failed_write() {
        let temp = TempDir::new().unwrap();
        let publisher = FsTranscriptPublisher::new(temp.path(), "http://localhost:5000");
        let path = temp.path().join(record().filename());
        std::fs::write(&path, "").unwrap();
        write_or_discard(&path, FullDisk, b"x").await.unwrap_err();

        let published = publisher.publish(&record()).await.unwrap();
        assert_eq!(published.filename, record().filename());
    }
}
