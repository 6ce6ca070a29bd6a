//! Append-only writer for the connection log.

use chrono::SecondsFormat;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::monitor::CheckResult;
use crate::store::{StoreError, HEADER};

/// Appends check results to a CSV file, one row per call.
///
/// No file handle is kept between calls: each append opens the file, writes a
/// single row with one write, and closes it again.
#[derive(Debug, Clone)]
pub struct LogAppender {
    path: PathBuf,
}

impl LogAppender {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with its header row unless it already exists.
    ///
    /// Returns `true` when the file was created. An existing file is left
    /// untouched, whatever it contains.
    pub async fn ensure_initialized(&self) -> Result<bool, StoreError> {
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        write_header_or_remove(&self.path, &mut file).await?;
        tracing::info!(path = %self.path.display(), "Created log file");
        Ok(true)
    }

    /// Append one result as a CSV row.
    pub async fn append(&self, result: &CheckResult) -> Result<(), StoreError> {
        let row = format_row(result);
        let mut file = OpenOptions::new().append(true).open(&self.path).await?;
        file.write_all(row.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Write the header to a freshly created file, removing the file if the
/// write fails so the next start creates it again.
async fn write_header_or_remove<W>(path: &Path, out: &mut W) -> Result<(), StoreError>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        out.write_all(HEADER.as_bytes()).await?;
        out.flush().await
    }
    .await;

    if let Err(e) = written {
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            tracing::warn!(
                path = %path.display(),
                error = %remove_err,
                "Failed to remove partially written log file"
            );
        }
        return Err(e.into());
    }
    Ok(())
}

/// Render a result as a newline-terminated row; only the message is quoted.
pub fn format_row(result: &CheckResult) -> String {
    format!(
        "{},{},{},{},{},{},\"{}\"\n",
        result.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        result.status,
        result.latency_ms,
        result.uptime,
        result.downtime,
        result.changes,
        result.message,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::Status;
    use chrono::{FixedOffset, Local, TimeZone};
    use std::pin::Pin;
    use std::task::{Context, Poll};

    fn sample(message: &str) -> CheckResult {
        let timestamp = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 12, 30, 5)
            .unwrap()
            .with_timezone(&Local);
        CheckResult {
            timestamp,
            status: Status::Down,
            latency_ms: -1,
            uptime: "1m5s".into(),
            downtime: "0s".into(),
            message: message.into(),
            changes: 4,
        }
    }

    #[test]
    fn test_format_row() {
        let row = format_row(&sample(r#"Connection lost. Error: host ""x"""#));
        let (timestamp, rest) = row.split_once(',').unwrap();

        let parsed = chrono::DateTime::parse_from_rfc3339(timestamp).unwrap();
        assert_eq!(parsed, sample("").timestamp);
        assert_eq!(rest, "DOWN,-1,1m5s,0s,4,\"Connection lost. Error: host \"\"x\"\"\"\n");
    }

    #[tokio::test]
    async fn test_ensure_initialized_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let appender = LogAppender::new(dir.path().join("log.csv"));

        assert!(appender.ensure_initialized().await.unwrap());
        appender.append(&sample("first")).await.unwrap();
        assert!(!appender.ensure_initialized().await.unwrap());

        let content = std::fs::read_to_string(appender.path()).unwrap();
        assert!(content.starts_with(HEADER));
        assert_eq!(content.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_existing_file_is_not_touched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, "not,a,header\n").unwrap();

        let appender = LogAppender::new(&path);
        assert!(!appender.ensure_initialized().await.unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not,a,header\n");
    }

    /// Writer whose every write fails.
    struct BrokenWriter;

    impl AsyncWrite for BrokenWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Err(std::io::Error::other("disk full")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_failed_header_write_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, "").unwrap();

        let result = write_header_or_remove(&path, &mut BrokenWriter).await;
        assert!(matches!(result, Err(StoreError::Io(_))));
        assert!(!path.exists());

        let appender = LogAppender::new(&path);
        assert!(appender.ensure_initialized().await.unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), HEADER);
    }

    #[tokio::test]
    async fn test_append_without_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let appender = LogAppender::new(dir.path().join("missing").join("log.csv"));
        assert!(matches!(
            appender.append(&sample("x")).await,
            Err(StoreError::Io(_))
        ));
    }
}
