//! Append-only plain-text log store.
//!
//! Backends expose this file at `GET /logs`; the host tier reads the same
//! endpoint as its latency probe. Each event is one timestamped line.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Shared handle to the log file.
///
/// Appends and reads are serialized by one mutex, so a reader never sees a
/// partially written line and concurrent appends never interleave.
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    file: Mutex<File>,
}

impl Journal {
    /// Open (creating if needed) the log file for appending.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event as a single line.
    pub async fn append(&self, entry: &str) -> io::Result<()> {
        let line = format_line(&Local::now().format("%Y/%m/%d %H:%M:%S").to_string(), entry);
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }

    /// Append, reporting failures through tracing instead of the caller.
    pub async fn record(&self, entry: &str) {
        if let Err(e) = self.append(entry).await {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to append to log store");
        }
    }

    /// Read the whole file.
    pub async fn read_all(&self) -> io::Result<Vec<u8>> {
        let _guard = self.file.lock().await;
        tokio::fs::read(&self.path).await
    }
}

fn format_line(timestamp: &str, entry: &str) -> String {
    let mut line = String::with_capacity(timestamp.len() + entry.len() + 2);
    line.push_str(timestamp);
    line.push(' ');
    for c in entry.chars() {
        match c {
            '\n' => line.push_str("\\n"),
            '\r' => line.push_str("\\r"),
            c => line.push(c),
        }
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("tandem-journal-{}.log", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_line_escapes_newlines() {
        let line = format_line("2024/01/01 00:00:00", "blocked\r\n<html>\n</html>");
        assert_eq!(line, "2024/01/01 00:00:00 blocked\\r\\n<html>\\n</html>\n");
    }

    #[tokio::test]
    async fn test_append_and_read() {
        let path = temp_path();
        let journal = Journal::open(&path).await.unwrap();
        journal.append("first").await.unwrap();
        journal.append("second\nline").await.unwrap();

        let content = String::from_utf8(journal.read_all().await.unwrap()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" first"));
        assert!(lines[1].ends_with(" second\\nline"));

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_reopen_appends() {
        let path = temp_path();
        Journal::open(&path).await.unwrap().append("one").await.unwrap();
        Journal::open(&path).await.unwrap().append("two").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_concurrent_appends_do_not_interleave() {
        let path = temp_path();
        let journal = Arc::new(Journal::open(&path).await.unwrap());

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let journal = journal.clone();
                tokio::spawn(async move {
                    let entry = format!("task-{i}-{}", "x".repeat(4096));
                    journal.append(&entry).await.unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let content = String::from_utf8(journal.read_all().await.unwrap()).unwrap();
        assert_eq!(content.lines().count(), 16);
        assert!(content.lines().all(|l| l.ends_with(&"x".repeat(4096))));

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_open_fails_for_missing_directory() {
        let path = std::env::temp_dir()
            .join(format!("tandem-missing-{}", uuid::Uuid::new_v4()))
            .join("proxy.log");
        assert!(Journal::open(path).await.is_err());
    }
}
