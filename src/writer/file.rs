use super::{LogWriter, WriterError};
use crate::domain::{LogEntry, ResourceDescriptor};
use crate::sink::SinkMetrics;
use async_trait::async_trait;
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024; // 10 MB

/// Appends entries as JSON lines to a local audit log; an external agent
/// ships the file. Rotation renames the file aside with a timestamp suffix
/// once it exceeds the size cap.
pub struct FileWriter {
    path: PathBuf,
    file: Mutex<File>,
    metrics: SinkMetrics,
}

impl FileWriter {
    pub async fn open(path: &Path, metrics: SinkMetrics) -> Result<Self, WriterError> {
        let path = path.to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }

        let file = open_append(&path)
            .await
            .map_err(|source| WriterError::AuditFile {
                path: path.display().to_string(),
                source,
            })?;

        Ok(Self {
            path,
            file: Mutex::new(file),
            metrics,
        })
    }

    async fn rotate_if_needed(&self, file: &mut File) -> std::io::Result<()> {
        let metadata = file.metadata().await?;
        if metadata.len() < MAX_FILE_SIZE_BYTES {
            return Ok(());
        }

        file.flush().await?;
        file.sync_data().await?;

        let suffix = Local::now().format("%Y%m%d_%H%M%S");
        let rotated = PathBuf::from(format!("{}.{suffix}", self.path.display()));
        tokio::fs::rename(&self.path, &rotated).await?;
        *file = open_append(&self.path).await?;
        Ok(())
    }
}

async fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
}

#[async_trait]
impl LogWriter for FileWriter {
    async fn write(
        &self,
        entries: &[LogEntry],
        _log_name: &str,
        _resource: &ResourceDescriptor,
    ) -> usize {
        let mut file = self.file.lock().await;

        if let Err(e) = self.rotate_if_needed(&mut file).await {
            warn!("Audit log rotation failed: {e}");
        }

        let mut written = 0;
        for entry in entries {
            let line = match serde_json::to_string(entry) {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to serialize entry: {e}");
                    continue;
                }
            };

            let result = async {
                file.write_all(line.as_bytes()).await?;
                file.write_all(b"\n").await?;
                file.flush().await
            }
            .await;

            match result {
                Ok(()) => written += 1,
                Err(e) => {
                    warn!("Failed to append to audit log: {e}");
                    break;
                }
            }
        }

        let status = if written == entries.len() { "ok" } else { "error" };
        self.metrics.observe_request(status);
        written
    }

    fn kind(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Outcome;
    use tempfile::TempDir;

    fn create_test_entry(reason: &str) -> LogEntry {
        LogEntry {
            json_payload: Some(format!("{{\"reason\":\"{reason}\"}}")),
            text_payload: None,
            outcome: Outcome::Success,
            timestamp: "2025-01-10T12:00:00.000000000Z".to_string(),
            reason: reason.to_string(),
            resource_id: "pod-1".to_string(),
            resource_type: "Pod".to_string(),
            source_component: "kubelet".to_string(),
        }
    }

    #[tokio::test]
    async fn appends_one_decodable_line_per_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.log");
        let writer = FileWriter::open(&path, SinkMetrics::unregistered())
            .await
            .unwrap();

        let entries = vec![
            create_test_entry("Created"),
            create_test_entry("Started"),
            create_test_entry("Pulled"),
        ];
        let resource = ResourceDescriptor::new("k8s_cluster");
        let accepted = writer.write(&entries, "events", &resource).await;
        assert_eq!(accepted, 3);
        assert_eq!(writer.metrics.request_count("ok"), 1);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        for (line, want) in lines.iter().zip(["Created", "Started", "Pulled"]) {
            let decoded: LogEntry = serde_json::from_str(line).unwrap();
            assert_eq!(decoded.reason, want);
        }
    }

    #[tokio::test]
    async fn successive_writes_accumulate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.log");
        let writer = FileWriter::open(&path, SinkMetrics::unregistered())
            .await
            .unwrap();

        let resource = ResourceDescriptor::new("k8s_cluster");
        writer
            .write(&[create_test_entry("First")], "events", &resource)
            .await;
        writer
            .write(&[create_test_entry("Second")], "events", &resource)
            .await;

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn creates_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/audit/events.log");
        let writer = FileWriter::open(&path, SinkMetrics::unregistered()).await;
        assert!(writer.is_ok());
        assert!(path.parent().unwrap().is_dir());
    }
}
