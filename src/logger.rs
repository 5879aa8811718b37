//! Server transfer journal: one JSON line per finished or failed session.

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Completed,
    Failed,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionLogEntry {
    pub timestamp: String,
    pub peer: String,
    pub command: Option<String>,
    pub path: Option<String>,
    pub status: SessionStatus,
    pub bytes: u64,
    pub error: Option<String>,
}

pub trait TransferLogger: Send + Sync {
    fn completed(&self, _peer: &str, _command: &str, _path: &Path, _bytes: u64) {}
    fn failed(&self, _peer: &str, _msg: &str) {}
}

pub struct NoopLogger;
impl TransferLogger for NoopLogger {}

pub struct JsonlLogger {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlLogger {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            file: Mutex::new(f),
        })
    }

    fn append(&self, entry: &SessionLogEntry) {
        if let Ok(mut f) = self.file.lock() {
            if let Ok(line) = serde_json::to_string(entry) {
                let _ = writeln!(f, "{}", line);
            }
        }
    }

    pub fn read_entries(&self) -> Result<Vec<SessionLogEntry>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line)?);
        }
        Ok(entries)
    }
}

impl TransferLogger for JsonlLogger {
    fn completed(&self, peer: &str, command: &str, path: &Path, bytes: u64) {
        self.append(&SessionLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            peer: peer.to_string(),
            command: Some(command.to_string()),
            path: Some(path.display().to_string()),
            status: SessionStatus::Completed,
            bytes,
            error: None,
        });
    }

    fn failed(&self, peer: &str, msg: &str) {
        self.append(&SessionLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            peer: peer.to_string(),
            command: None,
            path: None,
            status: SessionStatus::Failed,
            bytes: 0,
            error: Some(msg.to_string()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_jsonl_appends_one_line_per_session() {
        let temp_dir = TempDir::new().unwrap();
        let logger = JsonlLogger::new(temp_dir.path().join("logs/ft.jsonl")).unwrap();
        logger.completed("127.0.0.1:5000", "PUT", Path::new("/srv/root/a.bin"), 20_000);
        logger.failed("127.0.0.1:5001", "illegal path /etc/passwd");

        let entries = logger.read_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, SessionStatus::Completed);
        assert_eq!(entries[0].bytes, 20_000);
        assert_eq!(entries[0].command.as_deref(), Some("PUT"));
        assert_eq!(entries[1].status, SessionStatus::Failed);
        assert!(entries[1].error.as_deref().unwrap().contains("illegal path"));
    }
}
