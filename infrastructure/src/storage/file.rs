//! File-backed decision log.
//!
//! Layout: `<dir>/<decision_id>.json`. Characters outside `[A-Za-z0-9.-]`
//! are hex-escaped in the file name so every id maps to exactly one file.
//! Inserts open with `create_new`, which makes the existence check and the
//! write a single atomic filesystem operation.

use arbiter_application::ports::decision_log::{DecisionLogStore, StoreError};
use arbiter_domain::{DecisionId, DecisionLogEntry};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

pub struct FileDecisionLog {
    dir: PathBuf,
}

impl FileDecisionLog {
    /// Open (and create if needed) a decision log directory
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, decision_id: &DecisionId) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(decision_id.as_str())))
    }
}

fn file_stem(id: &str) -> String {
    let mut stem = String::with_capacity(id.len());
    for byte in id.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' => stem.push(byte as char),
            _ => stem.push_str(&format!("_{:02x}", byte)),
        }
    }
    stem
}

#[async_trait]
impl DecisionLogStore for FileDecisionLog {
    async fn get(&self, decision_id: &DecisionId) -> Result<Option<DecisionLogEntry>, StoreError> {
        let path = self.entry_path(decision_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn put(&self, entry: &DecisionLogEntry) -> Result<(), StoreError> {
        let path = self.entry_path(&entry.decision_id);
        let payload = serde_json::to_vec_pretty(entry)?;

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(entry.decision_id.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let written = async {
            file.write_all(&payload).await?;
            file.write_all(b"\n").await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            // Do not leave a truncated entry behind to block the id
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                warn!(
                    "Could not remove partial decision file {}: {}",
                    path.display(),
                    cleanup
                );
            }
            return Err(e.into());
        }

        debug!("Wrote decision log entry {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixtures::entry;

    #[test]
    fn test_file_stem_escapes_separators() {
        assert_eq!(file_stem("abc-123.x"), "abc-123.x");
        assert_eq!(file_stem("a/b"), "a_2fb");
        assert_eq!(file_stem("a_b"), "a_5fb");
        assert_ne!(file_stem("a/b"), file_stem("a_2fb"));
    }

    #[tokio::test]
    async fn test_put_then_get_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileDecisionLog::open(dir.path().join("decisions")).await.unwrap();
        let stored = entry("d-1");

        log.put(&stored).await.unwrap();

        assert!(log.dir().join("d-1.json").exists());
        let loaded = log.get(&stored.decision_id).await.unwrap();
        assert_eq!(loaded, Some(stored));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileDecisionLog::open(dir.path()).await.unwrap();
        let id = DecisionId::new("absent").unwrap();
        assert!(log.get(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_existing_id_fails_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileDecisionLog::open(dir.path()).await.unwrap();
        log.put(&entry("d-1")).await.unwrap();

        let mut other = entry("d-1");
        other.raw_input = "overwrite attempt".to_string();
        let err = log.put(&other).await.unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists(_)));
        let kept = log.get(&other.decision_id).await.unwrap().unwrap();
        assert_eq!(kept.raw_input, "write a post");
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileDecisionLog::open(dir.path()).await.unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ not json").unwrap();

        let err = log
            .get(&DecisionId::new("bad").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
