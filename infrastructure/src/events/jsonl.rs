//! JSONL file writer for decision events.
//!
//! Each [`EventEnvelope`] is serialized as a single JSON line with a `type`
//! field and an RFC 3339 `timestamp`, appended to the file via a buffered
//! async writer.

use arbiter_application::ports::event_store::{EventStore, EventStoreError};
use arbiter_domain::EventEnvelope;
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

/// Append-only JSONL event store.
///
/// Writes go through a tokio `Mutex<BufWriter<File>>`, so concurrent appends
/// never interleave lines. Every line is flushed as it is written; the file
/// is never truncated, so runs accumulate.
pub struct JsonlEventStore {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlEventStore {
    /// Open the event file for appending.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EventStoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(File::from_std(file))),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the event file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: &EventEnvelope) -> Result<serde_json::Value, EventStoreError> {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        // Merge the envelope with type + timestamp
        let record = match serde_json::to_value(event)? {
            serde_json::Value::Object(mut map) => {
                map.insert(
                    "type".to_string(),
                    serde_json::Value::String(event.event.event_type().to_string()),
                );
                map.insert(
                    "timestamp".to_string(),
                    serde_json::Value::String(timestamp),
                );
                serde_json::Value::Object(map)
            }
            other => serde_json::json!({
                "type": event.event.event_type(),
                "timestamp": timestamp,
                "data": other,
            }),
        };
        Ok(record)
    }
}

#[async_trait]
impl EventStore for JsonlEventStore {
    async fn append(&self, event: &EventEnvelope) -> Result<(), EventStoreError> {
        let mut line = serde_json::to_string(&Self::record(event)?)?;
        line.push('\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}
