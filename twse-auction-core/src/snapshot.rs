//! Persisted record set of the previous run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AuctionError, AuctionResult};
use crate::record::{NormalizedRecord, RecordSet};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    generated_at: DateTime<Utc>,
    records: Vec<NormalizedRecord>,
}

/// JSON snapshot file, read once at the start of a run and replaced at the end.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no snapshot exists yet.
    pub fn read(&self) -> AuctionResult<Option<RecordSet>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| AuctionError::SnapshotRead(format!("{}: {e}", self.path.display())))?;
        let file: SnapshotFile = serde_json::from_str(&content)
            .map_err(|e| AuctionError::SnapshotRead(format!("{}: {e}", self.path.display())))?;

        if file.version != SNAPSHOT_VERSION {
            return Err(AuctionError::SnapshotRead(format!(
                "{}: unsupported snapshot version {}",
                self.path.display(),
                file.version
            )));
        }

        Ok(Some(file.records.into_iter().collect()))
    }

    /// Like `read`, but an unreadable snapshot counts as absent.
    pub fn load(&self) -> Option<RecordSet> {
        match self.read() {
            Ok(Some(records)) => {
                info!(path = %self.path.display(), records = records.len(), "loaded snapshot");
                Some(records)
            }
            Ok(None) => {
                info!(path = %self.path.display(), "no snapshot yet, first run");
                None
            }
            Err(e) => {
                warn!("{e}; treating as first run");
                None
            }
        }
    }

    /// Replace the snapshot with `records`, via a temp file and rename.
    pub fn save(&self, records: &RecordSet, generated_at: DateTime<Utc>) -> AuctionResult<()> {
        let file = SnapshotFile {
            version: SNAPSHOT_VERSION,
            generated_at,
            records: records.records().cloned().collect(),
        };
        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| AuctionError::Serialization(e.to_string()))?;

        write_atomic(&self.path, content.as_bytes())
    }
}

/// Write a file by renaming a sibling temp file over it.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> AuctionResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = dir.join(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

    std::fs::write(&temp, bytes)?;
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(())
}
