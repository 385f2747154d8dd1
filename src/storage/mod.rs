//! Scan persistence.
//!
//! Each scan is stored as one pretty-printed JSON file, `<id>.json`, in the
//! data directory. Ids are allocated sequentially starting from one past the
//! largest id already on disk.

use crate::error::ScanError;
use crate::models::{NewScan, ScanRecord};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// JSON-file backed scan store.
#[derive(Debug)]
pub struct ScanStore {
    dir: PathBuf,
    /// Next id to hand out. Held across the write so ids map 1:1 to files.
    next_id: Mutex<u64>,
}

impl ScanStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, ScanError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;

        let mut max_id = 0;
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(id) = record_id(&entry.path()) {
                max_id = max_id.max(id);
            }
        }

        info!("Scan store at {} (next id {})", dir.display(), max_id + 1);

        Ok(Self {
            dir,
            next_id: Mutex::new(max_id + 1),
        })
    }

    /// Persist a finished scan and return it with its new id.
    pub async fn insert(&self, scan: NewScan) -> Result<ScanRecord, ScanError> {
        let mut next_id = self.next_id.lock().await;
        let record = ScanRecord::new(*next_id, scan);

        let json = serde_json::to_string_pretty(&record)?;
        let final_path = self.record_path(record.id);
        let temp_path = self.dir.join(format!("{}.json.tmp", record.id));

        fs::write(&temp_path, json.as_bytes()).await?;
        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                warn!("Failed to remove {}: {}", temp_path.display(), cleanup);
            }
            return Err(e.into());
        }

        *next_id += 1;
        debug!("Saved scan {} to {}", record.id, final_path.display());

        Ok(record)
    }

    /// All stored scans, most recent first.
    ///
    /// Files that cannot be read or decoded are skipped.
    pub async fn list(&self) -> Result<Vec<ScanRecord>, ScanError> {
        let mut records = Vec::new();

        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if record_id(&path).is_none() {
                continue;
            }

            match fs::read_to_string(&path).await {
                Ok(content) => match serde_json::from_str::<ScanRecord>(&content) {
                    Ok(record) => records.push(record),
                    Err(e) => warn!("Skipping corrupt scan file {}: {}", path.display(), e),
                },
                Err(e) => warn!("Skipping unreadable scan file {}: {}", path.display(), e),
            }
        }

        records.sort_by(|a, b| {
            b.started_at
                .cmp(&a.started_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(records)
    }

    /// Fetch one scan by id.
    pub async fn get(&self, id: u64) -> Result<ScanRecord, ScanError> {
        let content = match fs::read_to_string(self.record_path(id)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ScanError::NotFound(id)),
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&content)?)
    }

    fn record_path(&self, id: u64) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

/// Id encoded in a `<id>.json` file name, if the path is a scan file.
fn record_id(path: &Path) -> Option<u64> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}
