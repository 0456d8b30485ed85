use std::{
    fs,
    path::PathBuf,
    sync::RwLock,
};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::{error, warn};
use uuid::Uuid;

use crate::models::{DetectionDraft, DetectionRecord};

use super::stats::{self, HistoryStats};

/// Ceiling on the serialized collection, mirroring the storage quota of the
/// environments this history format originated in. Exceeding it triggers
/// the same fallback as a write failure.
const MAX_STORE_BYTES: usize = 5 * 1024 * 1024;

/// Durable, newest-first collection of detection records.
///
/// The single authoritative copy is one JSON file; an in-memory mirror
/// serves the active session. An add always lands in memory first, so the
/// UI never loses a just-created record even when persistence fails.
pub struct HistoryStore {
    path: PathBuf,
    records: RwLock<Vec<DetectionRecord>>,
}

impl HistoryStore {
    /// Open the store at `path`. A missing file starts empty; an unreadable
    /// or unparsable one is logged and also starts empty. Corruption is
    /// never fatal.
    pub fn open(path: PathBuf) -> Self {
        let records = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(records) => records,
                    Err(err) => {
                        warn!(
                            "detection history at {} failed to parse ({err}); starting empty",
                            path.display()
                        );
                        Vec::new()
                    }
                },
                Err(err) => {
                    warn!(
                        "detection history at {} could not be read ({err}); starting empty",
                        path.display()
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Self {
            path,
            records: RwLock::new(records),
        }
    }

    /// Create a record from `draft`, prepend it, and persist the full
    /// collection. Persistence failures degrade (retry once with photos
    /// stripped store-wide, then give up with a log line); they are never
    /// surfaced to the caller.
    pub fn add_detection(&self, draft: DetectionDraft) -> DetectionRecord {
        let record = DetectionRecord {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            species: draft.species,
            breed: draft.breed,
            age: draft.age,
            symptoms: draft.symptoms,
            photo: draft.photo,
            results: draft.results,
        };

        let mut records = self.records.write().unwrap();
        records.insert(0, record.clone());
        self.persist_with_fallback(&records);
        record
    }

    pub fn records(&self) -> Vec<DetectionRecord> {
        self.records.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Derive aggregate stats over the current collection.
    pub fn stats(&self) -> HistoryStats {
        stats::derive(&self.records.read().unwrap())
    }

    /// Drop every record, in memory and on disk.
    pub fn clear(&self) {
        let mut records = self.records.write().unwrap();
        records.clear();
        if let Err(err) = self.persist(&records) {
            error!("failed to persist cleared detection history: {err:#}");
        }
    }

    fn persist_with_fallback(&self, records: &[DetectionRecord]) {
        if let Err(err) = self.persist(records) {
            warn!("failed to persist detection history ({err:#}); retrying without photos");
            let stripped: Vec<DetectionRecord> =
                records.iter().map(DetectionRecord::without_photo).collect();
            if let Err(err) = self.persist(&stripped) {
                error!("failed to persist detection history even without photos: {err:#}");
            }
        }
    }

    fn persist(&self, records: &[DetectionRecord]) -> Result<()> {
        let serialized =
            serde_json::to_string(records).context("failed to serialize detection history")?;
        if serialized.len() > MAX_STORE_BYTES {
            bail!(
                "serialized history is {} bytes, over the {} byte store quota",
                serialized.len(),
                MAX_STORE_BYTES
            );
        }
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write history to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PhotoPayload, SymptomCheckResult};
    use tempfile::TempDir;

    fn draft(species: &str, photo: Option<PhotoPayload>) -> DetectionDraft {
        DetectionDraft {
            species: species.to_string(),
            breed: "mixed".to_string(),
            age: 2,
            symptoms: vec!["coughing".to_string(), "lethargy".to_string()],
            photo,
            results: SymptomCheckResult {
                potential_diseases: Vec::new(),
                matched_symptoms: vec!["coughing".to_string()],
            },
        }
    }

    fn photo_of_size(bytes: usize) -> PhotoPayload {
        PhotoPayload::from_jpeg(&vec![0xAB; bytes], 640, 480)
    }

    #[test]
    fn add_prepends_and_assigns_unique_ids() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::open(dir.path().join("history.json"));

        let first = store.add_detection(draft("dog", None));
        let second = store.add_detection(draft("cat", None));

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, second.id);
        assert_eq!(records[1].id, first.id);
        assert_ne!(first.id, second.id);
        assert_eq!(store.stats().total_detections, 2);
    }

    #[test]
    fn records_survive_a_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");

        {
            let store = HistoryStore::open(path.clone());
            store.add_detection(draft("horse", None));
        }

        let reopened = HistoryStore::open(path);
        let records = reopened.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].species, "horse");
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::open(dir.path().join("nope.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_file_starts_empty_instead_of_failing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{this is not json").unwrap();

        let store = HistoryStore::open(path.clone());
        assert!(store.is_empty());

        // The store still works after recovery.
        store.add_detection(draft("goat", None));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn quota_overflow_strips_photos_on_disk_but_not_in_memory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        let store = HistoryStore::open(path.clone());

        // Two ~4 MiB photos push the serialized blob past the 5 MiB quota.
        store.add_detection(draft("dog", Some(photo_of_size(4 * 1024 * 1024))));
        let record = store.add_detection(draft("cat", Some(photo_of_size(4 * 1024 * 1024))));

        // The just-created record keeps its photo for the session.
        assert!(record.photo.is_some());
        let in_memory = store.records();
        assert!(in_memory.iter().all(|r| r.photo.is_some()));

        // The persisted copy fell back to the photo-free form of every record.
        let persisted: Vec<DetectionRecord> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(persisted.len(), 2);
        assert!(persisted.iter().all(|r| r.photo.is_none()));
    }

    #[test]
    fn unwritable_path_still_updates_memory() {
        let dir = TempDir::new().unwrap();
        // The store path is a directory, so every write attempt fails.
        let store = HistoryStore::open(dir.path().to_path_buf());

        let record = store.add_detection(draft("sheep", Some(photo_of_size(128))));
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].id, record.id);
        assert!(store.records()[0].photo.is_some());
    }

    #[test]
    fn clear_wipes_memory_and_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        let store = HistoryStore::open(path.clone());

        store.add_detection(draft("dog", None));
        store.clear();

        assert!(store.is_empty());
        let persisted: Vec<DetectionRecord> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(persisted.is_empty());
    }
}
