//! Persisted booking table for promptweave.
//!
//! A flat JSON file mapping stringified ticket ids to booking records. The
//! whole table is read once at open and rewritten in full after every write,
//! under a single-process/single-writer assumption.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default file name, resolved against the working directory.
pub const BOOKING_STORE_FILE: &str = "flight_booking_details.json";

/// One persisted flight booking, keyed by ticket id.
///
/// Dates are stored pre-formatted (e.g. "March 10, 2026") — the formatted
/// strings are what the confirmation step renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub source: String,
    pub destination: String,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub ticket_id: u32,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("booking store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("booking store at {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Keyed booking table with an explicit open/get/upsert lifecycle.
#[derive(Debug)]
pub struct BookingStore {
    path: PathBuf,
    records: BTreeMap<String, BookingRecord>,
}

impl BookingStore {
    /// Open the store at `path`, reading the full table if the file exists
    /// and is non-empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match std::fs::metadata(&path) {
            Ok(meta) if meta.len() > 0 => {
                let content = std::fs::read_to_string(&path)?;
                serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                    path: path.clone(),
                    source,
                })?
            }
            _ => BTreeMap::new(),
        };

        debug!(path = %path.display(), records = records.len(), "Opened booking store");
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up the persisted record for a ticket id.
    pub fn get(&self, ticket_id: u32) -> Option<&BookingRecord> {
        self.records.get(&ticket_id.to_string())
    }

    /// Merge `record` onto any existing entry for its ticket id and rewrite
    /// the table. Present fields overwrite; an absent `return_date` retains
    /// the stored one. An unknown id creates a new entry.
    pub fn upsert(&mut self, record: BookingRecord) -> Result<(), StoreError> {
        let key = record.ticket_id.to_string();
        let merged = match self.records.get(&key) {
            Some(existing) => BookingRecord {
                return_date: record.return_date.or_else(|| existing.return_date.clone()),
                ..record
            },
            None => record,
        };
        self.records.insert(key, merged);
        self.flush()
    }

    fn flush(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.records).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(ticket_id: u32) -> BookingRecord {
        BookingRecord {
            source: "New York".to_string(),
            destination: "London".to_string(),
            departure_date: "March 10, 2026".to_string(),
            return_date: Some("March 25, 2026".to_string()),
            ticket_id,
        }
    }

    #[test]
    fn open_without_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = BookingStore::open(dir.path().join(BOOKING_STORE_FILE)).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn open_with_empty_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(BOOKING_STORE_FILE);
        std::fs::write(&path, "").unwrap();
        let store = BookingStore::open(&path).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn upsert_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(BOOKING_STORE_FILE);

        let mut store = BookingStore::open(&path).unwrap();
        store.upsert(record(12345)).unwrap();

        let reopened = BookingStore::open(&path).unwrap();
        assert_eq!(reopened.get(12345), Some(&record(12345)));
    }

    #[test]
    fn upsert_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut store = BookingStore::open(dir.path().join(BOOKING_STORE_FILE)).unwrap();

        store.upsert(record(12345)).unwrap();
        store.upsert(record(12345)).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(12345), Some(&record(12345)));
    }

    #[test]
    fn merge_replaces_only_changed_fields() {
        let dir = tempdir().unwrap();
        let mut store = BookingStore::open(dir.path().join(BOOKING_STORE_FILE)).unwrap();
        store.upsert(record(60569)).unwrap();

        // A modification that changes the departure date and carries no
        // return date must retain every other stored field.
        store
            .upsert(BookingRecord {
                departure_date: "March 18, 2026".to_string(),
                return_date: None,
                ..record(60569)
            })
            .unwrap();

        let merged = store.get(60569).unwrap();
        assert_eq!(merged.departure_date, "March 18, 2026");
        assert_eq!(merged.return_date, Some("March 25, 2026".to_string()));
        assert_eq!(merged.source, "New York");
        assert_eq!(merged.destination, "London");
    }

    #[test]
    fn unknown_id_creates_new_entry() {
        let dir = tempdir().unwrap();
        let mut store = BookingStore::open(dir.path().join(BOOKING_STORE_FILE)).unwrap();

        store.upsert(record(11111)).unwrap();
        store.upsert(record(22222)).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(BOOKING_STORE_FILE);
        std::fs::write(&path, "{not json").unwrap();

        let err = BookingStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
