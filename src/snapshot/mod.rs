//! Snapshot persistence for the patient collection
//!
//! The whole record set is written and read as one JSON document; the
//! on-disk form carries no tree shape. A missing file is not an error
//! (empty initial collection), but contents that fail to decode are
//! surfaced loudly rather than silently dropped.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::patient::Patient;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Whole-file store for the patient collection
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full patient collection
    ///
    /// A missing file yields an empty collection; undecodable contents
    /// yield `Malformed` and nothing is dropped.
    pub fn load(&self) -> SnapshotResult<Vec<Patient>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let patients = serde_json::from_str(&content)?;
        Ok(patients)
    }

    /// Write the full patient collection, replacing any previous snapshot
    pub fn save(&self, patients: &[Patient]) -> SnapshotResult<()> {
        let content = serde_json::to_string_pretty(patients)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::{Gender, PatientDetails};
    use tempfile::TempDir;

    fn patient(id: u64, name: &str) -> Patient {
        Patient::new(
            id,
            PatientDetails {
                name: name.to_string(),
                age: 30,
                gender: Gender::Male,
                phone: "0123456789".to_string(),
                visit_date: "2026-01-15".to_string(),
            },
        )
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("patients.json"));

        let loaded = store.load().unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("patients.json"));

        let patients = vec![patient(3, "Carol"), patient(1, "Alice"), patient(2, "Bob")];
        store.save(&patients).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, patients);
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("patients.json"));

        store.save(&[patient(1, "Alice"), patient(2, "Bob")]).unwrap();
        store.save(&[patient(1, "Alice")]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_malformed_snapshot_is_loud() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("patients.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SnapshotStore::new(&path);
        let err = store.load().unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed(_)));
    }
}
