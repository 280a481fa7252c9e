//! Patient record manager
//!
//! Composes the B-Tree index, the id allocator and the snapshot store
//! behind one API: add, find, remove, list, persist. On open the
//! snapshot is loaded and every record re-inserted through the normal
//! insert path, so balance invariants never depend on the on-disk form.

mod allocator;

pub use allocator::{IdAllocator, INITIAL_ID};

use std::path::Path;

use thiserror::Error;

use crate::btree::{BTree, BTreeError};
use crate::patient::{Patient, PatientDetails, PatientId};
use crate::snapshot::{SnapshotError, SnapshotStore};

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Patient ID {id} already exists (name: {name})")]
    DuplicateId { id: PatientId, name: String },

    #[error("Tree error: {0}")]
    Tree(#[from] BTreeError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

pub type ManagerResult<T> = Result<T, ManagerError>;

/// Owns the patient tree for the process lifetime
#[derive(Debug)]
pub struct PatientManager {
    tree: BTree<Patient>,
    ids: IdAllocator,
    store: SnapshotStore,
    /// Set when the in-memory state is ahead of the snapshot file
    dirty: bool,
}

impl PatientManager {
    /// Open a manager backed by the given snapshot file
    ///
    /// Loads any existing snapshot, rebuilds the tree record by record,
    /// and seeds the allocator one past the highest id observed. A
    /// malformed snapshot is a loud failure; the tree stays empty and
    /// the caller decides whether to proceed.
    pub fn open(path: impl AsRef<Path>, max_keys: usize) -> ManagerResult<Self> {
        let store = SnapshotStore::new(path.as_ref());
        let patients = store.load()?;

        let mut tree = BTree::new(max_keys)?;
        let mut max_id: Option<PatientId> = None;
        for patient in patients {
            max_id = Some(max_id.map_or(patient.id, |m| m.max(patient.id)));
            if let Err(err) = tree.insert(patient) {
                return Err(Self::insert_error(&tree, err));
            }
        }

        Ok(Self {
            tree,
            ids: IdAllocator::seeded_from(max_id),
            store,
            dirty: false,
        })
    }

    /// Register a new patient
    ///
    /// Allocates the id, inserts, and persists. A rejected insert rolls
    /// the allocator back so the id is not burned. A failed save keeps
    /// the record (memory stays authoritative) and leaves the manager
    /// dirty.
    pub fn add_patient(&mut self, details: PatientDetails) -> ManagerResult<Patient> {
        let id = self.ids.next();
        let patient = Patient::new(id, details);

        if let Err(err) = self.tree.insert(patient.clone()) {
            self.ids.rollback();
            return Err(Self::insert_error(&self.tree, err));
        }

        self.dirty = true;
        self.persist()?;
        Ok(patient)
    }

    /// Look up a patient by id
    pub fn find_patient(&self, id: PatientId) -> Option<&Patient> {
        self.tree.search(id)
    }

    /// Remove a patient by id, returning the removed record
    pub fn remove_patient(&mut self, id: PatientId) -> ManagerResult<Patient> {
        let removed = self
            .tree
            .search(id)
            .cloned()
            .ok_or(BTreeError::KeyNotFound(id))?;

        self.tree.delete(id)?;
        self.dirty = true;
        self.persist()?;
        Ok(removed)
    }

    /// All patients in ascending id order
    pub fn list_all(&self) -> Vec<Patient> {
        self.tree.in_order()
    }

    /// Write the full collection to the snapshot file
    pub fn persist(&mut self) -> ManagerResult<()> {
        self.store.save(&self.tree.in_order())?;
        self.dirty = false;
        Ok(())
    }

    /// Number of patients on file
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Check if no patients are registered
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// True when a mutation has not yet reached the snapshot file
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// The id the next registration will receive
    pub fn next_id(&self) -> PatientId {
        self.ids.peek()
    }

    /// Read-only view of the underlying tree, for structural display
    pub fn tree(&self) -> &BTree<Patient> {
        &self.tree
    }

    /// Name the record already holding an id when an insert is rejected
    fn insert_error(tree: &BTree<Patient>, err: BTreeError) -> ManagerError {
        match err {
            BTreeError::DuplicateKey(id) => {
                let name = tree
                    .search(id)
                    .map(|existing| existing.name.clone())
                    .unwrap_or_default();
                ManagerError::DuplicateId { id, name }
            }
            other => other.into(),
        }
    }
}
