pub mod auth;
pub mod btree;
pub mod manager;
pub mod patient;
pub mod snapshot;

pub use auth::AuthManager;
pub use btree::{BTree, BTreeError, BTreeResult, Keyed, Node, NodeId, RecordKey, DEFAULT_MAX_KEYS};
pub use manager::{IdAllocator, ManagerError, ManagerResult, PatientManager};
pub use patient::{Gender, Patient, PatientDetails, PatientId};
pub use snapshot::{SnapshotError, SnapshotResult, SnapshotStore};
