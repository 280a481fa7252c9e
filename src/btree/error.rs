use thiserror::Error;

use super::RecordKey;
use super::node::NodeId;

/// Errors that can occur during B-tree operations
#[derive(Debug, Clone, Error)]
pub enum BTreeError {
    #[error("Duplicate key: {0}")]
    DuplicateKey(RecordKey),

    #[error("Key not found: {0}")]
    KeyNotFound(RecordKey),

    #[error("Invalid tree state: {0}")]
    InvalidState(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid capacity: {0} (must be >= 3)")]
    InvalidCapacity(usize),
}

pub type BTreeResult<T> = Result<T, BTreeError>;
