use super::{Keyed, RecordKey};

/// Node identifier (index into the tree's node storage)
pub type NodeId = usize;

/// A single B-tree node: a sorted run of records plus, for internal
/// nodes, one child reference per key gap.
///
/// Invariants maintained by the tree:
/// - `keys` is strictly ascending by record key
/// - internal nodes have `children.len() == keys.len() + 1`
/// - leaf nodes have no children
#[derive(Debug, Clone)]
pub struct Node<R> {
    /// Records stored in this node, sorted by key
    pub keys: Vec<R>,
    /// Child node IDs (empty for leaves)
    pub children: Vec<NodeId>,
    /// Whether this node is a leaf
    pub leaf: bool,
}

impl<R: Keyed> Node<R> {
    /// Create a new empty leaf node
    pub fn new_leaf() -> Self {
        Self {
            keys: Vec::new(),
            children: Vec::new(),
            leaf: true,
        }
    }

    /// Create a new internal node with a single child
    pub fn new_internal(child: NodeId) -> Self {
        Self {
            keys: Vec::new(),
            children: vec![child],
            leaf: false,
        }
    }

    /// Number of records in this node
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if this node holds no records
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Split trigger: true once the node holds `max_keys` records.
    /// Checked before descending into a node, never after overflow.
    pub fn is_full(&self, max_keys: usize) -> bool {
        self.keys.len() >= max_keys
    }

    /// Locate `key` within this node.
    ///
    /// Returns `(i, true)` if `keys[i]` matches exactly, otherwise
    /// `(i, false)` where `i` is the child index whose subtree covers
    /// the key (also the insertion position within a leaf).
    pub fn locate(&self, key: RecordKey) -> (usize, bool) {
        for (i, record) in self.keys.iter().enumerate() {
            if record.key() == key {
                return (i, true);
            }
            if record.key() > key {
                return (i, false);
            }
        }
        (self.keys.len(), false)
    }
}
