//! B-Tree implementation for the patient record index
//!
//! This module provides a classic B-Tree (CLRS-style) over unique-keyed
//! records. It supports:
//! - Logarithmic search, insert and delete
//! - Preemptive top-down splitting (a full node is split before descent)
//! - Delete rebalancing via predecessor/successor promotion, sibling
//!   borrowing and merging
//! - Full in-order traversal and per-level introspection for display
//!
//! The tree is in-memory; persistence is handled by the snapshot layer,
//! which re-inserts records through the normal insert path on load.

mod error;
mod node;

pub use error::{BTreeError, BTreeResult};
pub use node::{Node, NodeId};

/// Key type for tree records
pub type RecordKey = u64;

/// Fixes the ordering contract for tree records: records are compared and
/// deduplicated by this key alone, whatever the rest of the payload holds.
pub trait Keyed {
    fn key(&self) -> RecordKey;
}

/// Default node capacity: five records per node keeps the structure
/// visible at demonstration scale while still exercising every
/// split/merge path.
pub const DEFAULT_MAX_KEYS: usize = 5;

/// B-Tree data structure
///
/// Capacity `max_keys` means:
/// - Every node holds at most `max_keys` records
/// - Every non-root node holds at least `t - 1` records, where the
///   minimum degree `t = (max_keys + 1) / 2`
/// - All leaves sit at the same depth
#[derive(Debug)]
pub struct BTree<R> {
    /// Root node ID (always valid; an empty tree is a single empty leaf)
    root: NodeId,

    /// Maximum records per node
    max_keys: usize,

    /// Minimum degree `t`, computed once at construction
    min_degree: usize,

    /// Node storage
    nodes: Vec<Option<Node<R>>>,

    /// Free list for recycling nodes released by merges
    free_list: Vec<NodeId>,

    /// Total number of records in the tree
    record_count: usize,
}

impl<R: Keyed + Clone> BTree<R> {
    /// Create a new empty B-Tree with the given node capacity
    ///
    /// # Arguments
    /// * `max_keys` - Maximum records per node (must be >= 3, odd preferred)
    pub fn new(max_keys: usize) -> BTreeResult<Self> {
        if max_keys < 3 {
            return Err(BTreeError::InvalidCapacity(max_keys));
        }

        let mut tree = Self {
            root: 0,
            max_keys,
            min_degree: (max_keys + 1) / 2,
            nodes: Vec::new(),
            free_list: Vec::new(),
            record_count: 0,
        };
        tree.root = tree.allocate_node(Node::new_leaf());
        Ok(tree)
    }

    /// Get the node capacity
    pub fn max_keys(&self) -> usize {
        self.max_keys
    }

    /// Get the minimum degree `t`
    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Get the number of records in the tree
    pub fn len(&self) -> usize {
        self.record_count
    }

    /// Check if the tree holds no records
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Tree height: number of levels from root to leaf (1 for a lone
    /// leaf root, uniform across leaves by invariant)
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.root;

        while let Some(node) = self.node(current) {
            if node.leaf {
                break;
            }
            match node.children.first() {
                Some(&child) => {
                    current = child;
                    height += 1;
                }
                None => break,
            }
        }

        height
    }

    // ========== Node Management ==========

    /// Allocate a new node, returning its ID
    fn allocate_node(&mut self, node: Node<R>) -> NodeId {
        if let Some(id) = self.free_list.pop() {
            self.nodes[id] = Some(node);
            id
        } else {
            let id = self.nodes.len();
            self.nodes.push(Some(node));
            id
        }
    }

    /// Get a reference to a node by ID (public for the display layer)
    pub fn node(&self, id: NodeId) -> Option<&Node<R>> {
        self.nodes.get(id).and_then(|n| n.as_ref())
    }

    /// Get a mutable reference to a node by ID
    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<R>> {
        self.nodes.get_mut(id).and_then(|n| n.as_mut())
    }

    /// Take a node out of its slot for restructuring; the caller must
    /// either put it back or free the slot
    fn take_node(&mut self, id: NodeId) -> BTreeResult<Node<R>> {
        self.nodes
            .get_mut(id)
            .and_then(Option::take)
            .ok_or(BTreeError::NodeNotFound(id))
    }

    /// Free a node, adding its slot to the free list
    fn free_node(&mut self, id: NodeId) {
        if id < self.nodes.len() {
            self.nodes[id] = None;
            self.free_list.push(id);
        }
    }

    /// Get the root node ID
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Get the number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Look up the child ID at `idx` of the given node
    fn child_at(&self, node_id: NodeId, idx: usize) -> BTreeResult<NodeId> {
        self.node(node_id)
            .ok_or(BTreeError::NodeNotFound(node_id))?
            .children
            .get(idx)
            .copied()
            .ok_or_else(|| BTreeError::InvalidState(format!("missing child at slot {}", idx)))
    }

    // ========== Search Operations ==========

    /// Search for a record by key
    ///
    /// Descends from the root, at each node stepping into the child
    /// whose range covers the key. No side effects.
    pub fn search(&self, key: RecordKey) -> Option<&R> {
        let mut current = self.root;

        loop {
            let node = self.node(current)?;
            let (idx, exact) = node.locate(key);

            if exact {
                return node.keys.get(idx);
            }
            if node.leaf {
                return None;
            }
            current = *node.children.get(idx)?;
        }
    }

    // ========== Insert Operations ==========

    /// Insert a record into the tree
    ///
    /// Rejects with `DuplicateKey` (and no mutation) if a record with
    /// the same key is already present.
    pub fn insert(&mut self, record: R) -> BTreeResult<()> {
        if self.search(record.key()).is_some() {
            return Err(BTreeError::DuplicateKey(record.key()));
        }

        // A full root is split before anything is placed; this is the
        // only way the tree gains height.
        let root_full = self
            .node(self.root)
            .ok_or(BTreeError::NodeNotFound(self.root))?
            .is_full(self.max_keys);

        if root_full {
            let old_root = self.root;
            let new_root = self.allocate_node(Node::new_internal(old_root));
            self.split_child(new_root, 0)?;
            self.root = new_root;
        }

        self.insert_non_full(self.root, record)?;
        self.record_count += 1;
        Ok(())
    }

    /// Insert a record into a node that is known not to be full
    fn insert_non_full(&mut self, node_id: NodeId, record: R) -> BTreeResult<()> {
        let (leaf, mut idx) = {
            let node = self.node(node_id).ok_or(BTreeError::NodeNotFound(node_id))?;
            let mut i = node.keys.len();
            while i > 0 && record.key() < node.keys[i - 1].key() {
                i -= 1;
            }
            (node.leaf, i)
        };

        if leaf {
            let node = self
                .node_mut(node_id)
                .ok_or(BTreeError::NodeNotFound(node_id))?;
            node.keys.insert(idx, record);
            return Ok(());
        }

        // Split a full child before descending; if the record falls past
        // the promoted median, the target shifts one slot right.
        let child_id = self.child_at(node_id, idx)?;
        let child_full = self
            .node(child_id)
            .ok_or(BTreeError::NodeNotFound(child_id))?
            .is_full(self.max_keys);

        if child_full {
            self.split_child(node_id, idx)?;
            let node = self.node(node_id).ok_or(BTreeError::NodeNotFound(node_id))?;
            if record.key() > node.keys[idx].key() {
                idx += 1;
            }
        }

        let child_id = self.child_at(node_id, idx)?;
        self.insert_non_full(child_id, record)
    }

    /// Split the full child at `idx` of the given parent
    ///
    /// The median record is promoted into the parent at slot `idx`; a new
    /// sibling takes everything after the median and lands at `idx + 1`.
    fn split_child(&mut self, parent_id: NodeId, idx: usize) -> BTreeResult<()> {
        let child_id = self.child_at(parent_id, idx)?;
        let mut child = self.take_node(child_id)?;

        let mid = child.keys.len() / 2;
        let upper_keys = child.keys.split_off(mid + 1);
        let median = child
            .keys
            .pop()
            .ok_or_else(|| BTreeError::InvalidState("split of an empty node".to_string()))?;

        let mut sibling = Node {
            keys: upper_keys,
            children: Vec::new(),
            leaf: child.leaf,
        };
        if !child.leaf {
            sibling.children = child.children.split_off(mid + 1);
        }

        self.nodes[child_id] = Some(child);
        let sibling_id = self.allocate_node(sibling);

        let parent = self
            .node_mut(parent_id)
            .ok_or(BTreeError::NodeNotFound(parent_id))?;
        parent.keys.insert(idx, median);
        parent.children.insert(idx + 1, sibling_id);

        Ok(())
    }

    // ========== Delete Operations ==========

    /// Delete the record with the given key
    ///
    /// Reports `KeyNotFound` (and no mutation) if the key is absent.
    pub fn delete(&mut self, key: RecordKey) -> BTreeResult<()> {
        if self.search(key).is_none() {
            return Err(BTreeError::KeyNotFound(key));
        }

        self.remove_from(self.root, key)?;
        self.record_count -= 1;

        // An empty internal root hands the tree over to its sole child;
        // this is the only way the tree loses height.
        let root_is_hollow = {
            let root = self.node(self.root).ok_or(BTreeError::NodeNotFound(self.root))?;
            root.is_empty() && !root.leaf
        };
        if root_is_hollow {
            let old_root = self.root;
            self.root = self.child_at(old_root, 0)?;
            self.free_node(old_root);
        }

        Ok(())
    }

    /// Recursive delete step: every node entered (other than the root)
    /// is guaranteed by the caller to hold at least `t` records
    fn remove_from(&mut self, node_id: NodeId, key: RecordKey) -> BTreeResult<()> {
        let (mut idx, exact, leaf) = {
            let node = self.node(node_id).ok_or(BTreeError::NodeNotFound(node_id))?;
            let (idx, exact) = node.locate(key);
            (idx, exact, node.leaf)
        };

        if exact {
            if leaf {
                let node = self
                    .node_mut(node_id)
                    .ok_or(BTreeError::NodeNotFound(node_id))?;
                node.keys.remove(idx);
                return Ok(());
            }
            return self.remove_from_internal(node_id, idx, key);
        }

        if leaf {
            // Guarded by the pre-delete search; kept for internal callers.
            return Err(BTreeError::KeyNotFound(key));
        }

        // Top up a deficient child before descending so that removal
        // never leaves it below the minimum.
        let child_id = self.child_at(node_id, idx)?;
        let deficient = self
            .node(child_id)
            .ok_or(BTreeError::NodeNotFound(child_id))?
            .len()
            < self.min_degree;

        if deficient {
            self.fill_child(node_id, idx)?;
            // A leftward merge of the last child shifts the target down
            // one slot.
            let key_count = self.node(node_id).ok_or(BTreeError::NodeNotFound(node_id))?.len();
            if idx > key_count {
                idx -= 1;
            }
        }

        let child_id = self.child_at(node_id, idx)?;
        self.remove_from(child_id, key)
    }

    /// Delete a key found at slot `idx` of an internal node
    fn remove_from_internal(
        &mut self,
        node_id: NodeId,
        idx: usize,
        key: RecordKey,
    ) -> BTreeResult<()> {
        let left_id = self.child_at(node_id, idx)?;
        let right_id = self.child_at(node_id, idx + 1)?;
        let t = self.min_degree;

        let left_len = self.node(left_id).ok_or(BTreeError::NodeNotFound(left_id))?.len();
        if left_len >= t {
            // Promote the predecessor (max of the left subtree) into the
            // vacated slot, then delete it from where it came from.
            let predecessor = self.subtree_max(left_id)?;
            let pred_key = predecessor.key();
            let node = self
                .node_mut(node_id)
                .ok_or(BTreeError::NodeNotFound(node_id))?;
            node.keys[idx] = predecessor;
            return self.remove_from(left_id, pred_key);
        }

        let right_len = self.node(right_id).ok_or(BTreeError::NodeNotFound(right_id))?.len();
        if right_len >= t {
            // Symmetric: promote the successor (min of the right subtree).
            let successor = self.subtree_min(right_id)?;
            let succ_key = successor.key();
            let node = self
                .node_mut(node_id)
                .ok_or(BTreeError::NodeNotFound(node_id))?;
            node.keys[idx] = successor;
            return self.remove_from(right_id, succ_key);
        }

        // Both neighbors are minimal: fold child, separator and sibling
        // into one node, then continue the delete inside it.
        self.merge_children(node_id, idx)?;
        self.remove_from(left_id, key)
    }

    /// Maximum record of the subtree rooted at `node_id`
    fn subtree_max(&self, node_id: NodeId) -> BTreeResult<R> {
        let mut current = node_id;
        loop {
            let node = self.node(current).ok_or(BTreeError::NodeNotFound(current))?;
            if node.leaf {
                return node.keys.last().cloned().ok_or_else(|| {
                    BTreeError::InvalidState("empty leaf in predecessor scan".to_string())
                });
            }
            current = *node.children.last().ok_or_else(|| {
                BTreeError::InvalidState("internal node without children".to_string())
            })?;
        }
    }

    /// Minimum record of the subtree rooted at `node_id`
    fn subtree_min(&self, node_id: NodeId) -> BTreeResult<R> {
        let mut current = node_id;
        loop {
            let node = self.node(current).ok_or(BTreeError::NodeNotFound(current))?;
            if node.leaf {
                return node.keys.first().cloned().ok_or_else(|| {
                    BTreeError::InvalidState("empty leaf in successor scan".to_string())
                });
            }
            current = *node.children.first().ok_or_else(|| {
                BTreeError::InvalidState("internal node without children".to_string())
            })?;
        }
    }

    /// Bring the child at `idx` up to at least `t` records, by borrowing
    /// from a sibling with records to spare or by merging
    fn fill_child(&mut self, parent_id: NodeId, idx: usize) -> BTreeResult<()> {
        let t = self.min_degree;
        let (child_count, key_count) = {
            let parent = self
                .node(parent_id)
                .ok_or(BTreeError::NodeNotFound(parent_id))?;
            (parent.children.len(), parent.keys.len())
        };

        if idx > 0 {
            let left_id = self.child_at(parent_id, idx - 1)?;
            if self.node(left_id).ok_or(BTreeError::NodeNotFound(left_id))?.len() >= t {
                return self.borrow_from_prev(parent_id, idx);
            }
        }

        if idx + 1 < child_count {
            let right_id = self.child_at(parent_id, idx + 1)?;
            if self.node(right_id).ok_or(BTreeError::NodeNotFound(right_id))?.len() >= t {
                return self.borrow_from_next(parent_id, idx);
            }
        }

        if idx < key_count {
            self.merge_children(parent_id, idx)
        } else {
            self.merge_children(parent_id, idx - 1)
        }
    }

    /// Rotate the left sibling's last record up through the parent into
    /// the front of the child at `idx`
    fn borrow_from_prev(&mut self, parent_id: NodeId, idx: usize) -> BTreeResult<()> {
        let sibling_id = self.child_at(parent_id, idx - 1)?;
        let child_id = self.child_at(parent_id, idx)?;

        let mut sibling = self.take_node(sibling_id)?;
        let moved_key = sibling.keys.pop().ok_or_else(|| {
            BTreeError::InvalidState("borrow from an empty sibling".to_string())
        })?;
        let moved_child = if sibling.leaf {
            None
        } else {
            sibling.children.pop()
        };
        self.nodes[sibling_id] = Some(sibling);

        let parent = self
            .node_mut(parent_id)
            .ok_or(BTreeError::NodeNotFound(parent_id))?;
        let separator = std::mem::replace(&mut parent.keys[idx - 1], moved_key);

        let child = self
            .node_mut(child_id)
            .ok_or(BTreeError::NodeNotFound(child_id))?;
        child.keys.insert(0, separator);
        if let Some(grandchild) = moved_child {
            child.children.insert(0, grandchild);
        }

        Ok(())
    }

    /// Rotate the right sibling's first record up through the parent onto
    /// the back of the child at `idx`
    fn borrow_from_next(&mut self, parent_id: NodeId, idx: usize) -> BTreeResult<()> {
        let sibling_id = self.child_at(parent_id, idx + 1)?;
        let child_id = self.child_at(parent_id, idx)?;

        let mut sibling = self.take_node(sibling_id)?;
        if sibling.keys.is_empty() {
            self.nodes[sibling_id] = Some(sibling);
            return Err(BTreeError::InvalidState(
                "borrow from an empty sibling".to_string(),
            ));
        }
        let moved_key = sibling.keys.remove(0);
        let moved_child = if sibling.leaf || sibling.children.is_empty() {
            None
        } else {
            Some(sibling.children.remove(0))
        };
        self.nodes[sibling_id] = Some(sibling);

        let parent = self
            .node_mut(parent_id)
            .ok_or(BTreeError::NodeNotFound(parent_id))?;
        let separator = std::mem::replace(&mut parent.keys[idx], moved_key);

        let child = self
            .node_mut(child_id)
            .ok_or(BTreeError::NodeNotFound(child_id))?;
        child.keys.push(separator);
        if let Some(grandchild) = moved_child {
            child.children.push(grandchild);
        }

        Ok(())
    }

    /// Merge the child at `idx`, its separator record, and the sibling at
    /// `idx + 1` into a single node at slot `idx`
    fn merge_children(&mut self, parent_id: NodeId, idx: usize) -> BTreeResult<()> {
        let (child_id, sibling_id, separator) = {
            let parent = self
                .node_mut(parent_id)
                .ok_or(BTreeError::NodeNotFound(parent_id))?;
            if idx >= parent.keys.len() || idx + 1 >= parent.children.len() {
                return Err(BTreeError::InvalidState(format!(
                    "merge out of range at slot {}",
                    idx
                )));
            }
            let child_id = parent.children[idx];
            let sibling_id = parent.children.remove(idx + 1);
            let separator = parent.keys.remove(idx);
            (child_id, sibling_id, separator)
        };

        let mut sibling = self.take_node(sibling_id)?;
        let child = self
            .node_mut(child_id)
            .ok_or(BTreeError::NodeNotFound(child_id))?;
        child.keys.push(separator);
        child.keys.append(&mut sibling.keys);
        child.children.append(&mut sibling.children);

        self.free_node(sibling_id);
        Ok(())
    }

    // ========== Traversal & Introspection ==========

    /// Collect all records in ascending key order
    pub fn in_order(&self) -> Vec<R> {
        let mut out = Vec::with_capacity(self.record_count);
        self.collect_in_order(self.root, &mut out);
        out
    }

    fn collect_in_order(&self, node_id: NodeId, out: &mut Vec<R>) {
        let Some(node) = self.node(node_id) else {
            return;
        };

        for (i, record) in node.keys.iter().enumerate() {
            if !node.leaf {
                if let Some(&child) = node.children.get(i) {
                    self.collect_in_order(child, out);
                }
            }
            out.push(record.clone());
        }

        if !node.leaf {
            if let Some(&last) = node.children.last() {
                self.collect_in_order(last, out);
            }
        }
    }

    /// Node IDs grouped by depth, root first (read-only structural view)
    pub fn levels(&self) -> Vec<Vec<NodeId>> {
        let mut rows = Vec::new();
        let mut current = vec![self.root];

        while !current.is_empty() {
            let mut next = Vec::new();
            for &id in &current {
                if let Some(node) = self.node(id) {
                    next.extend_from_slice(&node.children);
                }
            }
            rows.push(current);
            current = next;
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Rec(RecordKey);

    impl Keyed for Rec {
        fn key(&self) -> RecordKey {
            self.0
        }
    }

    fn tree_with(max_keys: usize, keys: &[RecordKey]) -> BTree<Rec> {
        let mut tree = BTree::new(max_keys).unwrap();
        for &k in keys {
            tree.insert(Rec(k)).unwrap();
        }
        tree
    }

    fn keys_of(tree: &BTree<Rec>) -> Vec<RecordKey> {
        tree.in_order().iter().map(|r| r.key()).collect()
    }

    /// Assert every structural invariant: sortedness, capacity bounds,
    /// child counts, uniform leaf depth, consistent record count.
    fn check_invariants(tree: &BTree<Rec>) {
        let keys = keys_of(tree);
        assert!(
            keys.windows(2).all(|w| w[0] < w[1]),
            "in-order sequence must be strictly ascending: {:?}",
            keys
        );
        assert_eq!(keys.len(), tree.len());

        let mut leaf_depths = Vec::new();
        check_node(tree, tree.root_id(), 1, true, &mut leaf_depths);
        assert!(
            leaf_depths.windows(2).all(|w| w[0] == w[1]),
            "leaves must share one depth: {:?}",
            leaf_depths
        );
    }

    fn check_node(
        tree: &BTree<Rec>,
        id: NodeId,
        depth: usize,
        is_root: bool,
        leaf_depths: &mut Vec<usize>,
    ) {
        let node = tree.node(id).expect("live node");
        assert!(node.len() <= tree.max_keys());
        if !is_root {
            assert!(
                node.len() >= tree.min_degree() - 1,
                "non-root node below minimum: {} < {}",
                node.len(),
                tree.min_degree() - 1
            );
        }

        if node.leaf {
            assert!(node.children.is_empty());
            leaf_depths.push(depth);
        } else {
            assert_eq!(node.children.len(), node.len() + 1);
            for &child in &node.children {
                check_node(tree, child, depth + 1, false, leaf_depths);
            }
        }
    }

    #[test]
    fn test_invalid_capacity_rejected() {
        assert!(matches!(
            BTree::<Rec>::new(2),
            Err(BTreeError::InvalidCapacity(2))
        ));
        assert!(BTree::<Rec>::new(3).is_ok());
    }

    #[test]
    fn test_insert_and_search() {
        let tree = tree_with(5, &[8, 3, 12, 1, 6]);

        assert_eq!(tree.search(6), Some(&Rec(6)));
        assert_eq!(tree.search(12), Some(&Rec(12)));
        assert_eq!(tree.search(7), None);
        assert_eq!(tree.len(), 5);
        check_invariants(&tree);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut tree = tree_with(5, &[5]);

        let err = tree.insert(Rec(5)).unwrap_err();
        assert!(matches!(err, BTreeError::DuplicateKey(5)));
        // Count grew by exactly one across both attempts.
        assert_eq!(tree.len(), 1);
        check_invariants(&tree);
    }

    #[test]
    fn test_root_splits_on_sixth_insert() {
        let mut tree = BTree::new(5).unwrap();
        for k in 1..=5 {
            tree.insert(Rec(k)).unwrap();
        }
        assert_eq!(tree.height(), 1);

        tree.insert(Rec(6)).unwrap();
        assert_eq!(tree.height(), 2);

        for k in 7..=11 {
            tree.insert(Rec(k)).unwrap();
        }
        assert_eq!(tree.height(), 2);
        assert_eq!(keys_of(&tree), (1..=11).collect::<Vec<_>>());
        check_invariants(&tree);
    }

    #[test]
    fn test_delete_from_small_tree() {
        let mut tree = tree_with(3, &[10, 20, 5, 6, 12, 30, 7, 17]);

        tree.delete(6).unwrap();

        assert_eq!(tree.search(6), None);
        for k in [10, 20, 5, 12, 30, 7, 17] {
            assert!(tree.search(k).is_some(), "key {} lost", k);
        }
        check_invariants(&tree);
    }

    #[test]
    fn test_delete_last_record_leaves_empty_leaf_root() {
        let mut tree = tree_with(5, &[1]);

        tree.delete(1).unwrap();

        assert_eq!(tree.len(), 0);
        let root = tree.node(tree.root_id()).unwrap();
        assert!(root.leaf);
        assert!(root.is_empty());
        check_invariants(&tree);
    }

    #[test]
    fn test_delete_not_found_leaves_tree_untouched() {
        let mut tree = tree_with(5, &[1, 2, 3]);

        let err = tree.delete(9).unwrap_err();
        assert!(matches!(err, BTreeError::KeyNotFound(9)));
        assert_eq!(keys_of(&tree), vec![1, 2, 3]);
    }

    #[test]
    fn test_insert_delete_inverse() {
        let mut tree = tree_with(3, &[10, 20, 30, 40, 50]);
        let before = keys_of(&tree);

        tree.insert(Rec(25)).unwrap();
        tree.delete(25).unwrap();

        assert_eq!(keys_of(&tree), before);
        assert_eq!(tree.len(), before.len());
        check_invariants(&tree);
    }

    #[test]
    fn test_delete_internal_key_uses_predecessor_or_successor() {
        // With capacity 3 the root becomes internal quickly; deleting its
        // separators exercises the promotion paths.
        let mut tree = tree_with(3, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);

        let root_keys: Vec<RecordKey> = tree
            .node(tree.root_id())
            .unwrap()
            .keys
            .iter()
            .map(|r| r.key())
            .collect();
        assert!(!root_keys.is_empty());

        for k in root_keys {
            tree.delete(k).unwrap();
            assert_eq!(tree.search(k), None);
            check_invariants(&tree);
        }
    }

    #[test]
    fn test_root_collapse_shrinks_height() {
        let mut tree = tree_with(3, &(1..=8).collect::<Vec<_>>());
        assert!(tree.height() >= 2);

        for k in 1..=7 {
            tree.delete(k).unwrap();
            check_invariants(&tree);
        }

        assert_eq!(tree.height(), 1);
        assert_eq!(keys_of(&tree), vec![8]);
    }

    #[test]
    fn test_invariants_hold_across_capacities() {
        // Odd and even capacities, every key scrambled, structure checked
        // after each mutation.
        let keys: Vec<RecordKey> = (1..=400u64).map(|i| (i * 193) % 401).collect();

        for max_keys in 3..=7 {
            let mut tree = BTree::new(max_keys).unwrap();
            for &k in &keys {
                tree.insert(Rec(k)).unwrap();
                check_invariants(&tree);
            }
            for &k in &keys {
                tree.delete(k).unwrap();
                check_invariants(&tree);
            }
            assert!(tree.is_empty());
        }
    }

    #[test]
    fn test_scrambled_workload() {
        // Deterministic scramble: multiples of a generator mod a prime
        // visit every residue once.
        let keys: Vec<RecordKey> = (1..=200u64).map(|i| (i * 73) % 211).collect();
        let mut tree = BTree::new(5).unwrap();

        for &k in &keys {
            tree.insert(Rec(k)).unwrap();
        }
        assert_eq!(tree.len(), keys.len());
        check_invariants(&tree);

        // Remove every other key, checking structure as we go.
        for &k in keys.iter().step_by(2) {
            tree.delete(k).unwrap();
            check_invariants(&tree);
        }
        for (i, &k) in keys.iter().enumerate() {
            let found = tree.search(k).is_some();
            assert_eq!(found, i % 2 == 1, "key {} presence mismatch", k);
        }
    }

    #[test]
    fn test_descending_and_ascending_drains() {
        let mut tree = tree_with(3, &(1..=30).collect::<Vec<_>>());
        for k in (1..=30).rev() {
            tree.delete(k).unwrap();
            check_invariants(&tree);
        }
        assert!(tree.is_empty());

        let mut tree = tree_with(3, &(1..=30).collect::<Vec<_>>());
        for k in 1..=30 {
            tree.delete(k).unwrap();
            check_invariants(&tree);
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn test_levels_expose_tree_shape() {
        let tree = tree_with(5, &(1..=11).collect::<Vec<_>>());

        let levels = tree.levels();
        assert_eq!(levels.len(), tree.height());
        assert_eq!(levels[0], vec![tree.root_id()]);

        let total: usize = levels.iter().map(|row| row.len()).sum();
        assert_eq!(total, tree.node_count());
    }

    #[test]
    fn test_merge_recycles_nodes() {
        let mut tree = tree_with(3, &(1..=20).collect::<Vec<_>>());
        let before = tree.node_count();

        for k in 1..=19 {
            tree.delete(k).unwrap();
        }

        assert!(tree.node_count() < before);
        check_invariants(&tree);
    }
}
