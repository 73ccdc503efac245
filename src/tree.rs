//! The radix tree: insert, longest-prefix find, remove and prune.
//!
//! Nodes live in an arena (`Vec<Option<Node>>`) addressed by [`NodeId`], with
//! released slots recycled through a free list. The root is always slot 0.
//!
//! Placement rules the algorithms maintain:
//! - An entry on an internal node sits at its exact depth (`depth == bits`).
//! - An entry on a leaf sits at or above its exact depth (`depth <= bits`).
//! - Every entry lies on the path spelled by its own key's leading bits.
//!
//! Together these make the deepest covering entry on a lookup path the
//! longest match.

use crate::error::{Error, Result};
use crate::key::{direction, Key};
use crate::node::{Entry, Node, NodeId, NodeRef};
use crate::tracing_helpers::{debug_log, trace_log};
use std::fmt::{self, Write as _};

/// A bit-indexed PATRICIA tree mapping `key/bits` prefixes to values.
///
/// ```rust
/// use bitradix::Radix32;
///
/// let mut t: Radix32<u32> = Radix32::new();
/// t.insert(0x0A00_0000, 8, 10).unwrap();
/// t.insert(0x0A14_0000, 14, 20).unwrap();
///
/// let hit = t.find(0x0A14_0102, 32).unwrap().unwrap();
/// assert_eq!(hit.value(), Some(&20));
/// assert_eq!(hit.bits(), 14);
/// ```
#[derive(Clone)]
pub struct Radix<K, V> {
    pub(crate) nodes: Vec<Option<Node<K, V>>>,
    /// Released slots, reused before the arena grows.
    pub(crate) free: Vec<NodeId>,
    len: usize,
}

/// Radix tree over 32-bit keys (IPv4 addresses).
pub type Radix32<V> = Radix<u32, V>;

/// Radix tree over 64-bit keys.
pub type Radix64<V> = Radix<u64, V>;

/// What to do at a leaf during insert.
enum LeafStep {
    Claim,
    Overwrite,
    Branch,
    PushDown,
}

impl<K: Key, V> Radix<K, V> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::new(None, None))],
            free: Vec::new(),
            len: 0,
        }
    }

    /// Number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of live nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn root(&self) -> NodeRef<'_, K, V> {
        NodeRef::new(self, NodeId::ROOT)
    }

    // === Arena ===

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        match self.nodes.get(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("bitradix: dangling node {id:?}"),
        }
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match self.nodes.get_mut(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("bitradix: dangling node {id:?}"),
        }
    }

    fn alloc(&mut self, parent: NodeId, entry: Option<Entry<K, V>>) -> NodeId {
        let node = Some(Node::new(Some(parent), entry));
        let id = if let Some(id) = self.free.pop() {
            self.nodes[id.index()] = node;
            id
        } else {
            self.nodes.push(node);
            NodeId::new(self.nodes.len() - 1)
        };
        trace_log!(?id, ?parent, "alloc node");
        id
    }

    /// Take a node out of the arena. Its slot is free for reuse at once.
    fn release(&mut self, id: NodeId) -> Node<K, V> {
        debug_assert_ne!(id, NodeId::ROOT, "the root is never released");
        let node = match self.nodes.get_mut(id.index()).and_then(Option::take) {
            Some(node) => node,
            None => panic!("bitradix: double release of {id:?}"),
        };
        self.free.push(id);
        trace_log!(?id, "release node");
        node
    }

    /// Create the child of `at` reached through `dir`.
    fn add_child(&mut self, at: NodeId, dir: usize, entry: Option<Entry<K, V>>) -> NodeId {
        debug_assert!(self.node(at).branch[dir].is_none());
        let child = self.alloc(at, entry);
        self.node_mut(at).branch[dir] = Some(child);
        child
    }

    fn check_bits(bits: u32) -> Result<()> {
        if bits == 0 || bits > K::BITS {
            return Err(Error::InvalidPrefixLength {
                bits,
                width: K::BITS,
            });
        }
        Ok(())
    }

    // === Insert ===

    /// Insert `value` under the prefix made of the top `bits` bits of `key`,
    /// overwriting the value of an identical prefix.
    ///
    /// Returns the node now holding the entry.
    pub fn insert(&mut self, key: K, bits: u32, value: V) -> Result<NodeRef<'_, K, V>> {
        Self::check_bits(bits)?;
        let id = self.insert_at(key.mask(bits), bits, value);
        Ok(NodeRef::new(self, id))
    }

    fn insert_at(&mut self, key: K, bits: u32, value: V) -> NodeId {
        let mut at = NodeId::ROOT;
        let mut depth = 0u32;

        loop {
            if depth > bits {
                panic!("bitradix: node put too far down (depth {depth}, bits {bits})");
            }

            let node = self.node(at);
            if node.is_leaf() {
                let step = match &node.entry {
                    None => LeafStep::Claim,
                    Some(e) if e.is_prefix(key, bits) => LeafStep::Overwrite,
                    Some(e) if e.bits == depth => LeafStep::Branch,
                    Some(_) => LeafStep::PushDown,
                };
                match step {
                    LeafStep::Claim => {
                        self.node_mut(at).entry = Some(Entry::new(key, bits, value));
                        self.len += 1;
                        return at;
                    }
                    LeafStep::Overwrite => {
                        if let Some(e) = self.node_mut(at).entry.as_mut() {
                            e.value = value;
                        }
                        return at;
                    }
                    LeafStep::Branch => {
                        // The resident entry belongs exactly here; since it
                        // differs from ours, `depth < bits` and we go on below.
                        at = self.add_child(at, direction(key, depth), None);
                        depth += 1;
                        continue;
                    }
                    LeafStep::PushDown => self.push_down(at, depth),
                }
            }

            if depth == bits {
                let node = self.node_mut(at);
                if let Some(e) = node.entry.as_ref().filter(|e| !e.is_prefix(key, bits)) {
                    panic!(
                        "bitradix: internal node at depth {depth} holds foreign prefix /{}",
                        e.bits
                    );
                }
                if node.entry.replace(Entry::new(key, bits, value)).is_none() {
                    self.len += 1;
                }
                return at;
            }

            let dir = direction(key, depth);
            let existing = self.node(at).branch[dir];
            at = match existing {
                Some(child) => child,
                None => self.add_child(at, dir, None),
            };
            depth += 1;
        }
    }

    /// Move the entry of leaf `at` one level down along its own next bit.
    fn push_down(&mut self, at: NodeId, depth: u32) {
        let Some(entry) = self.node_mut(at).entry.take() else {
            return;
        };
        debug_assert!(entry.bits > depth);
        debug_log!(bits = entry.bits, depth, "push entry down");
        let dir = direction(entry.key, depth);
        self.add_child(at, dir, Some(entry));
    }

    // === Find ===

    /// Longest-prefix match: the deepest entry covering the top `bits` bits of
    /// `key` whose own length does not exceed `bits`.
    ///
    /// An exact hit is recognisable by the returned node's `bits()` being
    /// equal to `bits`.
    pub fn find(&self, key: K, bits: u32) -> Result<Option<NodeRef<'_, K, V>>> {
        Self::check_bits(bits)?;
        Ok(self
            .longest_match(key, bits)
            .map(|id| NodeRef::new(self, id)))
    }

    fn longest_match(&self, key: K, bits: u32) -> Option<NodeId> {
        let mut best = None;
        let mut at = NodeId::ROOT;
        let mut depth = 0u32;

        loop {
            let node = self.node(at);
            if let Some(e) = &node.entry {
                if e.bits <= bits && e.covers(key) {
                    best = Some(at);
                }
            }
            // Entries below here are longer than the query.
            if depth >= bits {
                return best;
            }
            match node.branch[direction(key, depth)] {
                Some(child) => {
                    at = child;
                    depth += 1;
                }
                None => return best,
            }
        }
    }

    /// The value stored under exactly `key/bits`.
    pub fn get(&self, key: K, bits: u32) -> Result<Option<&V>> {
        Ok(self
            .find(key, bits)?
            .filter(|n| n.bits() == bits)
            .and_then(|n| n.value()))
    }

    pub fn contains(&self, key: K, bits: u32) -> Result<bool> {
        Ok(self.get(key, bits)?.is_some())
    }

    // === Remove ===

    /// Remove the entry stored under exactly `key/bits`, compacting the
    /// branches it leaves redundant. A shorter covering prefix is never
    /// removed in its place.
    pub fn remove(&mut self, key: K, bits: u32) -> Result<Option<Entry<K, V>>> {
        Self::check_bits(bits)?;
        let key = key.mask(bits);
        let Some(at) = self.locate(key, bits) else {
            return Ok(None);
        };
        let entry = self.node_mut(at).entry.take();
        if entry.is_some() {
            self.len -= 1;
        }
        self.prune(at);
        Ok(entry)
    }

    /// The node whose entry is exactly `key/bits`.
    fn locate(&self, key: K, bits: u32) -> Option<NodeId> {
        let mut at = NodeId::ROOT;
        let mut depth = 0u32;

        loop {
            let node = self.node(at);
            if node.entry.as_ref().is_some_and(|e| e.is_prefix(key, bits)) {
                return Some(at);
            }
            if depth >= bits {
                return None;
            }
            at = node.branch[direction(key, depth)]?;
            depth += 1;
        }
    }

    /// Walk up from `at` removing structure that no longer branches.
    ///
    /// Only single-leaf children are folded into their parent. The walk ends
    /// at the first node that still branches.
    fn prune(&mut self, mut at: NodeId) {
        loop {
            let node = self.node(at);
            let Some(parent) = node.parent else {
                return;
            };

            if node.entry.is_some() {
                if !node.is_leaf() {
                    trace_log!(?at, "prune stop: occupied internal node");
                    return;
                }
                // The parent may be able to absorb this leaf.
                at = parent;
                continue;
            }

            if node.is_leaf() {
                self.unlink(at, parent);
                at = parent;
                continue;
            }

            match node.only_child() {
                Some(child) if self.node(child).is_leaf() => {
                    self.absorb(at, child);
                }
                _ => {
                    trace_log!(?at, "prune stop: node still branches");
                    return;
                }
            }
        }
    }

    /// Detach the empty leaf `at` from `parent` and release it.
    fn unlink(&mut self, at: NodeId, parent: NodeId) {
        let branch = &mut self.node_mut(parent).branch;
        match branch.iter().position(|b| *b == Some(at)) {
            Some(dir) => branch[dir] = None,
            None => panic!("bitradix: {at:?} missing from its parent {parent:?}"),
        }
        debug_log!(?at, ?parent, "unlink empty leaf");
        self.release(at);
    }

    /// Fold the leaf `child` into its parent `at`, which becomes a leaf.
    fn absorb(&mut self, at: NodeId, child: NodeId) {
        let child = self.release(child);
        debug_assert!(child.is_leaf());
        debug_log!(?at, "absorb single leaf child");
        let node = self.node_mut(at);
        node.entry = child.entry;
        node.branch = [None, None];
    }

    // === Inspection ===

    /// Render the tree breadth-first, one node per line:
    /// `indent (branch) key/bits -> value`.
    pub fn dump(&self) -> String
    where
        V: fmt::Debug,
    {
        let mut out = String::new();
        self.walk(|node, depth, branch| {
            let indent = " ".repeat(depth as usize);
            let _ = match node.entry() {
                Some(e) => writeln!(
                    out,
                    "{indent}({:2}): {:0width$b}/{} -> {:?}",
                    branch.as_i8(),
                    e.key,
                    e.bits,
                    e.value,
                    width = K::BITS as usize
                ),
                None => writeln!(out, "{indent}({:2}): -", branch.as_i8()),
            };
        });
        out
    }
}

impl<K: Key, V> Default for Radix<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: fmt::Debug> fmt::Debug for Radix<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries()).finish()
    }
}
