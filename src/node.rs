//! Tree nodes, stored entries and borrowed node handles.

use crate::key::Key;
use crate::tree::Radix;
use std::fmt;

/// Index of a node slot in the tree's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);

    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        match u32::try_from(index) {
            Ok(index) => NodeId(index),
            Err(_) => panic!("bitradix: arena index {index} exceeds u32"),
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A stored prefix and its value.
///
/// `key` is always masked to `bits`.
#[derive(Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) bits: u32,
    pub(crate) value: V,
}

impl<K: Key, V> Entry<K, V> {
    pub(crate) fn new(key: K, bits: u32, value: V) -> Self {
        Self {
            key: key.mask(bits),
            bits,
            value,
        }
    }

    pub fn key(&self) -> K {
        self.key
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    /// True if this prefix covers `key`.
    #[inline]
    pub fn covers(&self, key: K) -> bool {
        key.mask(self.bits) == self.key
    }

    /// True if this is exactly the prefix `key/bits`.
    #[inline]
    pub(crate) fn is_prefix(&self, key: K, bits: u32) -> bool {
        self.bits == bits && self.covers(key)
    }
}

impl<K: Key, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:0width$b}/{} => {:?}",
            self.key,
            self.bits,
            self.value,
            width = K::BITS as usize
        )
    }
}

#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) entry: Option<Entry<K, V>>,
    /// `branch[0]` follows a zero bit, `branch[1]` a one bit.
    pub(crate) branch: [Option<NodeId>; 2],
    pub(crate) parent: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(parent: Option<NodeId>, entry: Option<Entry<K, V>>) -> Self {
        Self {
            entry,
            branch: [None, None],
            parent,
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.branch[0].is_none() && self.branch[1].is_none()
    }

    /// The child when exactly one branch is present.
    pub(crate) fn only_child(&self) -> Option<NodeId> {
        match self.branch {
            [Some(c), None] | [None, Some(c)] => Some(c),
            _ => None,
        }
    }
}

/// A read-only handle to a node, borrowed from its tree.
pub struct NodeRef<'a, K, V> {
    tree: &'a Radix<K, V>,
    id: NodeId,
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

impl<'a, K: Key, V> NodeRef<'a, K, V> {
    pub(crate) fn new(tree: &'a Radix<K, V>, id: NodeId) -> Self {
        Self { tree, id }
    }

    #[inline]
    fn node(&self) -> &'a Node<K, V> {
        self.tree.node(self.id)
    }

    /// The stored entry, if any.
    pub fn entry(&self) -> Option<&'a Entry<K, V>> {
        self.node().entry.as_ref()
    }

    /// Stored key, or zero when the node holds no entry.
    pub fn key(&self) -> K {
        self.entry().map_or(K::ZERO, |e| e.key)
    }

    /// Significant bits of the stored key; zero means no entry.
    pub fn bits(&self) -> u32 {
        self.entry().map_or(0, |e| e.bits)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.entry().map(|e| &e.value)
    }

    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    pub fn is_root(&self) -> bool {
        self.id == NodeId::ROOT
    }

    /// The child reached through `bit` (0 or 1).
    pub fn child(&self, bit: u8) -> Option<NodeRef<'a, K, V>> {
        debug_assert!(bit < 2);
        self.node().branch[bit as usize].map(|id| NodeRef::new(self.tree, id))
    }

    pub fn parent(&self) -> Option<NodeRef<'a, K, V>> {
        self.node().parent.map(|id| NodeRef::new(self.tree, id))
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }
}

impl<K: Key, V: fmt::Debug> fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("entry", &self.entry())
            .field("leaf", &self.is_leaf())
            .finish()
    }
}
