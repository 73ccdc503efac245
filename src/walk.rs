//! Breadth-first traversal for inspection and export.
//!
//! Insert, find and remove never go through here.

use crate::key::Key;
use crate::node::{Entry, NodeId, NodeRef};
use crate::tree::Radix;
use std::collections::VecDeque;

/// How a visited node was reached from its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Branch {
    Root,
    Zero,
    One,
}

impl Branch {
    /// `-1` for the root, otherwise the bit followed.
    pub fn as_i8(self) -> i8 {
        match self {
            Branch::Root => -1,
            Branch::Zero => 0,
            Branch::One => 1,
        }
    }

    fn from_bit(bit: usize) -> Self {
        if bit == 0 {
            Branch::Zero
        } else {
            Branch::One
        }
    }
}

/// A node produced by [`Bfs`].
#[derive(Clone, Copy)]
pub struct Visit<'a, K, V> {
    pub node: NodeRef<'a, K, V>,
    /// Distance from the root.
    pub depth: u32,
    pub branch: Branch,
}

/// Breadth-first iterator over every node of a tree, zero branch first.
pub struct Bfs<'a, K, V> {
    tree: &'a Radix<K, V>,
    queue: VecDeque<(NodeId, u32, Branch)>,
}

impl<'a, K: Key, V> Iterator for Bfs<'a, K, V> {
    type Item = Visit<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth, branch) = self.queue.pop_front()?;
        let node = NodeRef::new(self.tree, id);
        for bit in 0..2u8 {
            if let Some(child) = node.child(bit) {
                let branch = Branch::from_bit(bit as usize);
                self.queue.push_back((child.id(), depth + 1, branch));
            }
        }
        Some(Visit {
            node,
            depth,
            branch,
        })
    }
}

impl<K: Key, V> Radix<K, V> {
    pub fn bfs(&self) -> Bfs<'_, K, V> {
        let mut queue = VecDeque::new();
        queue.push_back((NodeId::ROOT, 0, Branch::Root));
        Bfs { tree: self, queue }
    }

    /// Call `f(node, depth, branch)` for every node, breadth-first from the
    /// root.
    pub fn walk<F>(&self, mut f: F)
    where
        F: FnMut(NodeRef<'_, K, V>, u32, Branch),
    {
        for visit in self.bfs() {
            f(visit.node, visit.depth, visit.branch);
        }
    }

    /// Every stored entry, in breadth-first node order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry<K, V>> + '_ {
        self.bfs().filter_map(|visit| visit.node.entry())
    }
}
