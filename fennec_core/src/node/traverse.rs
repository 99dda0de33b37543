// Copyright 2026 the Fennec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec::Vec;
use core::slice;

use super::id::{INVALID, NodeId};
use super::store::NodeTree;

/// An iterator over the direct children of a node.
///
/// Created by [`NodeTree::children`]. Double-ended, so hit-testing can walk
/// siblings topmost-first with `.rev()`.
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a NodeTree,
    iter: slice::Iter<'a, u32>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a NodeTree, children: &'a [u32]) -> Self {
        Self {
            tree,
            iter: children.iter(),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.iter.next().map(|&idx| self.tree.id_at(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<NodeId> {
        self.iter.next_back().map(|&idx| self.tree.id_at(idx))
    }
}

impl ExactSizeIterator for Children<'_> {}

/// An iterator over the ancestors of a node, nearest first.
///
/// Created by [`NodeTree::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a NodeTree,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(tree: &'a NodeTree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.parent[idx as usize];
        Some(self.tree.id_at(idx))
    }
}

/// A pre-order iterator over a subtree, children in declaration order.
///
/// Created by [`NodeTree::depth_first`]. Yields each node with its depth
/// relative to the starting node.
#[derive(Debug)]
pub struct DepthFirst<'a> {
    tree: &'a NodeTree,
    stack: Vec<(u32, usize)>,
}

impl<'a> DepthFirst<'a> {
    pub(crate) fn new(tree: &'a NodeTree, start: u32) -> Self {
        Self {
            tree,
            stack: Vec::from([(start, 0)]),
        }
    }
}

impl Iterator for DepthFirst<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<(NodeId, usize)> {
        let (idx, depth) = self.stack.pop()?;
        let children = &self.tree.children[idx as usize];
        self.stack
            .extend(children.iter().rev().map(|&c| (c, depth + 1)));
        Some((self.tree.id_at(idx), depth))
    }
}
