// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, lifecycle bookkeeping, traversal.

use alloc::{vec, vec::Vec};
use kurbo::{Point, Vec2};
use smallvec::SmallVec;

use crate::types::{Lifecycle, LocalNode, NodeFlags, NodeId, TreeError};

/// Arena of component nodes.
///
/// Each node carries a payload `T` (typically a boxed component), its
/// [`LocalNode`] data, a [`Lifecycle`] state, a start-suppression counter, and
/// its parent/children links. A node owns its children: removing a node
/// removes its whole subtree.
///
/// ## Example
///
/// ```rust
/// use kurbo::{Point, Vec2};
/// use tickui_tree::{LocalNode, NodeFlags, Tree};
///
/// let mut tree = Tree::new();
/// let root = tree.insert(
///     LocalNode { offset: Vec2::new(10.0, 10.0), flags: NodeFlags::VISIBLE },
///     "panel",
/// );
/// let label = tree
///     .insert_child(root, LocalNode { offset: Vec2::new(5.0, 2.0), ..LocalNode::default() }, "label")
///     .unwrap();
///
/// assert_eq!(tree.absolute_position(label), Some(Point::new(15.0, 12.0)));
/// assert_eq!(tree.parent_of(label), Some(root));
/// ```
pub struct Tree<T> {
    /// slots
    nodes: Vec<Option<Node<T>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl<T> core::fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .finish_non_exhaustive()
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A node handed to a traversal callback.
///
/// `position` is the node's absolute position, composed from the offsets
/// along its parent chain at the time of the visit.
#[derive(Debug)]
pub struct Visit<'a, T> {
    /// The visited node.
    pub id: NodeId,
    /// The node's payload.
    pub payload: &'a mut T,
    /// The node's flags; handlers may change them.
    pub flags: &'a mut NodeFlags,
    /// Absolute position of the node.
    pub position: Point,
}

#[derive(Clone, Debug)]
struct Node<T> {
    generation: u32,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    local: LocalNode,
    lifecycle: Lifecycle,
    start_suppression: u32,
    payload: T,
}

impl<T> Node<T> {
    fn new(generation: u32, local: LocalNode, payload: T) -> Self {
        Self {
            generation,
            parent: None,
            children: SmallVec::new(),
            local,
            lifecycle: Lifecycle::Unregistered,
            start_suppression: 0,
            payload,
        }
    }
}

impl<T> Tree<T> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Insert a new parentless node.
    ///
    /// The node starts [`Lifecycle::Unregistered`].
    pub fn insert(&mut self, local: LocalNode, payload: T) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local, payload));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local, payload)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    /// Insert a new node as the last child of `parent`.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        local: LocalNode,
        payload: T,
    ) -> Result<NodeId, TreeError> {
        if !self.is_alive(parent) {
            return Err(TreeError::StaleNode(parent));
        }
        let id = self.insert(local, payload);
        self.link_parent(id, parent);
        Ok(id)
    }

    /// Append an existing parentless node to `parent`'s children.
    ///
    /// Fails if either node is stale, if `child` already has a parent, or if
    /// the link would make `child` its own ancestor.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !self.is_alive(parent) {
            return Err(TreeError::StaleNode(parent));
        }
        if !self.is_alive(child) {
            return Err(TreeError::StaleNode(child));
        }
        if parent == child {
            return Err(TreeError::SelfParent(child));
        }
        if self.node(child).parent.is_some() {
            return Err(TreeError::AlreadyParented(child));
        }
        let mut current = Some(parent);
        while let Some(id) = current {
            if id == child {
                return Err(TreeError::WouldCycle(child));
            }
            current = self.node(id).parent;
        }
        self.link_parent(child, parent);
        Ok(())
    }

    /// Detach `id` from its parent, making it a root. No-op for roots and stale ids.
    pub fn detach(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
    }

    /// Remove a node and its subtree, returning the payloads in pre-order
    /// (parent before children). Stale ids yield an empty list.
    pub fn remove(&mut self, id: NodeId) -> Vec<(NodeId, T)> {
        if !self.is_alive(id) {
            return Vec::new();
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        let order = self.subtree(id);
        let mut removed = Vec::with_capacity(order.len());
        for nid in order {
            if let Some(node) = self.nodes[nid.idx()].take() {
                self.free_list.push(nid.idx());
                removed.push((nid, node.payload));
            }
        }
        removed
    }

    /// Returns `true` if `id` names a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns `true` if the tree holds no live node.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the parent of a live node, or `None` for roots and stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        match self.node_opt(id) {
            Some(n) => &n.children,
            None => &[],
        }
    }

    /// Pre-order list of `id` and all its descendants.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.is_alive(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(nid) = stack.pop() {
            out.push(nid);
            stack.extend(self.node(nid).children.iter().rev().copied());
        }
        out
    }

    /// Returns the flags of a node if the identifier is live.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.node_opt(id).map(|n| n.local.flags)
    }

    /// Update node flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.flags = flags;
        }
    }

    /// Returns the local offset of a live node.
    pub fn offset(&self, id: NodeId) -> Option<Vec2> {
        self.node_opt(id).map(|n| n.local.offset)
    }

    /// Update the local offset.
    pub fn set_offset(&mut self, id: NodeId, offset: Vec2) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.offset = offset;
        }
    }

    /// Absolute position of a live node: the sum of offsets along its parent chain.
    ///
    /// This is computed on every call and never cached.
    pub fn absolute_position(&self, id: NodeId) -> Option<Point> {
        let mut node = self.node_opt(id)?;
        let mut acc = node.local.offset;
        while let Some(parent) = node.parent {
            node = self.node(parent);
            acc += node.local.offset;
        }
        Some(acc.to_point())
    }

    /// Returns the lifecycle state of a live node.
    pub fn lifecycle(&self, id: NodeId) -> Option<Lifecycle> {
        self.node_opt(id).map(|n| n.lifecycle)
    }

    /// Set the lifecycle state of a single node.
    pub fn set_lifecycle(&mut self, id: NodeId, lifecycle: Lifecycle) {
        if let Some(n) = self.node_opt_mut(id) {
            n.lifecycle = lifecycle;
        }
    }

    /// Set the lifecycle state of `id` and every descendant.
    pub fn set_subtree_lifecycle(&mut self, id: NodeId, lifecycle: Lifecycle) {
        for nid in self.subtree(id) {
            self.node_mut(nid).lifecycle = lifecycle;
        }
    }

    /// Remaining start-suppression ticks of a live node.
    pub fn start_suppression(&self, id: NodeId) -> Option<u32> {
        self.node_opt(id).map(|n| n.start_suppression)
    }

    /// Set the start-suppression counter.
    pub fn set_start_suppression(&mut self, id: NodeId, frames: u32) {
        if let Some(n) = self.node_opt_mut(id) {
            n.start_suppression = frames;
        }
    }

    /// Borrow a node's payload.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.node_opt(id).map(|n| &n.payload)
    }

    /// Mutably borrow a node's payload.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_opt_mut(id).map(|n| &mut n.payload)
    }

    /// Visit `id` and then every descendant, depth-first, parent before children.
    ///
    /// Descendants are visited unconditionally: their flags are not consulted.
    /// Gating by visibility or input demand is the caller's job and happens once,
    /// before the broadcast begins.
    pub fn broadcast(&mut self, id: NodeId, mut visit: impl FnMut(Visit<'_, T>)) {
        self.walk(id, false, &mut visit);
    }

    /// Like [`Tree::broadcast`], but the callback only runs for nodes that are
    /// visible at the time they are reached.
    ///
    /// Each node checks its own flag only: the children of a hidden node are
    /// still reached, and each of them renders if it is visible itself.
    pub fn broadcast_visible(&mut self, id: NodeId, mut visit: impl FnMut(Visit<'_, T>)) {
        self.walk(id, true, &mut visit);
    }

    fn walk(&mut self, id: NodeId, visible_only: bool, visit: &mut impl FnMut(Visit<'_, T>)) {
        if !self.is_alive(id) {
            return;
        }
        let origin = self
            .parent_of(id)
            .and_then(|p| self.absolute_position(p))
            .unwrap_or(Point::ORIGIN);
        self.walk_from(id, origin, visible_only, visit);
    }

    fn walk_from(
        &mut self,
        id: NodeId,
        origin: Point,
        visible_only: bool,
        visit: &mut impl FnMut(Visit<'_, T>),
    ) {
        // Children are pushed in reverse so they pop in list order.
        let mut stack: SmallVec<[(NodeId, Point); 16]> = SmallVec::new();
        stack.push((id, origin));

        while let Some((nid, parent_pos)) = stack.pop() {
            let node = self.node_mut(nid);
            let position = parent_pos + node.local.offset;
            // A hidden node skips its own callback; its children still get theirs.
            if !visible_only || node.local.flags.contains(NodeFlags::VISIBLE) {
                visit(Visit {
                    id: nid,
                    payload: &mut node.payload,
                    flags: &mut node.local.flags,
                    position,
                });
            }
            for &child in node.children.iter().rev() {
                stack.push((child, position));
            }
        }
    }

    /// Access a node; panics if `id` is stale.
    fn node(&self, id: NodeId) -> &Node<T> {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node<T>> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        let parent_node = self.node_mut(parent);
        parent_node.children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }
}
