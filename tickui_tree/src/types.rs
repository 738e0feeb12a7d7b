// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the component tree: identifiers, flags, lifecycle, errors.

use kurbo::Vec2;

/// Identifier for a node in the tree (generational).
///
/// Identity is by reference only: two nodes with identical payloads are still
/// distinct. Once a node is removed its identifier becomes stale and is never
/// handed out again, even if the slot is reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Per-node flags, mutable by the node's owner.
    ///
    /// The controller reads these on top-level nodes only; once an event starts
    /// propagating into a subtree the descendants' flags are not consulted.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible: it renders and receives input.
        const VISIBLE                   = 0b0000_0001;
        /// Node receives input events even while hidden.
        const ALWAYS_NEEDS_INPUT        = 0b0000_0010;
        /// Host input must be suppressed while this node is visible.
        const NEEDS_CONTROL_SUPPRESSION = 0b0000_0100;
        /// The host cursor must be shown while this node is visible.
        const NEEDS_VISIBLE_CURSOR      = 0b0000_1000;
        /// Input is withheld for a number of ticks after initialization.
        const NEEDS_STARTUP_SUPPRESSION = 0b0001_0000;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl NodeFlags {
    /// Returns `true` if the node takes input events (`VISIBLE` or `ALWAYS_NEEDS_INPUT`).
    pub fn wants_input(self) -> bool {
        self.intersects(Self::VISIBLE | Self::ALWAYS_NEEDS_INPUT)
    }
}

/// Lifecycle of a node.
///
/// `Unregistered → Registered → Active → Disposed`. A node becomes `Active`
/// on its first tick after it was applied to the controller's top-level list.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Created but never registered.
    #[default]
    Unregistered,
    /// Applied to the top-level list, waiting for its first tick.
    Registered,
    /// Initialized and dispatched every tick.
    Active,
    /// Disposed; the slot is freed once the node leaves the top-level list.
    Disposed,
}

/// Local data for a node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocalNode {
    /// Offset relative to the parent's absolute position (or to the origin for roots).
    pub offset: Vec2,
    /// Visibility and input demand flags.
    pub flags: NodeFlags,
}

/// Structural errors reported by [`Tree`](crate::Tree).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The identifier does not name a live node.
    StaleNode(NodeId),
    /// The child already has a parent; a node cannot have two.
    AlreadyParented(NodeId),
    /// A node cannot be its own child.
    SelfParent(NodeId),
    /// Linking would make a node its own ancestor.
    WouldCycle(NodeId),
}

impl core::fmt::Display for TreeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::StaleNode(id) => write!(f, "node {id:?} is not alive"),
            Self::AlreadyParented(id) => write!(f, "node {id:?} already has a parent"),
            Self::SelfParent(id) => write!(f, "node {id:?} cannot be its own child"),
            Self::WouldCycle(id) => write!(f, "linking node {id:?} would create a cycle"),
        }
    }
}

impl core::error::Error for TreeError {}
