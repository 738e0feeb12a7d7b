// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tickui Tree: a generational arena of UI component nodes.
//!
//! - Each node holds a payload, a local offset, [`NodeFlags`], a [`Lifecycle`]
//!   state, and a start-suppression counter.
//! - A node exclusively owns its children. A node never has two parents.
//! - Absolute positions are a pure query ([`Tree::absolute_position`]): the sum of
//!   offsets along the parent chain, recomputed on every call.
//!
//! ## Propagation contract
//!
//! [`Tree::broadcast`] visits a node and then every descendant, unconditionally.
//! Child flags are not consulted, so a hidden child of a visible parent still
//! receives everything the parent receives. Gating happens exactly once, on the
//! top-level node, before the broadcast is issued. The only exception is
//! rendering: [`Tree::broadcast_visible`] skips the callback of each hidden
//! node, while still descending into its children.
//!
//! ## API overview
//!
//! - [`Tree`]: container managing nodes, links, and traversal.
//! - [`LocalNode`]: per-node local data (offset, flags).
//! - [`NodeFlags`]: visibility and input-demand flags.
//! - [`NodeId`]: generational handle of a node.
//! - [`Visit`]: what a traversal callback sees for each node.
//!
//! Key operations:
//! - [`Tree::insert`] / [`Tree::insert_child`] / [`Tree::add_child`] → structure.
//! - [`Tree::remove`] → removes a subtree and hands back the payloads.
//! - [`Tree::broadcast`] / [`Tree::broadcast_visible`] → depth-first dispatch.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod tree;
mod types;

pub use tree::{Tree, Visit};
pub use types::{Lifecycle, LocalNode, NodeFlags, NodeId, TreeError};
