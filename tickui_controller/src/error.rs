// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by the host-facing controller API.

use tickui_tree::{NodeId, TreeError};

/// Errors from [`Controller`](crate::Controller) registration and tree edits.
///
/// Requests issued from inside component handlers are buffered and cannot
/// fail synchronously; invalid ones are dropped when the buffer is flushed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControllerError {
    /// The identifier does not name a live component.
    StaleNode(NodeId),
    /// Only parentless components can be registered at the top level.
    HasParent(NodeId),
    /// The component is already in the top-level list.
    AlreadyRegistered(NodeId),
    /// The component is not in the top-level list.
    NotRegistered(NodeId),
    /// A structural tree edit was rejected.
    Tree(TreeError),
}

impl core::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::StaleNode(id) => write!(f, "component {id:?} is not alive"),
            Self::HasParent(id) => {
                write!(f, "component {id:?} has a parent and cannot be top-level")
            }
            Self::AlreadyRegistered(id) => write!(f, "component {id:?} is already registered"),
            Self::NotRegistered(id) => write!(f, "component {id:?} is not registered"),
            Self::Tree(err) => write!(f, "tree edit failed: {err}"),
        }
    }
}

impl core::error::Error for ControllerError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Tree(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TreeError> for ControllerError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::StaleNode(id) => Self::StaleNode(id),
            other => Self::Tree(other),
        }
    }
}
