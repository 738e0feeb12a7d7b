// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Actions queued during a dispatch pass and run right after it.

use alloc::boxed::Box;
use alloc::vec::Vec;

/// A queued action. It receives the target once it is safe to mutate it.
pub type Action<T> = Box<dyn FnOnce(&mut T)>;

/// FIFO queue of actions against a target `T`.
///
/// The queue does not run anything itself: the owner of `T` takes the batch
/// with [`DeferredActionQueue::take`] once its iteration has finished and runs
/// each action against itself. Actions pushed while a batch is being run land
/// in a fresh batch.
pub struct DeferredActionQueue<T> {
    actions: Vec<Action<T>>,
}

impl<T> core::fmt::Debug for DeferredActionQueue<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeferredActionQueue")
            .field("actions", &self.actions.len())
            .finish()
    }
}

impl<T> Default for DeferredActionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DeferredActionQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Queue `action` behind every action already queued.
    pub fn push(&mut self, action: impl FnOnce(&mut T) + 'static) {
        self.actions.push(Box::new(action));
    }

    /// Number of queued actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Take the current batch, leaving the queue empty.
    pub fn take(&mut self) -> Vec<Action<T>> {
        core::mem::take(&mut self.actions)
    }
}
