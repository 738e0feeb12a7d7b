// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Informational notifications: every listener runs, nobody can cancel.

use alloc::rc::Rc;
use smallvec::SmallVec;

use crate::chain::same;

/// A notification listener.
pub type Listener<C, E> = Rc<dyn Fn(&C, &E)>;

/// An ordered, de-duplicated list of listeners for a non-cancelable event.
pub struct Listeners<C, E> {
    listeners: SmallVec<[Listener<C, E>; 4]>,
}

impl<C, E> core::fmt::Debug for Listeners<C, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Listeners")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<C, E> Default for Listeners<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E> Listeners<C, E> {
    /// Create an empty listener list.
    pub fn new() -> Self {
        Self {
            listeners: SmallVec::new(),
        }
    }

    /// Append `listener`. Returns `false` if it is already present.
    pub fn subscribe(&mut self, listener: Listener<C, E>) -> bool {
        if self.listeners.iter().any(|l| same(l, &listener)) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Remove `listener`. Returns `false` if it was not present.
    pub fn unsubscribe(&mut self, listener: &Listener<C, E>) -> bool {
        let Some(pos) = self.listeners.iter().position(|l| same(l, listener)) else {
            return false;
        };
        self.listeners.remove(pos);
        true
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Invoke every listener in subscription order.
    pub fn notify(&self, context: &C, event: &E) {
        for listener in &self.listeners {
            listener(context, event);
        }
    }
}
