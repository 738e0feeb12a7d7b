// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cancelable observer chain: run observers in order and honor cancelation.

use alloc::rc::Rc;
use smallvec::SmallVec;

/// An event payload that observers can cancel.
///
/// The chain inspects the flag after every observer call. Implementations
/// usually wrap a plain `bool` field (`canceled`, `handled`, ...).
pub trait Cancelable {
    /// Returns `true` once an observer has canceled (or handled) the event.
    fn is_canceled(&self) -> bool;
}

/// A chain observer.
///
/// Observers are reference counted so that the subscriber can keep a handle
/// for [`EventChain::unsubscribe`]; identity is pointer identity of the `Rc`.
pub type Observer<C, E> = Rc<dyn Fn(&C, &mut E)>;

/// An ordered, de-duplicated list of observers for one cancelable event type.
///
/// Firing invokes observers in subscription order with `(context, event)` and
/// returns as soon as one of them leaves the event canceled. The remaining
/// observers are skipped for that firing only.
pub struct EventChain<C, E> {
    observers: SmallVec<[Observer<C, E>; 4]>,
}

impl<C, E> core::fmt::Debug for EventChain<C, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventChain")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<C, E> Default for EventChain<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E> EventChain<C, E> {
    /// Create an empty chain. Firing an empty chain never cancels.
    pub fn new() -> Self {
        Self {
            observers: SmallVec::new(),
        }
    }

    /// Append `observer` to the end of the chain.
    ///
    /// Returns `false` (and leaves the chain untouched) if the same observer is
    /// already subscribed.
    pub fn subscribe(&mut self, observer: Observer<C, E>) -> bool {
        if self.contains(&observer) {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Remove `observer` from the chain. Returns `false` if it was not present.
    pub fn unsubscribe(&mut self, observer: &Observer<C, E>) -> bool {
        let Some(pos) = self.observers.iter().position(|o| same(o, observer)) else {
            return false;
        };
        self.observers.remove(pos);
        true
    }

    /// Returns whether `observer` is currently subscribed.
    pub fn contains(&self, observer: &Observer<C, E>) -> bool {
        self.observers.iter().any(|o| same(o, observer))
    }

    /// Number of subscribed observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns `true` if no observer is subscribed.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Drop every observer.
    pub fn clear(&mut self) {
        self.observers.clear();
    }
}

impl<C, E: Cancelable> EventChain<C, E> {
    /// Fire the chain.
    ///
    /// Invokes each observer with `(context, event)` in subscription order.
    /// After each call the event's cancel flag is inspected; if it is set the
    /// method returns `true` immediately. Returns `false` when every observer
    /// ran without canceling.
    ///
    /// An event that arrives already canceled still reaches the first
    /// observer; the flag is only read after an observer has run.
    pub fn fire(&self, context: &C, event: &mut E) -> bool {
        for observer in &self.observers {
            observer(context, event);
            if event.is_canceled() {
                return true;
            }
        }
        false
    }
}

pub(crate) fn same<T: ?Sized>(a: &Rc<T>, b: &Rc<T>) -> bool {
    core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}
