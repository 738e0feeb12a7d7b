// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Buffered structural changes to a list that is iterated every frame.
//!
//! A [`MutationBuffer`] owns the live list together with the `iterating`
//! flag. Outside of iteration, requests apply immediately. While iterating,
//! they are queued and the live list is left untouched until the next
//! [`MutationBuffer::flush`], which applies every queued removal and then
//! every queued addition, each group in request order.
//!
//! ```
//! use tickui_controller::mutation::{MutationBuffer, RequestOutcome};
//!
//! let mut list = MutationBuffer::new();
//! assert_eq!(list.request_add('a'), RequestOutcome::Applied);
//!
//! list.begin_iteration();
//! assert_eq!(list.request_add('b'), RequestOutcome::Queued);
//! assert_eq!(list.request_remove('a'), RequestOutcome::Queued);
//! assert_eq!(list.live(), &['a'], "untouched while iterating");
//! list.end_iteration();
//!
//! let report = list.flush(|_| true);
//! assert_eq!(list.live(), &['b']);
//! assert_eq!(report.removed.as_slice(), &['a']);
//! assert_eq!(report.added.as_slice(), &['b']);
//! ```

use alloc::vec::Vec;
use smallvec::SmallVec;

/// A queued request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PendingMutation<K> {
    /// Append the key to the live list.
    Add(K),
    /// Remove the key from the live list.
    Remove(K),
}

impl<K: Copy> PendingMutation<K> {
    /// The key this request is about.
    pub fn key(&self) -> K {
        match *self {
            Self::Add(k) | Self::Remove(k) => k,
        }
    }
}

/// What happened to a request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The live list was changed immediately.
    Applied,
    /// The request waits for the next flush.
    Queued,
    /// Nothing to do: the key was already present (add) or absent (remove).
    Ignored,
}

/// Keys touched by one [`MutationBuffer::flush`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlushReport<K> {
    /// Keys taken out of the live list.
    pub removed: SmallVec<[K; 4]>,
    /// Keys appended to the live list.
    pub added: SmallVec<[K; 4]>,
    /// Additions dropped because the key was already live or not admitted.
    pub rejected: SmallVec<[K; 4]>,
}

impl<K> Default for FlushReport<K> {
    fn default() -> Self {
        Self {
            removed: SmallVec::new(),
            added: SmallVec::new(),
            rejected: SmallVec::new(),
        }
    }
}

impl<K> FlushReport<K> {
    /// Returns `true` if the flush changed nothing and rejected nothing.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty() && self.rejected.is_empty()
    }
}

/// A live list plus the requests queued against it while it was iterated.
#[derive(Clone, Debug)]
pub struct MutationBuffer<K> {
    live: Vec<K>,
    pending: Vec<PendingMutation<K>>,
    iterating: bool,
}

impl<K> Default for MutationBuffer<K> {
    fn default() -> Self {
        Self {
            live: Vec::new(),
            pending: Vec::new(),
            iterating: false,
        }
    }
}

impl<K: Copy + PartialEq> MutationBuffer<K> {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The live list, in insertion order.
    pub fn live(&self) -> &[K] {
        &self.live
    }

    /// Whether `key` is in the live list.
    pub fn contains(&self, key: K) -> bool {
        self.live.contains(&key)
    }

    /// Requests waiting for the next flush, oldest first.
    pub fn pending(&self) -> &[PendingMutation<K>] {
        &self.pending
    }

    /// Whether any addition is waiting for the next flush.
    pub fn has_pending_add(&self) -> bool {
        self.pending
            .iter()
            .any(|m| matches!(m, PendingMutation::Add(_)))
    }

    /// Whether the most recent queued request for `key` is an addition.
    pub fn is_pending_add(&self, key: K) -> bool {
        matches!(
            self.pending.iter().rev().find(|m| m.key() == key),
            Some(PendingMutation::Add(_))
        )
    }

    /// Whether the live list is currently being iterated.
    pub fn is_iterating(&self) -> bool {
        self.iterating
    }

    /// Start iterating: from now on requests are queued.
    pub fn begin_iteration(&mut self) {
        debug_assert!(!self.iterating, "iteration is not reentrant");
        self.iterating = true;
    }

    /// Stop iterating: requests apply immediately again.
    pub fn end_iteration(&mut self) {
        self.iterating = false;
    }

    /// Append `key` to the live list, now or at the next flush.
    pub fn request_add(&mut self, key: K) -> RequestOutcome {
        if self.iterating {
            self.pending.push(PendingMutation::Add(key));
            RequestOutcome::Queued
        } else if self.contains(key) {
            RequestOutcome::Ignored
        } else {
            self.live.push(key);
            RequestOutcome::Applied
        }
    }

    /// Remove `key` from the live list, now or at the next flush.
    pub fn request_remove(&mut self, key: K) -> RequestOutcome {
        if self.iterating {
            self.pending.push(PendingMutation::Remove(key));
            RequestOutcome::Queued
        } else if self.remove_live(key) {
            RequestOutcome::Applied
        } else {
            RequestOutcome::Ignored
        }
    }

    /// Apply all queued requests: removals first, then additions.
    ///
    /// `admit` is consulted for each addition of a key that is not already
    /// live; refused and duplicate additions end up in
    /// [`FlushReport::rejected`]. Removing an absent key is a no-op.
    ///
    /// Flushing while iterating does nothing.
    pub fn flush(&mut self, mut admit: impl FnMut(K) -> bool) -> FlushReport<K> {
        debug_assert!(!self.iterating, "flush while iterating");
        let mut report = FlushReport::default();
        if self.iterating {
            return report;
        }
        let pending = core::mem::take(&mut self.pending);
        for mutation in &pending {
            if let PendingMutation::Remove(key) = *mutation {
                if self.remove_live(key) {
                    report.removed.push(key);
                }
            }
        }
        for mutation in &pending {
            if let PendingMutation::Add(key) = *mutation {
                if self.contains(key) || !admit(key) {
                    report.rejected.push(key);
                } else {
                    self.live.push(key);
                    report.added.push(key);
                }
            }
        }
        report
    }

    /// Move a live key to the end of the list. Returns `false` if it is absent.
    ///
    /// Only valid outside of iteration.
    pub fn move_to_back(&mut self, key: K) -> bool {
        debug_assert!(!self.iterating, "reordering while iterating");
        let Some(pos) = self.live.iter().position(|k| *k == key) else {
            return false;
        };
        let key = self.live.remove(pos);
        self.live.push(key);
        true
    }

    /// Drop live keys for which `keep` returns `false`, returning them.
    ///
    /// Only valid outside of iteration.
    pub fn retain(&mut self, mut keep: impl FnMut(K) -> bool) -> SmallVec<[K; 4]> {
        debug_assert!(!self.iterating, "pruning while iterating");
        let mut dropped = SmallVec::new();
        self.live.retain(|k| {
            let kept = keep(*k);
            if !kept {
                dropped.push(*k);
            }
            kept
        });
        dropped
    }

    fn remove_live(&mut self, key: K) -> bool {
        let Some(pos) = self.live.iter().position(|k| *k == key) else {
            return false;
        };
        self.live.remove(pos);
        true
    }
}
