// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exclusive modal surfaces.
//!
//! While at least one surface is live, the controller hands each tick to the
//! surfaces instead of the component pass. Once every live surface reports
//! itself hidden and no new surface is waiting to be shown, all of them are
//! retired at the next flush and normal dispatch resumes.

use alloc::boxed::Box;
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::mutation::{FlushReport, MutationBuffer, RequestOutcome};

/// An exclusive surface such as a blocking menu.
pub trait ModalSurface {
    /// Run one tick of the surface.
    fn process(&mut self);

    /// Whether the surface is still shown.
    fn is_visible(&self) -> bool;
}

/// Identifier of a surface shown through a [`ModalStack`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModalId(u64);

/// Surfaces plus their buffered show/close requests.
pub struct ModalStack {
    surfaces: HashMap<ModalId, Box<dyn ModalSurface>>,
    order: MutationBuffer<ModalId>,
    next_id: u64,
}

impl core::fmt::Debug for ModalStack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModalStack")
            .field("surfaces", &self.surfaces.len())
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl Default for ModalStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self {
            surfaces: HashMap::new(),
            order: MutationBuffer::new(),
            next_id: 0,
        }
    }

    /// Show `surface`, now or at the next flush if the stack is frozen.
    pub fn show(&mut self, surface: Box<dyn ModalSurface>) -> ModalId {
        let id = ModalId(self.next_id);
        self.next_id += 1;
        self.surfaces.insert(id, surface);
        self.order.request_add(id);
        id
    }

    /// Close a surface. Returns `false` for unknown ids.
    pub fn close(&mut self, id: ModalId) -> bool {
        if !self.surfaces.contains_key(&id) {
            return false;
        }
        if self.order.request_remove(id) == RequestOutcome::Applied {
            self.surfaces.remove(&id);
        }
        true
    }

    /// Whether `id` is live.
    pub fn is_showing(&self, id: ModalId) -> bool {
        self.order.contains(id)
    }

    /// Whether any surface is live.
    pub fn is_active(&self) -> bool {
        !self.order.live().is_empty()
    }

    /// Number of live surfaces.
    pub fn len(&self) -> usize {
        self.order.live().len()
    }

    /// Returns `true` if no surface is live.
    pub fn is_empty(&self) -> bool {
        !self.is_active()
    }

    /// Hold show/close requests back until the next flush.
    pub(crate) fn begin_iteration(&mut self) {
        self.order.begin_iteration();
    }

    /// Let show/close requests apply immediately again.
    pub(crate) fn end_iteration(&mut self) {
        self.order.end_iteration();
    }

    /// Apply buffered show/close requests and drop closed surfaces.
    pub(crate) fn flush(&mut self) -> FlushReport<ModalId> {
        let surfaces = &self.surfaces;
        let report = self.order.flush(|id| surfaces.contains_key(&id));
        for id in &report.removed {
            self.surfaces.remove(id);
        }
        report
    }

    /// Process every live surface in order. Returns `true` if the surfaces
    /// were all hidden and have been queued for retirement.
    pub(crate) fn process(&mut self) -> bool {
        self.order.begin_iteration();
        let live: SmallVec<[ModalId; 4]> = self.order.live().iter().copied().collect();
        for id in &live {
            if let Some(surface) = self.surfaces.get_mut(id) {
                surface.process();
            }
        }
        let all_hidden = live
            .iter()
            .all(|id| self.surfaces.get(id).is_none_or(|s| !s.is_visible()));
        let retire = all_hidden && !self.order.has_pending_add();
        if retire {
            for id in live {
                self.order.request_remove(id);
            }
        }
        self.order.end_iteration();
        retire
    }
}
