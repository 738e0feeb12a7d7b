// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The component contract and the context handed to its handlers.

use alloc::boxed::Box;
use kurbo::Point;
use tickui_event_state::edge::{MouseButtons, ScrollDirection};
use tickui_tree::{LocalNode, NodeFlags, NodeId};

use crate::Controller;
use crate::deferred::DeferredActionQueue;
use crate::events::KeyEvent;
use crate::logging::log_warn;
use crate::modal::{ModalId, ModalStack, ModalSurface};
use crate::mutation::MutationBuffer;

/// A node's behavior.
///
/// Every handler receives a [`Context`] for the node being visited. Events
/// reach a node because its top-level ancestor was eligible; the node's own
/// flags are not consulted, except for [`render`](Component::render), which
/// is only called on visible nodes.
///
/// Only `render` is required; every other handler defaults to doing nothing.
pub trait Component {
    /// Called once, on the first tick after the node's top-level ancestor was
    /// registered.
    fn initialize(&mut self, cx: &mut Context<'_>) {
        let _ = cx;
    }

    /// Called when the node (or an ancestor) is disposed.
    fn dispose(&mut self, cx: &mut Context<'_>) {
        let _ = cx;
    }

    /// A key was pressed.
    fn key_down(&mut self, cx: &mut Context<'_>, event: &KeyEvent) {
        let _ = (cx, event);
    }

    /// A key was released.
    fn key_up(&mut self, cx: &mut Context<'_>, event: &KeyEvent) {
        let _ = (cx, event);
    }

    /// The cursor moved to `position`, in viewport coordinates.
    fn mouse_move(&mut self, cx: &mut Context<'_>, position: Point) {
        let _ = (cx, position);
    }

    /// The pressed button set changed.
    fn mouse_buttons(&mut self, cx: &mut Context<'_>, buttons: MouseButtons) {
        let _ = (cx, buttons);
    }

    /// The scroll wheel is turning.
    fn mouse_scroll(&mut self, cx: &mut Context<'_>, direction: ScrollDirection) {
        let _ = (cx, direction);
    }

    /// Called every tick, visible or not.
    fn update(&mut self, cx: &mut Context<'_>) {
        let _ = cx;
    }

    /// Draw the node. Only called while it is visible.
    fn render(&mut self, cx: &mut Context<'_>);
}

/// The parts of a controller that handlers may touch mid-dispatch.
#[derive(Debug, Default)]
pub(crate) struct Queues {
    pub(crate) components: MutationBuffer<NodeId>,
    pub(crate) actions: DeferredActionQueue<Controller>,
    pub(crate) modals: ModalStack,
}

/// Handle given to [`Component`] handlers.
///
/// The context never exposes the controller itself: structural requests are
/// buffered until the next tick, and anything that needs the whole
/// controller is expressed as a deferred action that runs right after the
/// current pass.
pub struct Context<'a> {
    id: NodeId,
    position: Point,
    flags: &'a mut NodeFlags,
    queues: &'a mut Queues,
}

impl core::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        id: NodeId,
        position: Point,
        flags: &'a mut NodeFlags,
        queues: &'a mut Queues,
    ) -> Self {
        Self {
            id,
            position,
            flags,
            queues,
        }
    }

    /// The node being visited.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Absolute position of the node, composed from its parent chain.
    pub fn position(&self) -> Point {
        self.position
    }

    /// The node's flags.
    pub fn flags(&self) -> NodeFlags {
        *self.flags
    }

    /// Replace the node's flags.
    pub fn set_flags(&mut self, flags: NodeFlags) {
        *self.flags = flags;
    }

    /// Whether the node is visible.
    pub fn is_visible(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE)
    }

    /// Make the node visible.
    pub fn show(&mut self) {
        self.flags.insert(NodeFlags::VISIBLE);
    }

    /// Hide the node.
    pub fn hide(&mut self) {
        self.flags.remove(NodeFlags::VISIBLE);
    }

    /// Whether `id` is in the controller's top-level list right now.
    pub fn is_registered(&self, id: NodeId) -> bool {
        self.queues.components.contains(id)
    }

    /// Ask for `id` to join the top-level list at the start of the next tick.
    pub fn register(&mut self, id: NodeId) {
        self.queues.components.request_add(id);
    }

    /// Ask for `id` to leave the top-level list at the start of the next tick.
    pub fn unregister(&mut self, id: NodeId) {
        self.queues.components.request_remove(id);
    }

    /// Run `action` against the controller once the current pass is over.
    ///
    /// Actions queued during a tick run before that tick's tick-handled
    /// notification. Actions queued during key dispatch run at the end of
    /// the next tick's component pass.
    pub fn defer(&mut self, action: impl FnOnce(&mut Controller) + 'static) {
        self.queues.actions.push(action);
    }

    /// Create a new top-level component once the current pass is over and
    /// register it. It is initialized on the following tick.
    pub fn spawn(&mut self, local: LocalNode, component: impl Component + 'static) {
        self.defer(move |controller: &mut Controller| {
            let id = controller.insert(local, component);
            if controller.register(id).is_err() {
                log_warn!(?id, "spawned component was not registered");
            }
        });
    }

    /// Dispose of `id` and its subtree once the current pass is over.
    pub fn dispose(&mut self, id: NodeId) {
        self.defer(move |controller: &mut Controller| controller.dispose(id));
    }

    /// Move `id` to the end of the top-level list once the current pass is over.
    pub fn set_topmost(&mut self, id: NodeId) {
        self.defer(move |controller: &mut Controller| controller.set_topmost(id));
    }

    /// Show a modal surface. It goes live at the next tick's flush and takes
    /// over from that tick on.
    pub fn show_modal(&mut self, surface: impl ModalSurface + 'static) -> ModalId {
        self.queues.modals.show(Box::new(surface))
    }

    /// Close a modal surface at the next tick's flush. Returns `false` for
    /// unknown ids.
    pub fn close_modal(&mut self, id: ModalId) -> bool {
        self.queues.modals.close(id)
    }
}
