// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame-synchronized controller.

use alloc::boxed::Box;
use kurbo::Point;
use tickui_chain::{EventChain, Listeners};
use tickui_event_state::arbiter::{ControlArbiter, Transition};
use tickui_event_state::edge::{InputEdgeDetector, InputEdges};
use tickui_tree::{Lifecycle, LocalNode, NodeFlags, NodeId, Tree, Visit};

use crate::component::{Component, Context, Queues};
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::events::{KeyEvent, TickEvent};
use crate::host::Host;
use crate::logging::{log_debug, log_info, log_trace, log_warn};
use crate::modal::{ModalId, ModalSurface};
use crate::mutation::PendingMutation;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum KeyDirection {
    Down,
    Up,
}

/// Owns the component tree and drives it from the host's tick and key callbacks.
///
/// The controller is an explicit handle: the host constructs it, keeps it,
/// and calls [`on_tick`](Self::on_tick), [`on_key_down`](Self::on_key_down)
/// and [`on_key_up`](Self::on_key_up) from its own callbacks.
///
/// ## Tick
///
/// 1. Skip the tick entirely while the host is loading.
/// 2. Apply the component and modal requests buffered since the last tick.
/// 3. Fire the before-tick chain; a cancel ends the tick.
/// 4. If a modal surface is live, process the surfaces instead of the
///    components and jump to the tick-handled notification.
/// 5. Evaluate the [`ControlArbiter`] and suppress host controls if asked to.
/// 6. Show the cursor if a visible component asks for it.
/// 7. Diff the polled input against the previous tick.
/// 8. Visit every top-level component in list order: initialize it on its
///    first visit, update it, deliver pointer edges if it takes input and is
///    past its start-suppression window, and render it if visible.
/// 9. Run the actions deferred during the pass.
/// 10. Notify the tick-handled listeners.
///
/// Handlers never see the controller during steps 8 and 4. Everything they
/// request through their [`Context`] is buffered, so the list being visited
/// cannot change under the pass.
#[derive(Debug)]
pub struct Controller {
    tree: Tree<Box<dyn Component>>,
    queues: Queues,
    edges: InputEdgeDetector,
    arbiter: ControlArbiter,
    config: ControllerConfig,
    before_tick: EventChain<Self, TickEvent>,
    before_key_down: EventChain<Self, KeyEvent>,
    before_key_up: EventChain<Self, KeyEvent>,
    tick_handled: Listeners<Self, TickEvent>,
    key_down_handled: Listeners<Self, KeyEvent>,
    key_up_handled: Listeners<Self, KeyEvent>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    /// Create a controller with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ControllerConfig::default())
    }

    /// Create a controller with a custom configuration.
    pub fn with_config(config: ControllerConfig) -> Self {
        Self {
            tree: Tree::new(),
            queues: Queues::default(),
            edges: InputEdgeDetector::with_press_threshold(config.press_threshold),
            arbiter: ControlArbiter::with_grace_frames(config.grace_frames),
            config,
            before_tick: EventChain::new(),
            before_key_down: EventChain::new(),
            before_key_up: EventChain::new(),
            tick_handled: Listeners::new(),
            key_down_handled: Listeners::new(),
            key_up_handled: Listeners::new(),
        }
    }

    /// The configuration this controller was built with.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // --- tree ---

    /// Add a parentless component to the tree. It is not registered yet.
    pub fn insert(&mut self, local: LocalNode, component: impl Component + 'static) -> NodeId {
        self.tree.insert(local, Box::new(component))
    }

    /// Add a component as the last child of `parent`.
    ///
    /// If `parent` is already initialized, the new child is initialized
    /// right away.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        local: LocalNode,
        component: impl Component + 'static,
    ) -> Result<NodeId, ControllerError> {
        let id = self.tree.insert_child(parent, local, Box::new(component))?;
        self.adopt(parent, id);
        Ok(id)
    }

    /// Attach an existing parentless, unregistered component to `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), ControllerError> {
        if self.queues.components.contains(child) {
            return Err(ControllerError::AlreadyRegistered(child));
        }
        self.tree.add_child(parent, child)?;
        self.adopt(parent, child);
        Ok(())
    }

    fn adopt(&mut self, parent: NodeId, child: NodeId) {
        if self.tree.lifecycle(parent) == Some(Lifecycle::Active)
            && self.tree.lifecycle(child) != Some(Lifecycle::Active)
        {
            self.iterate(|this| this.broadcast(child, false, |c, cx| c.initialize(cx)));
            self.tree.set_subtree_lifecycle(child, Lifecycle::Active);
        }
    }

    /// The component tree.
    pub fn tree(&self) -> &Tree<Box<dyn Component>> {
        &self.tree
    }

    /// The component tree, for flag and offset edits.
    ///
    /// Nodes removed or re-parented here are dropped from the top-level list
    /// at the next flush.
    pub fn tree_mut(&mut self) -> &mut Tree<Box<dyn Component>> {
        &mut self.tree
    }

    /// Absolute position of a component.
    pub fn absolute_position(&self, id: NodeId) -> Option<Point> {
        self.tree.absolute_position(id)
    }

    // --- top-level list ---

    /// Add a parentless component to the top-level list.
    pub fn register(&mut self, id: NodeId) -> Result<(), ControllerError> {
        match self.tree.lifecycle(id) {
            None | Some(Lifecycle::Disposed) => return Err(ControllerError::StaleNode(id)),
            Some(_) => {}
        }
        if self.tree.parent_of(id).is_some() {
            return Err(ControllerError::HasParent(id));
        }
        if self.queues.components.contains(id) {
            return Err(ControllerError::AlreadyRegistered(id));
        }
        self.queues.components.request_add(id);
        self.mark_registered(id);
        Ok(())
    }

    /// Remove a component from the top-level list. The node stays in the tree.
    pub fn unregister(&mut self, id: NodeId) -> Result<(), ControllerError> {
        if !self.queues.components.contains(id) {
            return Err(ControllerError::NotRegistered(id));
        }
        self.queues.components.request_remove(id);
        self.mark_unregistered(id);
        Ok(())
    }

    /// Fire `dispose` over the subtree of `id` (parents first), take it out of
    /// the top-level list, and free it. Stale ids are ignored.
    pub fn dispose(&mut self, id: NodeId) {
        if !self.tree.is_alive(id) {
            return;
        }
        self.iterate(|this| this.broadcast(id, false, |c, cx| c.dispose(cx)));
        self.tree.set_subtree_lifecycle(id, Lifecycle::Disposed);
        self.queues.components.request_remove(id);
        self.tree.remove(id);
        log_info!(?id, "component disposed");
    }

    /// Move a registered component to the end of the top-level list, so it is
    /// processed and rendered last. No-op for unregistered ids.
    pub fn set_topmost(&mut self, id: NodeId) {
        self.schedule(move |this: &mut Self| {
            if this.queues.components.move_to_back(id) {
                log_debug!(?id, "component moved to top");
            }
        });
    }

    /// Top-level components, in processing order.
    pub fn components(&self) -> &[NodeId] {
        self.queues.components.live()
    }

    /// Whether `id` is in the top-level list.
    pub fn is_registered(&self, id: NodeId) -> bool {
        self.queues.components.contains(id)
    }

    /// Requests buffered for the next tick.
    pub fn pending_mutations(&self) -> &[PendingMutation<NodeId>] {
        self.queues.components.pending()
    }

    // --- deferred actions ---

    /// Run `action` now, or after the current pass if one is running.
    pub fn schedule(&mut self, action: impl FnOnce(&mut Self) + 'static) {
        if self.is_iterating() {
            self.queues.actions.push(action);
        } else {
            action(self);
        }
    }

    /// Number of deferred actions waiting for the next drain.
    pub fn pending_actions(&self) -> usize {
        self.queues.actions.len()
    }

    /// Whether a dispatch pass is running.
    pub fn is_iterating(&self) -> bool {
        self.queues.components.is_iterating()
    }

    // --- modal surfaces ---

    /// Show a modal surface. While any surface is live, ticks go to the
    /// surfaces instead of the components.
    pub fn show_modal(&mut self, surface: impl ModalSurface + 'static) -> ModalId {
        self.queues.modals.show(Box::new(surface))
    }

    /// Close a modal surface. Returns `false` for unknown ids.
    pub fn close_modal(&mut self, id: ModalId) -> bool {
        self.queues.modals.close(id)
    }

    /// Whether the surface `id` is live.
    pub fn is_modal_showing(&self, id: ModalId) -> bool {
        self.queues.modals.is_showing(id)
    }

    /// Whether any modal surface is live.
    pub fn is_modal_active(&self) -> bool {
        self.queues.modals.is_active()
    }

    // --- observers ---

    /// Cancelable chain fired before every tick's dispatch.
    pub fn before_tick(&mut self) -> &mut EventChain<Self, TickEvent> {
        &mut self.before_tick
    }

    /// Cancelable chain fired before a key press reaches any component.
    pub fn before_key_down(&mut self) -> &mut EventChain<Self, KeyEvent> {
        &mut self.before_key_down
    }

    /// Cancelable chain fired before a key release reaches any component.
    pub fn before_key_up(&mut self) -> &mut EventChain<Self, KeyEvent> {
        &mut self.before_key_up
    }

    /// Notified at the end of every tick that was not canceled.
    pub fn tick_handled(&mut self) -> &mut Listeners<Self, TickEvent> {
        &mut self.tick_handled
    }

    /// Notified after a key press was dispatched.
    pub fn key_down_handled(&mut self) -> &mut Listeners<Self, KeyEvent> {
        &mut self.key_down_handled
    }

    /// Notified after a key release was dispatched.
    pub fn key_up_handled(&mut self) -> &mut Listeners<Self, KeyEvent> {
        &mut self.key_up_handled
    }

    /// Whether the arbiter is in its suppressing state.
    pub fn is_suppressing(&self) -> bool {
        self.arbiter.is_suppressing()
    }

    // --- entry points ---

    /// Run one frame.
    pub fn on_tick<H: Host + ?Sized>(&mut self, host: &mut H) {
        debug_assert!(!self.is_iterating(), "on_tick called from inside a pass");
        if host.is_loading() {
            return;
        }

        self.flush();

        let mut event = TickEvent::default();
        if self.before_tick.fire(&*self, &mut event) {
            log_debug!("tick vetoed");
            return;
        }

        if self.queues.modals.is_active() {
            if self.queues.modals.process() {
                log_debug!("modal surfaces retiring");
            }
            self.tick_handled.notify(&*self, &event);
            return;
        }

        self.arbitrate(host);

        if self.demands(NodeFlags::NEEDS_VISIBLE_CURSOR) {
            host.show_cursor_this_frame();
        }

        let snapshot = host.poll_input();
        let edges = self.edges.diff(&snapshot, host.viewport());
        if !edges.is_quiet() {
            log_trace!(?edges, "input edges");
        }

        self.iterate(|this| this.visit_all(&edges));
        self.drain();

        self.tick_handled.notify(&*self, &event);
    }

    /// Dispatch a key press.
    ///
    /// Only Active components see it, that is components initialized on an
    /// earlier tick, that take input and whose start-suppression window has
    /// elapsed. Others are skipped.
    pub fn on_key_down(&mut self, event: &mut KeyEvent) {
        self.dispatch_key(KeyDirection::Down, event);
    }

    /// Dispatch a key release. Skips the same components as
    /// [`on_key_down`](Self::on_key_down).
    pub fn on_key_up(&mut self, event: &mut KeyEvent) {
        self.dispatch_key(KeyDirection::Up, event);
    }

    fn dispatch_key(&mut self, direction: KeyDirection, event: &mut KeyEvent) {
        debug_assert!(!self.is_iterating(), "key dispatch from inside a pass");
        let chain = match direction {
            KeyDirection::Down => &self.before_key_down,
            KeyDirection::Up => &self.before_key_up,
        };
        if chain.fire(&*self, event) {
            log_debug!(?event, "key vetoed");
            return;
        }

        let key: &KeyEvent = event;
        self.iterate(|this| {
            let mut index = 0;
            while let Some(&id) = this.queues.components.live().get(index) {
                index += 1;
                if this.tree.lifecycle(id) != Some(Lifecycle::Active)
                    || !this.accepts_input(id)
                {
                    continue;
                }
                match direction {
                    KeyDirection::Down => this.broadcast(id, false, |c, cx| c.key_down(cx, key)),
                    KeyDirection::Up => this.broadcast(id, false, |c, cx| c.key_up(cx, key)),
                }
            }
        });

        let listeners = match direction {
            KeyDirection::Down => &self.key_down_handled,
            KeyDirection::Up => &self.key_up_handled,
        };
        listeners.notify(&*self, event);
    }

    // --- tick internals ---

    fn flush(&mut self) {
        let tree = &self.tree;
        let pruned = self
            .queues
            .components
            .retain(|id| tree.is_alive(id) && tree.parent_of(id).is_none());
        if !pruned.is_empty() {
            log_warn!(?pruned, "dropped stale or re-parented components");
        }

        let report = self.queues.components.flush(|id| {
            tree.is_alive(id)
                && tree.parent_of(id).is_none()
                && tree.lifecycle(id) != Some(Lifecycle::Disposed)
        });
        if !report.rejected.is_empty() {
            log_warn!(rejected = ?report.rejected, "dropped buffered registrations");
        }
        for &id in &report.removed {
            self.mark_unregistered(id);
        }
        for &id in &report.added {
            self.mark_registered(id);
        }
        if !report.is_empty() {
            log_debug!(
                removed = report.removed.len(),
                added = report.added.len(),
                "applied buffered component changes"
            );
        }

        let modals = self.queues.modals.flush();
        if !modals.is_empty() {
            log_debug!(
                removed = modals.removed.len(),
                added = modals.added.len(),
                "applied buffered modal changes"
            );
        }
    }

    fn arbitrate<H: Host + ?Sized>(&mut self, host: &mut H) {
        let tree = &self.tree;
        let live = self.queues.components.live();
        let decision = self.arbiter.evaluate(|| {
            live.iter().any(|&id| {
                tree.lifecycle(id) == Some(Lifecycle::Active)
                    && tree.flags(id).is_some_and(|f| {
                        f.contains(NodeFlags::VISIBLE | NodeFlags::NEEDS_CONTROL_SUPPRESSION)
                    })
            })
        });
        match decision.transition {
            Some(Transition::Engaged) => {
                log_info!("host controls suppressed");
            }
            Some(Transition::Released) => {
                log_info!("host controls released");
            }
            None => {}
        }
        if decision.suppress {
            host.suppress_controls_this_frame();
        }
    }

    /// Whether any visible top-level component carries `flag`.
    fn demands(&self, flag: NodeFlags) -> bool {
        self.queues.components.live().iter().any(|&id| {
            self.tree
                .flags(id)
                .is_some_and(|f| f.contains(NodeFlags::VISIBLE | flag))
        })
    }

    fn visit_all(&mut self, edges: &InputEdges) {
        // Index-based: handlers may queue changes, but the list itself is
        // frozen until the next flush.
        let mut index = 0;
        while let Some(&id) = self.queues.components.live().get(index) {
            index += 1;
            self.visit(id, edges);
        }
    }

    fn visit(&mut self, id: NodeId, edges: &InputEdges) {
        match self.tree.lifecycle(id) {
            Some(Lifecycle::Active) => {}
            Some(Lifecycle::Registered | Lifecycle::Unregistered) => self.initialize(id),
            Some(Lifecycle::Disposed) | None => return,
        }

        let remaining = self.tree.start_suppression(id).unwrap_or(0);
        if remaining > 0 {
            self.tree.set_start_suppression(id, remaining - 1);
            self.broadcast(id, false, |c, cx| c.update(cx));
            self.broadcast(id, true, |c, cx| c.render(cx));
            return;
        }

        self.broadcast(id, false, |c, cx| c.update(cx));

        if self.tree.flags(id).is_some_and(NodeFlags::wants_input) {
            if edges.mouse_moved {
                let position = edges.position;
                self.broadcast(id, false, |c, cx| c.mouse_move(cx, position));
            }
            if edges.buttons_changed {
                let buttons = edges.buttons;
                self.broadcast(id, false, |c, cx| c.mouse_buttons(cx, buttons));
            }
            if let Some(direction) = edges.scroll {
                self.broadcast(id, false, |c, cx| c.mouse_scroll(cx, direction));
            }
        }

        self.broadcast(id, true, |c, cx| c.render(cx));
    }

    fn initialize(&mut self, id: NodeId) {
        self.broadcast(id, false, |c, cx| c.initialize(cx));
        self.tree.set_subtree_lifecycle(id, Lifecycle::Active);
        if self
            .tree
            .flags(id)
            .is_some_and(|f| f.contains(NodeFlags::NEEDS_STARTUP_SUPPRESSION))
        {
            self.tree
                .set_start_suppression(id, self.config.start_suppression_frames);
        }
        log_info!(?id, "component initialized");
    }

    fn drain(&mut self) {
        let batch = self.queues.actions.take();
        if batch.is_empty() {
            return;
        }
        log_debug!(count = batch.len(), "running deferred actions");
        for action in batch {
            action(self);
        }
    }

    // --- helpers ---

    fn accepts_input(&self, id: NodeId) -> bool {
        self.tree.flags(id).is_some_and(NodeFlags::wants_input)
            && self.tree.start_suppression(id) == Some(0)
    }

    fn mark_registered(&mut self, id: NodeId) {
        if self.tree.lifecycle(id) == Some(Lifecycle::Unregistered) {
            self.tree.set_lifecycle(id, Lifecycle::Registered);
        }
    }

    fn mark_unregistered(&mut self, id: NodeId) {
        if self.tree.lifecycle(id) == Some(Lifecycle::Registered) {
            self.tree.set_lifecycle(id, Lifecycle::Unregistered);
        }
    }

    /// Run `f` with the top-level list and the modal stack frozen, unless
    /// they already are.
    fn iterate(&mut self, f: impl FnOnce(&mut Self)) {
        let nested = self.queues.components.is_iterating();
        if !nested {
            self.queues.components.begin_iteration();
            self.queues.modals.begin_iteration();
        }
        f(self);
        if !nested {
            self.queues.modals.end_iteration();
            self.queues.components.end_iteration();
        }
    }

    fn broadcast(
        &mut self,
        id: NodeId,
        visible_only: bool,
        mut handler: impl FnMut(&mut dyn Component, &mut Context<'_>),
    ) {
        let queues = &mut self.queues;
        let mut visit = |v: Visit<'_, Box<dyn Component>>| {
            let mut cx = Context::new(v.id, v.position, v.flags, queues);
            handler(&mut **v.payload, &mut cx);
        };
        if visible_only {
            self.tree.broadcast_visible(id, &mut visit);
        } else {
            self.tree.broadcast(id, &mut visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Key;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};
    use kurbo::{Size, Vec2};
    use tickui_event_state::edge::{InputSnapshot, MouseButtons, ScrollDirection};

    #[derive(Copy, Clone, Debug, PartialEq)]
    enum Ev {
        Init,
        Dispose,
        KeyDown(Key),
        KeyUp(Key),
        Move(Point),
        Buttons(MouseButtons),
        Scroll(ScrollDirection),
        Update,
        Render,
    }

    type Log = Rc<RefCell<Vec<(u32, Ev)>>>;
    type Hook = Box<dyn FnMut(&mut Context<'_>)>;

    struct Recorder {
        tag: u32,
        log: Log,
        on_update: Option<Hook>,
        on_key_down: Option<Hook>,
    }

    impl Recorder {
        fn new(tag: u32, log: &Log) -> Self {
            Self {
                tag,
                log: log.clone(),
                on_update: None,
                on_key_down: None,
            }
        }

        fn on_update(mut self, hook: impl FnMut(&mut Context<'_>) + 'static) -> Self {
            self.on_update = Some(Box::new(hook));
            self
        }

        fn on_key_down(mut self, hook: impl FnMut(&mut Context<'_>) + 'static) -> Self {
            self.on_key_down = Some(Box::new(hook));
            self
        }

        fn record(&self, ev: Ev) {
            self.log.borrow_mut().push((self.tag, ev));
        }
    }

    impl Component for Recorder {
        fn initialize(&mut self, _: &mut Context<'_>) {
            self.record(Ev::Init);
        }

        fn dispose(&mut self, _: &mut Context<'_>) {
            self.record(Ev::Dispose);
        }

        fn key_down(&mut self, cx: &mut Context<'_>, event: &KeyEvent) {
            self.record(Ev::KeyDown(event.key));
            if let Some(hook) = &mut self.on_key_down {
                hook(cx);
            }
        }

        fn key_up(&mut self, _: &mut Context<'_>, event: &KeyEvent) {
            self.record(Ev::KeyUp(event.key));
        }

        fn mouse_move(&mut self, _: &mut Context<'_>, position: Point) {
            self.record(Ev::Move(position));
        }

        fn mouse_buttons(&mut self, _: &mut Context<'_>, buttons: MouseButtons) {
            self.record(Ev::Buttons(buttons));
        }

        fn mouse_scroll(&mut self, _: &mut Context<'_>, direction: ScrollDirection) {
            self.record(Ev::Scroll(direction));
        }

        fn update(&mut self, cx: &mut Context<'_>) {
            self.record(Ev::Update);
            if let Some(hook) = &mut self.on_update {
                hook(cx);
            }
        }

        fn render(&mut self, _: &mut Context<'_>) {
            self.record(Ev::Render);
        }
    }

    #[derive(Default)]
    struct TestHost {
        input: InputSnapshot,
        loading: bool,
        suppressed: bool,
        cursor: bool,
    }

    impl Host for TestHost {
        fn is_loading(&self) -> bool {
            self.loading
        }

        fn poll_input(&mut self) -> InputSnapshot {
            self.input
        }

        fn viewport(&self) -> Size {
            Size::new(200.0, 100.0)
        }

        fn suppress_controls_this_frame(&mut self) {
            self.suppressed = true;
        }

        fn show_cursor_this_frame(&mut self) {
            self.cursor = true;
        }
    }

    impl TestHost {
        /// Run one tick and report whether host controls were suppressed.
        fn tick(&mut self, controller: &mut Controller) -> bool {
            self.suppressed = false;
            self.cursor = false;
            controller.on_tick(self);
            self.suppressed
        }
    }

    fn visible() -> LocalNode {
        LocalNode {
            offset: Vec2::ZERO,
            flags: NodeFlags::VISIBLE,
        }
    }

    fn with_flags(flags: NodeFlags) -> LocalNode {
        LocalNode {
            offset: Vec2::ZERO,
            flags,
        }
    }

    fn events(log: &Log, tag: u32) -> Vec<Ev> {
        log.borrow()
            .iter()
            .filter(|(t, _)| *t == tag)
            .map(|(_, e)| *e)
            .collect()
    }

    fn is_input(ev: &Ev) -> bool {
        matches!(
            ev,
            Ev::KeyDown(_) | Ev::KeyUp(_) | Ev::Move(_) | Ev::Buttons(_) | Ev::Scroll(_)
        )
    }

    fn press(controller: &mut Controller, key: Key) -> KeyEvent {
        let mut event = KeyEvent::new(key);
        controller.on_key_down(&mut event);
        event
    }

    fn spawn(controller: &mut Controller, tag: u32, log: &Log, local: LocalNode) -> NodeId {
        let id = controller.insert(local, Recorder::new(tag, log));
        controller.register(id).unwrap();
        id
    }

    #[test]
    fn loading_host_skips_the_tick() {
        let log = Log::default();
        let mut c = Controller::new();
        let a = spawn(&mut c, 1, &log, visible());
        let mut host = TestHost {
            loading: true,
            ..TestHost::default()
        };
        host.tick(&mut c);
        assert!(log.borrow().is_empty(), "nothing runs while loading");
        assert_eq!(c.tree().lifecycle(a), Some(Lifecycle::Registered));
    }

    #[test]
    fn first_tick_initializes_lazily() {
        let log = Log::default();
        let mut c = Controller::new();
        let a = spawn(&mut c, 1, &log, visible());
        assert_eq!(c.tree().lifecycle(a), Some(Lifecycle::Registered));

        let mut host = TestHost::default();
        host.tick(&mut c);
        host.tick(&mut c);
        assert_eq!(
            events(&log, 1),
            vec![Ev::Init, Ev::Update, Ev::Render, Ev::Update, Ev::Render]
        );
        assert_eq!(c.tree().lifecycle(a), Some(Lifecycle::Active));
    }

    #[test]
    fn hidden_components_update_but_do_not_render() {
        let log = Log::default();
        let mut c = Controller::new();
        spawn(&mut c, 1, &log, LocalNode::default());
        let mut host = TestHost::default();
        host.tick(&mut c);
        assert_eq!(events(&log, 1), vec![Ev::Init, Ev::Update]);
    }

    #[test]
    fn mutations_during_a_pass_wait_for_the_next_tick() {
        let log = Log::default();
        let mut c = Controller::new();
        let b = c.insert(visible(), Recorder::new(2, &log));

        let seen_during_pass = Rc::new(Cell::new(false));
        let seen = seen_during_pass.clone();
        let once = Rc::new(Cell::new(true));
        let a = c.insert(
            visible(),
            Recorder::new(1, &log).on_update(move |cx| {
                if once.replace(false) {
                    let me = cx.id();
                    cx.register(b);
                    cx.unregister(me);
                    seen.set(cx.is_registered(me) && !cx.is_registered(b));
                }
            }),
        );
        c.register(a).unwrap();

        let mut host = TestHost::default();
        host.tick(&mut c);
        assert!(seen_during_pass.get(), "live list is frozen during the pass");
        assert_eq!(c.components(), &[a], "still unchanged after the pass");
        assert_eq!(
            c.pending_mutations(),
            &[PendingMutation::Add(b), PendingMutation::Remove(a)]
        );
        assert!(events(&log, 2).is_empty(), "b was not visited this tick");

        host.tick(&mut c);
        assert_eq!(c.components(), &[b]);
        assert_eq!(events(&log, 2), vec![Ev::Init, Ev::Update, Ev::Render]);
        assert_eq!(
            c.tree().lifecycle(a),
            Some(Lifecycle::Active),
            "unregistering does not reset initialization"
        );
    }

    #[test]
    fn before_tick_veto_skips_dispatch_but_not_the_flush() {
        let log = Log::default();
        let mut c = Controller::new();
        let a = spawn(&mut c, 1, &log, visible());
        let handled = Rc::new(Cell::new(0));
        let h = handled.clone();
        c.tick_handled()
            .subscribe(Rc::new(move |_: &Controller, _: &TickEvent| h.set(h.get() + 1)));
        c.before_tick()
            .subscribe(Rc::new(|_: &Controller, e: &mut TickEvent| e.canceled = true));

        // A buffered removal is still applied before the chain fires.
        c.queues.components.begin_iteration();
        c.queues.components.request_remove(a);
        c.queues.components.end_iteration();

        let mut host = TestHost::default();
        host.tick(&mut c);
        assert!(log.borrow().is_empty());
        assert_eq!(handled.get(), 0, "a vetoed tick is not reported as handled");
        assert!(!c.is_registered(a));
    }

    #[test]
    fn before_key_veto_keeps_keys_from_components() {
        let log = Log::default();
        let mut c = Controller::new();
        spawn(&mut c, 1, &log, visible());
        let mut host = TestHost::default();
        host.tick(&mut c);

        let notified = Rc::new(Cell::new(0));
        let n = notified.clone();
        c.key_down_handled()
            .subscribe(Rc::new(move |_: &Controller, _: &KeyEvent| n.set(n.get() + 1)));

        press(&mut c, Key::Enter);
        assert_eq!(notified.get(), 1);

        let veto: tickui_chain::Observer<Controller, KeyEvent> =
            Rc::new(|_: &Controller, e: &mut KeyEvent| {
                if e.key == Key::Escape {
                    e.handled = true;
                }
            });
        c.before_key_down().subscribe(veto);
        let event = press(&mut c, Key::Escape);
        assert!(event.handled);
        assert_eq!(notified.get(), 1, "vetoed key is not reported as handled");
        assert_eq!(
            events(&log, 1).into_iter().filter(is_input).collect::<Vec<_>>(),
            vec![Ev::KeyDown(Key::Enter)]
        );

        let mut up = KeyEvent::new(Key::Escape);
        c.on_key_up(&mut up);
        assert_eq!(events(&log, 1).last(), Some(&Ev::KeyUp(Key::Escape)));
    }

    #[test]
    fn identical_idle_snapshots_fire_no_pointer_events() {
        let log = Log::default();
        let mut c = Controller::new();
        spawn(&mut c, 1, &log, visible());
        spawn(&mut c, 2, &log, visible());
        let mut host = TestHost {
            input: InputSnapshot {
                cursor: Point::new(0.5, 0.5),
                ..InputSnapshot::default()
            },
            ..TestHost::default()
        };
        host.tick(&mut c);
        log.borrow_mut().clear();

        host.tick(&mut c);
        for tag in [1, 2] {
            assert_eq!(
                events(&log, tag),
                vec![Ev::Update, Ev::Render],
                "no pointer events without a change"
            );
        }
    }

    #[test]
    fn pointer_edges_reach_components_that_take_input() {
        let log = Log::default();
        let mut c = Controller::new();
        spawn(&mut c, 1, &log, visible());
        spawn(&mut c, 2, &log, LocalNode::default());
        spawn(&mut c, 3, &log, with_flags(NodeFlags::ALWAYS_NEEDS_INPUT));
        let mut host = TestHost::default();
        host.tick(&mut c);
        log.borrow_mut().clear();

        host.input = InputSnapshot {
            cursor: Point::new(0.5, 0.25),
            accept: 1.0,
            cancel: 1.0,
            scroll_up: 1.0,
            scroll_down: 0.5,
        };
        host.tick(&mut c);

        let expected = vec![
            Ev::Move(Point::new(100.0, 25.0)),
            Ev::Buttons(MouseButtons::LEFT | MouseButtons::RIGHT),
            Ev::Scroll(ScrollDirection::Down),
        ];
        let input = |tag| events(&log, tag).into_iter().filter(is_input).collect::<Vec<_>>();
        assert_eq!(input(1), expected);
        assert!(input(2).is_empty(), "hidden component without input demand");
        assert_eq!(input(3), expected, "hidden but always needs input");
    }

    #[test]
    fn events_reach_hidden_children_of_eligible_parents() {
        let log = Log::default();
        let mut c = Controller::new();
        let parent = spawn(&mut c, 1, &log, visible());
        c.insert_child(parent, LocalNode::default(), Recorder::new(2, &log))
            .unwrap();
        let mut host = TestHost::default();
        host.tick(&mut c);

        press(&mut c, Key::Character('x'));
        let child = events(&log, 2);
        assert_eq!(child, vec![Ev::Init, Ev::Update, Ev::KeyDown(Key::Character('x'))]);
        assert!(!child.contains(&Ev::Render), "hidden nodes do not render");
    }

    #[test]
    fn visible_grandchildren_of_hidden_children_render() {
        let log = Log::default();
        let mut c = Controller::new();
        let top = spawn(&mut c, 1, &log, visible());
        let mid = c
            .insert_child(top, LocalNode::default(), Recorder::new(2, &log))
            .unwrap();
        c.insert_child(mid, visible(), Recorder::new(3, &log)).unwrap();
        TestHost::default().tick(&mut c);

        assert_eq!(events(&log, 1), vec![Ev::Init, Ev::Update, Ev::Render]);
        assert_eq!(events(&log, 2), vec![Ev::Init, Ev::Update]);
        assert_eq!(
            events(&log, 3),
            vec![Ev::Init, Ev::Update, Ev::Render],
            "render gates on each node's own flag"
        );
    }

    #[test]
    fn children_receive_absolute_positions() {
        let log = Log::default();
        let mut c = Controller::new();
        let seen = Rc::new(Cell::new(Point::ORIGIN));
        let s = seen.clone();
        let parent = c.insert(
            LocalNode {
                offset: Vec2::new(10.0, 20.0),
                flags: NodeFlags::VISIBLE,
            },
            Recorder::new(1, &log),
        );
        let child = c
            .insert_child(
                parent,
                LocalNode {
                    offset: Vec2::new(1.0, 2.0),
                    ..LocalNode::default()
                },
                Recorder::new(2, &log).on_update(move |cx| s.set(cx.position())),
            )
            .unwrap();
        c.register(parent).unwrap();
        TestHost::default().tick(&mut c);
        assert_eq!(seen.get(), Point::new(11.0, 22.0));
        assert_eq!(c.absolute_position(child), Some(Point::new(11.0, 22.0)));
    }

    #[test]
    fn start_suppression_withholds_input_for_the_window() {
        let log = Log::default();
        let mut c =
            Controller::with_config(ControllerConfig::default().with_start_suppression_frames(5));
        let a = spawn(
            &mut c,
            1,
            &log,
            with_flags(NodeFlags::VISIBLE | NodeFlags::NEEDS_STARTUP_SUPPRESSION),
        );
        let mut host = TestHost::default();

        for tick in 1..=5_u32 {
            host.input.cursor = Point::new(f64::from(tick) / 10.0, 0.0);
            host.tick(&mut c);
            if tick < 5 {
                press(&mut c, Key::Enter);
            }
        }
        let window = events(&log, 1);
        assert_eq!(window.iter().filter(|e| **e == Ev::Update).count(), 5);
        assert_eq!(window.iter().filter(|e| **e == Ev::Render).count(), 5);
        assert!(
            !window.iter().any(is_input),
            "no input during the window: {window:?}"
        );
        assert_eq!(c.tree().start_suppression(a), Some(0));

        log.borrow_mut().clear();
        host.input.cursor = Point::new(0.6, 0.0);
        host.tick(&mut c);
        press(&mut c, Key::Enter);
        assert_eq!(
            events(&log, 1),
            vec![
                Ev::Update,
                Ev::Move(Point::new(120.0, 0.0)),
                Ev::Render,
                Ev::KeyDown(Key::Enter),
            ]
        );
    }

    #[test]
    fn keys_skip_uninitialized_components() {
        let log = Log::default();
        let mut c = Controller::new();
        spawn(&mut c, 1, &log, visible());
        press(&mut c, Key::Enter);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn deferred_actions_run_after_the_pass_and_before_tick_handled() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let log = Log::default();
        let mut c = Controller::new();

        let o = order.clone();
        let a = c.insert(
            visible(),
            Recorder::new(1, &log).on_update(move |cx| {
                o.borrow_mut().push("a-update");
                let o = o.clone();
                cx.defer(move |_| o.borrow_mut().push("deferred"));
            }),
        );
        let o = order.clone();
        let b = c.insert(
            visible(),
            Recorder::new(2, &log).on_update(move |_| o.borrow_mut().push("b-update")),
        );
        c.register(a).unwrap();
        c.register(b).unwrap();
        let o = order.clone();
        c.tick_handled()
            .subscribe(Rc::new(move |_: &Controller, _: &TickEvent| {
                o.borrow_mut().push("handled");
            }));

        TestHost::default().tick(&mut c);
        assert_eq!(
            *order.borrow(),
            vec!["a-update", "b-update", "deferred", "handled"]
        );
        assert_eq!(c.pending_actions(), 0);
    }

    #[test]
    fn scheduling_outside_a_pass_runs_inline() {
        let mut c = Controller::new();
        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        c.schedule(move |this| {
            assert!(!this.is_iterating(), "inline actions run outside a pass");
            r.set(true);
        });
        assert!(ran.get(), "ran before schedule returned");
    }

    #[test]
    fn actions_deferred_during_key_dispatch_run_on_the_next_tick() {
        let log = Log::default();
        let mut c = Controller::new();
        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        let a = c.insert(
            visible(),
            Recorder::new(2, &log).on_key_down(move |cx| {
                let r = r.clone();
                cx.defer(move |_| r.set(true));
            }),
        );
        c.register(a).unwrap();
        let mut host = TestHost::default();
        host.tick(&mut c);

        press(&mut c, Key::Tab);
        assert!(!ran.get());
        assert_eq!(c.pending_actions(), 1);
        host.tick(&mut c);
        assert!(ran.get());
    }

    #[test]
    fn suppression_engages_on_detection_and_holds_through_grace() {
        let log = Log::default();
        let grace = 3;
        let mut c = Controller::with_config(ControllerConfig::default().with_grace_frames(grace));
        let mut host = TestHost::default();
        assert!(!host.tick(&mut c), "no demand, no suppression");

        let a = spawn(
            &mut c,
            1,
            &log,
            with_flags(NodeFlags::VISIBLE | NodeFlags::NEEDS_CONTROL_SUPPRESSION),
        );
        // The component becomes active during this tick's pass, after the
        // arbiter ran.
        assert!(!host.tick(&mut c));
        assert!(host.tick(&mut c), "suppression begins the tick demand is seen");
        assert!(c.is_suppressing());
        for _ in 0..10 {
            assert!(host.tick(&mut c), "suppressed while demanded");
        }

        c.tree_mut().set_flags(a, NodeFlags::NEEDS_CONTROL_SUPPRESSION);
        assert!(host.tick(&mut c), "release tick");
        assert!(!c.is_suppressing());
        assert!(host.tick(&mut c), "arming tick");
        for n in 0..grace {
            assert!(host.tick(&mut c), "grace tick {n}");
        }
        assert!(!host.tick(&mut c), "input is allowed again");
    }

    #[test]
    fn cursor_follows_visible_demand() {
        let log = Log::default();
        let mut c = Controller::new();
        let a = spawn(
            &mut c,
            1,
            &log,
            with_flags(NodeFlags::VISIBLE | NodeFlags::NEEDS_VISIBLE_CURSOR),
        );
        let mut host = TestHost::default();
        host.tick(&mut c);
        assert!(host.cursor);
        c.tree_mut().set_flags(a, NodeFlags::NEEDS_VISIBLE_CURSOR);
        host.tick(&mut c);
        assert!(!host.cursor, "hidden components do not need the cursor");
    }

    struct Menu {
        ticks_left: Rc<Cell<u32>>,
    }

    impl ModalSurface for Menu {
        fn process(&mut self) {
            self.ticks_left.set(self.ticks_left.get().saturating_sub(1));
        }

        fn is_visible(&self) -> bool {
            self.ticks_left.get() > 0
        }
    }

    #[test]
    fn modal_surfaces_take_over_until_hidden() {
        let log = Log::default();
        let mut c = Controller::new();
        spawn(&mut c, 1, &log, visible());
        let handled = Rc::new(Cell::new(0));
        let h = handled.clone();
        c.tick_handled()
            .subscribe(Rc::new(move |_: &Controller, _: &TickEvent| h.set(h.get() + 1)));

        let ticks_left = Rc::new(Cell::new(2));
        let menu = c.show_modal(Menu {
            ticks_left: ticks_left.clone(),
        });
        assert!(c.is_modal_showing(menu));
        assert!(c.is_modal_active(), "menu is live");

        let mut host = TestHost::default();
        host.tick(&mut c);
        host.tick(&mut c);
        assert_eq!(ticks_left.get(), 0);
        assert!(log.borrow().is_empty(), "components wait while a modal is live");
        assert_eq!(handled.get(), 2);

        host.tick(&mut c);
        assert!(!c.is_modal_showing(menu), "retired at the flush");
        assert_eq!(events(&log, 1), vec![Ev::Init, Ev::Update, Ev::Render]);
    }

    #[test]
    fn modal_shown_from_a_handler_starts_next_tick() {
        let log = Log::default();
        let mut c = Controller::new();
        let ticks_left = Rc::new(Cell::new(1));
        let t = ticks_left.clone();
        let once = Rc::new(Cell::new(true));
        let a = c.insert(
            visible(),
            Recorder::new(1, &log).on_update(move |cx| {
                if once.replace(false) {
                    cx.show_modal(Menu {
                        ticks_left: t.clone(),
                    });
                }
            }),
        );
        c.register(a).unwrap();
        let mut host = TestHost::default();
        host.tick(&mut c);
        assert_eq!(ticks_left.get(), 1, "not processed during the opening tick");
        log.borrow_mut().clear();

        host.tick(&mut c);
        assert_eq!(ticks_left.get(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn modal_shown_during_key_dispatch_waits_for_the_flush() {
        let log = Log::default();
        let mut c = Controller::new();
        let shown = Rc::new(Cell::new(None));
        let s = shown.clone();
        let ticks_left = Rc::new(Cell::new(1));
        let t = ticks_left.clone();
        let a = c.insert(
            visible(),
            Recorder::new(1, &log).on_key_down(move |cx| {
                s.set(Some(cx.show_modal(Menu {
                    ticks_left: t.clone(),
                })));
            }),
        );
        c.register(a).unwrap();
        let mut host = TestHost::default();
        host.tick(&mut c);

        press(&mut c, Key::Enter);
        let menu = shown.get().unwrap();
        assert!(!c.is_modal_showing(menu), "buffered until the next flush");
        assert!(!c.is_modal_active());

        log.borrow_mut().clear();
        host.tick(&mut c);
        assert!(c.is_modal_showing(menu));
        assert_eq!(ticks_left.get(), 0, "processed on the tick it went live");
        assert!(log.borrow().is_empty(), "components wait while a modal is live");
    }

    #[test]
    fn dispose_from_a_handler_is_deferred_and_frees_the_subtree() {
        let log = Log::default();
        let mut c = Controller::new();
        let a = c.insert(
            visible(),
            Recorder::new(1, &log).on_key_down(|cx| {
                let me = cx.id();
                cx.dispose(me);
            }),
        );
        let child = c
            .insert_child(a, LocalNode::default(), Recorder::new(2, &log))
            .unwrap();
        c.register(a).unwrap();
        let mut host = TestHost::default();
        host.tick(&mut c);

        press(&mut c, Key::Escape);
        assert!(c.tree().is_alive(a), "disposal waits for the next drain");

        host.tick(&mut c);
        assert!(!c.tree().is_alive(a));
        assert!(!c.tree().is_alive(child));
        assert!(!c.is_registered(a));
        assert_eq!(events(&log, 1).last(), Some(&Ev::Dispose));
        assert_eq!(events(&log, 2).last(), Some(&Ev::Dispose));
        let disposed = || -> Vec<u32> {
            log.borrow()
                .iter()
                .filter(|(_, e)| *e == Ev::Dispose)
                .map(|(t, _)| *t)
                .collect()
        };
        assert_eq!(disposed(), vec![1, 2], "parents are disposed first");

        c.dispose(a);
        assert_eq!(disposed().len(), 2, "stale ids are ignored");
    }

    #[test]
    fn topmost_moves_to_the_end_of_the_list() {
        let log = Log::default();
        let mut c = Controller::new();
        let a = spawn(&mut c, 1, &log, visible());
        let b = c.insert(
            visible(),
            Recorder::new(2, &log).on_key_down(move |cx| cx.set_topmost(a)),
        );
        c.register(b).unwrap();
        let mut host = TestHost::default();
        host.tick(&mut c);
        assert_eq!(c.components(), &[a, b]);

        press(&mut c, Key::Enter);
        host.tick(&mut c);
        assert_eq!(c.components(), &[b, a]);

        c.set_topmost(b);
        assert_eq!(c.components(), &[a, b], "host calls apply inline");
    }

    #[test]
    fn spawn_from_a_handler_registers_after_the_pass() {
        let log = Log::default();
        let mut c = Controller::new();
        let inner = log.clone();
        let once = Rc::new(Cell::new(true));
        let b = c.insert(
            visible(),
            Recorder::new(2, &log).on_update(move |cx| {
                if once.replace(false) {
                    cx.spawn(visible(), Recorder::new(3, &inner));
                }
            }),
        );
        c.register(b).unwrap();
        let mut host = TestHost::default();
        host.tick(&mut c);
        assert_eq!(c.components().len(), 2, "registered by the drain");
        assert!(events(&log, 3).is_empty());
        host.tick(&mut c);
        assert_eq!(events(&log, 3), vec![Ev::Init, Ev::Update, Ev::Render]);
    }

    #[test]
    fn registration_errors() {
        let log = Log::default();
        let mut c = Controller::new();
        let a = spawn(&mut c, 1, &log, visible());
        let child = c
            .insert_child(a, LocalNode::default(), Recorder::new(2, &log))
            .unwrap();
        assert_eq!(c.register(a), Err(ControllerError::AlreadyRegistered(a)));
        assert_eq!(c.register(child), Err(ControllerError::HasParent(child)));
        let loose = c.insert(LocalNode::default(), Recorder::new(3, &log));
        assert_eq!(c.unregister(loose), Err(ControllerError::NotRegistered(loose)));
        assert_eq!(c.add_child(loose, a), Err(ControllerError::AlreadyRegistered(a)));

        c.dispose(loose);
        assert_eq!(c.register(loose), Err(ControllerError::StaleNode(loose)));

        c.unregister(a).unwrap();
        assert_eq!(c.tree().lifecycle(a), Some(Lifecycle::Unregistered));
    }

    #[test]
    fn children_attached_to_active_parents_are_initialized() {
        let log = Log::default();
        let mut c = Controller::new();
        let a = spawn(&mut c, 1, &log, visible());
        TestHost::default().tick(&mut c);
        let late = c.insert(LocalNode::default(), Recorder::new(2, &log));
        c.add_child(a, late).unwrap();
        assert_eq!(events(&log, 2), vec![Ev::Init]);
        assert_eq!(c.tree().lifecycle(late), Some(Lifecycle::Active));
    }

    #[test]
    fn nodes_removed_behind_the_controllers_back_are_pruned() {
        let log = Log::default();
        let mut c = Controller::new();
        let a = spawn(&mut c, 1, &log, visible());
        c.tree_mut().remove(a);
        TestHost::default().tick(&mut c);
        assert!(c.components().is_empty());
    }
}
