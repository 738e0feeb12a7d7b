// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tickui Controller: frame-synchronized coordination of a UI component tree.
//!
//! A host with per-frame `tick`, `key down` and `key up` callbacks owns one
//! [`Controller`] and forwards those callbacks to it. The controller keeps a
//! flat list of top-level components (each the root of a subtree in a
//! [`Tree`](tickui_tree::Tree)), and every tick it:
//!
//! - applies the structural changes requested since the last tick
//!   ([`mutation::MutationBuffer`]),
//! - gives observers a chance to veto ([`tickui_chain::EventChain`]),
//! - decides whether host controls are suppressed
//!   ([`tickui_event_state::arbiter::ControlArbiter`]),
//! - turns polled input into pointer edges
//!   ([`tickui_event_state::edge::InputEdgeDetector`]),
//! - updates, feeds and renders the components,
//! - and finally runs the actions deferred during the pass
//!   ([`deferred::DeferredActionQueue`]).
//!
//! Components implement [`Component`] and act on the controller only through
//! the [`Context`] passed to their handlers. Requests made there never touch
//! the list that is being iterated.
//!
//! ## Example
//!
//! ```
//! use kurbo::Size;
//! use tickui_controller::{Component, Context, Controller, Host, KeyEvent, Key};
//! use tickui_event_state::edge::InputSnapshot;
//! use tickui_tree::{LocalNode, NodeFlags};
//!
//! struct Counter(u32);
//!
//! impl Component for Counter {
//!     fn key_down(&mut self, cx: &mut Context<'_>, event: &KeyEvent) {
//!         if event.key == Key::Escape {
//!             let me = cx.id();
//!             cx.dispose(me);
//!         }
//!     }
//!
//!     fn render(&mut self, _: &mut Context<'_>) {
//!         self.0 += 1;
//!     }
//! }
//!
//! struct Screen;
//!
//! impl Host for Screen {
//!     fn poll_input(&mut self) -> InputSnapshot {
//!         InputSnapshot::default()
//!     }
//!     fn viewport(&self) -> Size {
//!         Size::new(1280.0, 720.0)
//!     }
//!     fn suppress_controls_this_frame(&mut self) {}
//! }
//!
//! let mut controller = Controller::new();
//! let local = LocalNode { flags: NodeFlags::VISIBLE, ..LocalNode::default() };
//! let id = controller.insert(local, Counter(0));
//! controller.register(id).unwrap();
//!
//! let mut host = Screen;
//! controller.on_tick(&mut host);
//! assert!(controller.is_registered(id));
//!
//! // Escape disposes the component at the end of the next tick.
//! controller.on_key_down(&mut KeyEvent::new(Key::Escape));
//! controller.on_tick(&mut host);
//! assert!(!controller.tree().is_alive(id));
//! ```
//!
//! ## Features
//!
//! - `std` *(default)* / `libm`: forwarded to `kurbo`.
//! - `tracing`: structured logs of lifecycle transitions, flushes and
//!   suppression changes.
//! - `serde`: `Serialize`/`Deserialize` for [`ControllerConfig`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod component;
mod config;
mod controller;
mod error;
mod events;
mod host;
mod logging;

pub mod deferred;
pub mod modal;
pub mod mutation;

pub use component::{Component, Context};
pub use config::ControllerConfig;
pub use controller::Controller;
pub use error::ControllerError;
pub use events::{Key, KeyEvent, Modifiers, TickEvent};
pub use host::Host;
pub use modal::{ModalId, ModalSurface};
