// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tickui Chain: ordered observer chains for frame events.
//!
//! ## Overview
//!
//! Two observer containers live here:
//!
//! - [`EventChain`]: a veto point. Observers run in subscription order and the
//!   first one that marks the event canceled stops the firing. The caller learns
//!   whether the event was canceled and can skip its own work.
//! - [`Listeners`]: an informational notification. Every listener runs and none
//!   of them can influence the caller.
//!
//! Both containers are de-duplicated by observer identity: subscribing the same
//! [`Rc`](alloc::rc::Rc) twice is a no-op, and unsubscribing an observer that is
//! not present is a no-op as well.
//!
//! ## Cancelation
//!
//! Cancelation is cooperative and lives on the event payload through the
//! [`Cancelable`] trait. It is scoped to a single firing: the chain keeps no
//! state between firings, so a fresh event passes through all observers again.
//!
//! ```
//! use std::rc::Rc;
//! use tickui_chain::{Cancelable, EventChain, Observer};
//!
//! #[derive(Default)]
//! struct Ev { canceled: bool, seen: Vec<u32> }
//! impl Cancelable for Ev {
//!     fn is_canceled(&self) -> bool { self.canceled }
//! }
//!
//! let mut chain: EventChain<(), Ev> = EventChain::new();
//! let a: Observer<(), Ev> = Rc::new(|_: &(), e: &mut Ev| e.seen.push(1));
//! let b: Observer<(), Ev> = Rc::new(|_: &(), e: &mut Ev| { e.seen.push(2); e.canceled = true; });
//! let c: Observer<(), Ev> = Rc::new(|_: &(), e: &mut Ev| e.seen.push(3));
//! chain.subscribe(a);
//! chain.subscribe(b);
//! chain.subscribe(c);
//!
//! let mut ev = Ev::default();
//! assert!(chain.fire(&(), &mut ev));
//! assert_eq!(ev.seen, vec![1, 2]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod chain;
mod listeners;

pub use chain::{Cancelable, EventChain, Observer};
pub use listeners::{Listener, Listeners};
