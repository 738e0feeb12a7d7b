// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tickui Event State: small per-frame state machines for input handling.
//!
//! - [`edge`]: turns polled, level-sampled input into pointer edges
//!   (moved, buttons changed, scrolled) with one frame of history.
//! - [`arbiter`]: decides, once per frame, whether host controls must be
//!   suppressed, debouncing every change with a grace window.
//!
//! Both machines are pure: they own no callbacks and do not talk to the host.
//! The caller feeds them once per frame and acts on what they return.
//!
//! This crate is `no_std`.

#![no_std]

#[cfg(test)]
extern crate alloc;

pub mod arbiter;
pub mod edge;
