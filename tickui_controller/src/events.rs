// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event payloads for the controller's tick and key entry points.

use tickui_chain::Cancelable;

bitflags::bitflags! {
    /// Modifier keys held while a key event was generated.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Either shift key.
        const SHIFT   = 0b0001;
        /// Either control key.
        const CONTROL = 0b0010;
        /// Either alt key.
        const ALT     = 0b0100;
        /// The platform meta key.
        const META    = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::empty()
    }
}

/// A logical key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A key producing a character.
    Character(char),
    /// Enter / return.
    Enter,
    /// Escape.
    Escape,
    /// Backspace.
    Backspace,
    /// Tab.
    Tab,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Any other key, by host key code.
    Code(u32),
}

/// A key press or release delivered by the host.
///
/// `handled` doubles as the cancel flag of the before-key chains: an observer
/// that sets it keeps the key away from every component.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key.
    pub key: Key,
    /// Modifiers held at the time of the event.
    pub modifiers: Modifiers,
    /// Set by an observer to stop dispatch.
    pub handled: bool,
}

impl KeyEvent {
    /// An unhandled event for `key` with no modifiers.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
            handled: false,
        }
    }

    /// Attach modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl Cancelable for KeyEvent {
    fn is_canceled(&self) -> bool {
        self.handled
    }
}

/// Payload of the before-tick chain and the tick-handled notification.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickEvent {
    /// Set by an observer to skip component dispatch for this tick.
    pub canceled: bool,
}

impl Cancelable for TickEvent {
    fn is_canceled(&self) -> bool {
        self.canceled
    }
}
