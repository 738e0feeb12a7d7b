// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host side of a tick.

use kurbo::Size;
use tickui_event_state::edge::InputSnapshot;

/// The application embedding the controller, queried once per tick.
///
/// Imperatives such as [`suppress_controls_this_frame`](Host::suppress_controls_this_frame)
/// only last for the current frame; the controller re-asserts them on every
/// tick they are needed.
pub trait Host {
    /// Whether the host is mid-load. Ticks are skipped entirely while it is.
    fn is_loading(&self) -> bool {
        false
    }

    /// Poll the pointer devices. Values are normalized.
    fn poll_input(&mut self) -> InputSnapshot;

    /// Size of the screen; normalized cursor coordinates are scaled by it.
    fn viewport(&self) -> Size;

    /// Block all of the host's own input processing for this frame.
    fn suppress_controls_this_frame(&mut self);

    /// Show the pointer cursor for this frame.
    fn show_cursor_this_frame(&mut self) {}
}
