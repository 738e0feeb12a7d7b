// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge detection for polled input.
//!
//! Hosts that poll their input devices every frame hand over a level-sampled
//! [`InputSnapshot`]: the cursor position and a pressure value per button.
//! [`InputEdgeDetector`] diffs each snapshot against the previous one and
//! reports which pointer events actually happened this frame.
//!
//! ## Usage
//!
//! ```
//! use kurbo::{Point, Size};
//! use tickui_event_state::edge::{InputEdgeDetector, InputSnapshot, MouseButtons};
//!
//! let mut detector = InputEdgeDetector::new();
//! let viewport = Size::new(1920.0, 1080.0);
//!
//! // First frame: the cursor sits at the center and nothing is pressed.
//! let idle = InputSnapshot { cursor: Point::new(0.5, 0.5), ..InputSnapshot::default() };
//! let edges = detector.diff(&idle, viewport);
//! assert!(edges.mouse_moved);
//! assert_eq!(edges.position, Point::new(960.0, 540.0));
//!
//! // Second frame: same position, accept fully pressed.
//! let press = InputSnapshot { accept: 1.0, ..idle };
//! let edges = detector.diff(&press, viewport);
//! assert!(!edges.mouse_moved);
//! assert!(edges.buttons_changed);
//! assert_eq!(edges.buttons, MouseButtons::LEFT);
//!
//! // Third frame: nothing changed, nothing to report.
//! assert!(detector.diff(&press, viewport).is_quiet());
//! ```
//!
//! ## Rules
//!
//! 1. **Move**: the scaled cursor position differs from last frame's.
//! 2. **Buttons**: either raw pressure differs from last frame's. The reported
//!    set is computed from the current pressures: both pressed gives
//!    `LEFT | RIGHT`, never an arbitrary tie-break.
//! 3. **Scroll**: level-triggered; any nonzero scroll pressure scrolls. Down
//!    wins when both directions are nonzero.
//!
//! The detector keeps exactly one frame of history.

use kurbo::{Point, Size};

bitflags::bitflags! {
    /// Discrete pointer button set. The empty set means no button is pressed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MouseButtons: u8 {
        /// Primary button (accept).
        const LEFT  = 0b01;
        /// Secondary button (cancel).
        const RIGHT = 0b10;
    }
}

impl Default for MouseButtons {
    fn default() -> Self {
        Self::empty()
    }
}

/// Direction of a scroll step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    /// Scroll toward the top.
    Up,
    /// Scroll toward the bottom.
    Down,
}

/// One frame of polled input, as reported by the host.
///
/// `cursor` is normalized to `0.0..=1.0` on both axes; it is scaled by the
/// viewport during [`InputEdgeDetector::diff`]. Pressures are normalized too.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    /// Normalized cursor position.
    pub cursor: Point,
    /// Accept (primary button) pressure.
    pub accept: f32,
    /// Cancel (secondary button) pressure.
    pub cancel: f32,
    /// Scroll-up pressure.
    pub scroll_up: f32,
    /// Scroll-down pressure.
    pub scroll_down: f32,
}

/// Result of diffing one snapshot against the previous frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InputEdges {
    /// Cursor position in viewport coordinates.
    pub position: Point,
    /// The cursor moved since last frame.
    pub mouse_moved: bool,
    /// Either button pressure changed since last frame.
    pub buttons_changed: bool,
    /// Buttons currently pressed.
    pub buttons: MouseButtons,
    /// Scroll direction, if scrolling this frame.
    pub scroll: Option<ScrollDirection>,
}

impl InputEdges {
    /// Returns `true` if no pointer event needs to be dispatched this frame.
    pub fn is_quiet(&self) -> bool {
        !self.mouse_moved && !self.buttons_changed && self.scroll.is_none()
    }
}

/// Converts polled input into edge-triggered pointer events.
#[derive(Clone, Debug)]
pub struct InputEdgeDetector {
    previous_position: Point,
    previous_accept: f32,
    previous_cancel: f32,
    /// Pressure at or above which a button counts as pressed.
    pub press_threshold: f32,
}

impl Default for InputEdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl InputEdgeDetector {
    /// Default press threshold: a button must be fully pressed.
    pub const DEFAULT_PRESS_THRESHOLD: f32 = 1.0;

    /// Create a detector whose previous frame is "cursor at the origin,
    /// nothing pressed".
    pub fn new() -> Self {
        Self::with_press_threshold(Self::DEFAULT_PRESS_THRESHOLD)
    }

    /// Create a detector with a custom press threshold.
    pub fn with_press_threshold(press_threshold: f32) -> Self {
        Self {
            previous_position: Point::ORIGIN,
            previous_accept: 0.0,
            previous_cancel: 0.0,
            press_threshold,
        }
    }

    /// Diff `snapshot` against the previous frame and remember it.
    pub fn diff(&mut self, snapshot: &InputSnapshot, viewport: Size) -> InputEdges {
        let position = Point::new(
            viewport.width * snapshot.cursor.x,
            viewport.height * snapshot.cursor.y,
        );
        let mouse_moved = position != self.previous_position;
        let buttons_changed =
            snapshot.accept != self.previous_accept || snapshot.cancel != self.previous_cancel;

        let mut buttons = MouseButtons::empty();
        if snapshot.accept >= self.press_threshold {
            buttons |= MouseButtons::LEFT;
        }
        if snapshot.cancel >= self.press_threshold {
            buttons |= MouseButtons::RIGHT;
        }

        let scroll = if snapshot.scroll_down > 0.0 {
            Some(ScrollDirection::Down)
        } else if snapshot.scroll_up > 0.0 {
            Some(ScrollDirection::Up)
        } else {
            None
        };

        self.previous_position = position;
        self.previous_accept = snapshot.accept;
        self.previous_cancel = snapshot.cancel;

        InputEdges {
            position,
            mouse_moved,
            buttons_changed,
            buttons,
            scroll,
        }
    }

    /// The last cursor position seen, in viewport coordinates.
    pub fn last_position(&self) -> Point {
        self.previous_position
    }
}
