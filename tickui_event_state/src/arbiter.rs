// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debounced arbitration of host control suppression.
//!
//! Components can demand that the host stop processing its own input while
//! they are visible (a text field must not also move the player). The host
//! exposes this as a per-frame imperative: it has to be asserted again on every
//! frame it is needed. [`ControlArbiter`] turns the aggregate demand of all
//! visible components into that per-frame decision.
//!
//! Whenever the demand flips, in either direction, the following frame opens a
//! grace window of [`ControlArbiter::grace_frames`] frames during which
//! suppression is forced regardless of demand. Host input buffered while the UI
//! owned the controls is flushed during that window instead of leaking into
//! the host.
//!
//! ```
//! use tickui_event_state::arbiter::{ControlArbiter, Transition};
//!
//! let mut arbiter = ControlArbiter::with_grace_frames(2);
//!
//! // Demand appears: suppression starts on the same frame.
//! let d = arbiter.evaluate(|| true);
//! assert!(d.suppress);
//! assert_eq!(d.transition, Some(Transition::Engaged));
//!
//! // Demand goes away: released, but this frame is still suppressed.
//! let d = arbiter.evaluate(|| false);
//! assert!(d.suppress);
//! assert_eq!(d.transition, Some(Transition::Released));
//!
//! // The release arms the grace window, which then runs down.
//! assert!(arbiter.evaluate(|| false).suppress); // arms
//! assert!(arbiter.evaluate(|| false).suppress); // 2 → 1
//! assert!(arbiter.evaluate(|| false).suppress); // 1 → 0
//! assert!(!arbiter.evaluate(|| false).suppress);
//! ```

/// A change of the suppression state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Suppression started because some visible component demands it.
    Engaged,
    /// Suppression ended because no visible component demands it anymore.
    Released,
}

/// Outcome of one frame of arbitration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArbiterDecision {
    /// Host input must be suppressed for this frame.
    pub suppress: bool,
    /// The suppression state changed during this frame.
    pub transition: Option<Transition>,
}

/// Debounced suppression state machine, evaluated once per frame.
#[derive(Clone, Debug)]
pub struct ControlArbiter {
    suppressing: bool,
    pending_grace_frames: u32,
    transitioned_last_tick: bool,
    grace_frames: u32,
}

impl Default for ControlArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlArbiter {
    /// Default length of the grace window, in frames.
    pub const DEFAULT_GRACE_FRAMES: u32 = 20;

    /// Create an idle arbiter with the default grace window.
    pub fn new() -> Self {
        Self::with_grace_frames(Self::DEFAULT_GRACE_FRAMES)
    }

    /// Create an idle arbiter with a custom grace window.
    pub fn with_grace_frames(grace_frames: u32) -> Self {
        Self {
            suppressing: false,
            pending_grace_frames: 0,
            transitioned_last_tick: false,
            grace_frames,
        }
    }

    /// Run one frame of arbitration.
    ///
    /// `demand` reports whether any visible, active component needs control
    /// suppression. It is not called while a grace window is counting down.
    ///
    /// Order of evaluation:
    /// 1. A running grace window counts down one frame and forces suppression;
    ///    nothing else is evaluated.
    /// 2. If the state flipped on the previous frame, the grace window is armed.
    /// 3. Suppression is forced while the state is suppressing or a window is armed.
    /// 4. The demand is sampled and a flip in either direction is recorded.
    ///    Engaging also suppresses the current frame.
    ///
    /// That last clause goes past a plain reading of the step order, where
    /// step 3 runs before the demand is sampled: the host never sees input on
    /// the frame a demand first appears.
    pub fn evaluate(&mut self, demand: impl FnOnce() -> bool) -> ArbiterDecision {
        if self.pending_grace_frames > 0 {
            self.pending_grace_frames -= 1;
            return ArbiterDecision {
                suppress: true,
                transition: None,
            };
        }

        if self.transitioned_last_tick {
            self.pending_grace_frames = self.grace_frames;
            self.transitioned_last_tick = false;
        }

        let mut suppress = self.suppressing || self.pending_grace_frames > 0;

        let demand = demand();
        let transition = if demand && !self.suppressing {
            Some(Transition::Engaged)
        } else if !demand && self.suppressing {
            Some(Transition::Released)
        } else {
            None
        };
        if transition.is_some() {
            // Both directions arm the same debounce on the next frame.
            self.suppressing = demand;
            self.transitioned_last_tick = true;
            self.pending_grace_frames = 0;
        }
        suppress |= self.suppressing;

        ArbiterDecision {
            suppress,
            transition,
        }
    }

    /// Whether the arbiter is in the suppressing state (independent of grace).
    pub fn is_suppressing(&self) -> bool {
        self.suppressing
    }

    /// Frames left in the current grace window.
    pub fn pending_grace_frames(&self) -> u32 {
        self.pending_grace_frames
    }

    /// Whether the state flipped on the most recent evaluation.
    pub fn transitioned_last_tick(&self) -> bool {
        self.transitioned_last_tick
    }

    /// Configured grace window length.
    pub fn grace_frames(&self) -> u32 {
        self.grace_frames
    }
}
