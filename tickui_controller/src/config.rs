// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Controller tuning knobs.

use tickui_event_state::arbiter::ControlArbiter;
use tickui_event_state::edge::InputEdgeDetector;

/// Frame counts and thresholds used by a [`Controller`](crate::Controller).
///
/// All values are fixed for the lifetime of the controller.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Length of the forced-suppression window armed after every change of
    /// aggregate control-suppression demand.
    pub grace_frames: u32,
    /// Ticks during which a freshly initialized component flagged
    /// `NEEDS_STARTUP_SUPPRESSION` receives updates but no input.
    pub start_suppression_frames: u32,
    /// Pressure at or above which a pointer button counts as pressed.
    pub press_threshold: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            grace_frames: ControlArbiter::DEFAULT_GRACE_FRAMES,
            start_suppression_frames: Self::DEFAULT_START_SUPPRESSION_FRAMES,
            press_threshold: InputEdgeDetector::DEFAULT_PRESS_THRESHOLD,
        }
    }
}

impl ControllerConfig {
    /// Default length of the start-suppression window, in ticks.
    pub const DEFAULT_START_SUPPRESSION_FRAMES: u32 = 20;

    /// Set [`grace_frames`](Self::grace_frames).
    #[must_use]
    pub fn with_grace_frames(mut self, frames: u32) -> Self {
        self.grace_frames = frames;
        self
    }

    /// Set [`start_suppression_frames`](Self::start_suppression_frames).
    #[must_use]
    pub fn with_start_suppression_frames(mut self, frames: u32) -> Self {
        self.start_suppression_frames = frames;
        self
    }

    /// Set [`press_threshold`](Self::press_threshold).
    #[must_use]
    pub fn with_press_threshold(mut self, threshold: f32) -> Self {
        self.press_threshold = threshold;
        self
    }
}
