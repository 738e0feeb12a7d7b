// Copyright 2025 the Tickui Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logging support.
//!
//! Re-exports the `tracing` macros when the `tracing` feature is enabled and
//! provides no-op stand-ins otherwise, so call sites never need `cfg` gates.
//!
//! The macros carry a `log_` prefix: a crate-local `warn` would clash with the
//! built-in `#[warn]` attribute.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{
    debug as log_debug, info as log_info, trace as log_trace, warn as log_warn,
};

#[cfg(not(feature = "tracing"))]
mod noop {
    macro_rules! log_debug {
        ($($arg:tt)*) => {};
    }

    macro_rules! log_info {
        ($($arg:tt)*) => {};
    }

    macro_rules! log_trace {
        ($($arg:tt)*) => {};
    }

    macro_rules! log_warn {
        ($($arg:tt)*) => {};
    }

    pub(crate) use {log_debug, log_info, log_trace, log_warn};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop::{log_debug, log_info, log_trace, log_warn};
