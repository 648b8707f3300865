#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! Re-exports `tracing` macros when the `tracing` feature is enabled. When
//! the feature is disabled, no-op macros with the same names are provided so
//! call sites compile unchanged.

#[cfg(feature = "tracing")]
pub use tracing::{debug, info, trace, warn};

#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
mod noop {
    macro_rules! debug {
        ($($arg:tt)*) => {{}};
    }

    macro_rules! info {
        ($($arg:tt)*) => {{}};
    }

    macro_rules! trace {
        ($($arg:tt)*) => {{}};
    }

    macro_rules! warn_ {
        ($($arg:tt)*) => {{}};
    }

    pub(crate) use {debug, info, trace, warn_ as warn};
}

#[cfg(not(feature = "tracing"))]
#[allow(unused_imports)]
pub(crate) use noop::{debug, info, trace, warn};
