//! Safe core layer over the raw OpenCL C API.
//!
//! Opaque native handles are wrapped in kind-tagged managed objects
//! ([`Handle`]), every native status code is translated through
//! [`error::check`] before its output is used, and the generic size-probe /
//! fetch info-query protocol lives in [`info`] so that each accessor on the
//! object facades is a one-line specialization.
//!
//! The layer itself is synchronous: asynchronous completion is observed by
//! polling [`Event::command_execution_status`] or by registering a callback
//! that the native runtime fires on a thread it owns.

// ─── Feature-Module ───────────────────────────────────────────────────
#[cfg(feature = "metrics")]
mod metrics;
#[cfg(feature = "metrics")]
pub use metrics::*;

// ─── Core ─────────────────────────────────────────────────────────────
mod callback;
pub mod error;
mod gl;
mod handle;
pub mod info;

// ─── Object facades ───────────────────────────────────────────────────
mod buffer;
mod context;
mod device;
mod event;
mod platform;
mod queue;

pub use buffer::{Buffer, BufferRegion, combine_flags};
pub use context::Context;
pub use device::Device;
pub use error::{ClError, Result, check};
pub use event::{CommandExecutionStatus, Event};
pub use gl::{GlSync, GlUint};
pub use handle::{Handle, Kind};
pub use platform::{Platform, Version};
pub use queue::CommandQueue;

/// Checks a raw OpenCL status in place.
macro_rules! cl_try {
    ($expr:expr) => {
        crate::error::check(unsafe { $expr })?
    };
}
pub(crate) use cl_try;
