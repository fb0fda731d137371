//! Core engine modules - client state, invocation bridge, client loop
//!
//! These modules form the simulation side of the system, independent of
//! the HTTP layer.

pub mod client;
pub mod invoke;
pub mod runtime;

// Re-exports for convenience
pub use client::Client;
pub use invoke::{ClientHandle, InvokeError, ScheduledJob, DEFAULT_REPLY_TIMEOUT};
pub use runtime::{ClientRuntime, StopHandle};
