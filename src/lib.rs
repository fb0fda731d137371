//! SCRY - Live game-state HTTP bridge library
//!
//! Re-exports all modules for use by binary targets.

// Core engine (client state, invocation bridge, client loop)
pub mod core;

// App modules
pub mod cli;
pub mod config;
pub mod entities;
pub mod server;

// Re-export commonly used types from core
pub use crate::core::client::Client;
pub use crate::core::invoke::{ClientHandle, InvokeError, DEFAULT_REPLY_TIMEOUT};
pub use crate::core::runtime::{ClientRuntime, StopHandle};

// Re-export entities
pub use entities::{Item, ItemContainer, Skill, SkillStat};

// Re-export the API server
pub use server::ApiServer;
