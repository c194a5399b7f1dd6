//! # GemClaw Core
//!
//! Shared building blocks for the hybrid inventory / policy assistant:
//! configuration, the error type, message types, and the traits that the
//! provider, inventory, knowledge and agent crates plug into.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::GemClawConfig;
pub use error::{GemClawError, Result};
