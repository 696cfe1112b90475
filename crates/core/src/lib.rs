//! Shared foundation for the strider cache layer
//!
//! This crate holds the pieces every other cache crate depends on:
//! - The workspace-wide error taxonomy ([`Error`], [`Result`])
//! - Environment-derived policy signals ([`signals::EnvSignals`]): CI
//!   detection and remote-cache overrides, resolved once at startup and
//!   passed by value instead of re-read per call.

mod error;
pub mod signals;

// Re-export error types at crate root
pub use error::{Error, Result};
pub use signals::EnvSignals;
