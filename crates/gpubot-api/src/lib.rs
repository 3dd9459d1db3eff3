//! # gpubot-api
//!
//! Session-aware HTTP client for the AutoDL API.
//!
//! The client holds one account's credentials and one mutable bearer token
//! whose validity is unknown until used: it authenticates lazily, detects
//! the service's authorization-failure sentinel, and re-authenticates with a
//! single bounded retry.

pub mod client;
pub mod errors;
pub mod token;

// Re-export common types for convenience
pub use client::AutodlClient;
pub use errors::{ApiError, Result};
pub use token::TokenHolder;

// Re-export core types that API consumers will need
pub use gpubot_core::{Credentials, Instance};
