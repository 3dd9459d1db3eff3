//! # gpubot-utils
//!
//! Infrastructure helpers for gpubot: password hashing and the formatting
//! used by the GPU status report.

pub mod formatters;
pub mod hash;

// Re-export common helpers for convenience
pub use formatters::{format_duration, format_release, render_status_report, RELEASE_GRACE_DAYS};
pub use hash::hash_password;
