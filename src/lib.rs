//! # gpubot
//!
//! Chat-driven remote control for AutoDL GPU instances: a command
//! dispatcher, a per-user credential registry, and an INI-backed credential
//! store wired around the session-aware client in `gpubot-api`.

pub mod bot;
pub mod errors;
pub mod registry;
pub mod storage;

pub use bot::Bot;
pub use errors::{BotError, ConfigError, Result};
pub use registry::ConfigRegistry;
pub use storage::UserStore;
