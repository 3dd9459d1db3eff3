//! # gpubot-core
//!
//! Core domain logic for gpubot, a chat-driven remote control for AutoDL
//! GPU instances.
//!
//! This crate contains pure domain types with no I/O dependencies:
//! - Wire models for the AutoDL API (requests and responses)
//! - Credentials as stored and transmitted (digest form only)

pub mod models;

// Re-export commonly used types
pub use models::{
    Credentials, Instance, InstanceRequest, InstanceResponse, LoginRequest, LoginResponse,
    PassportRequest, PassportResponse, PowerRequest, PowerResponse, StoppedAt, WalletResponse,
    CODE_AUTHORIZE_FAILED, CODE_SUCCESS,
};
