//! # Dayline Common
//!
//! Reusable utilities shared across the workspace:
//! - AES-256-GCM encryption primitives ([`crypto`])
//! - OAuth 2.0 PKCE helpers and token types ([`auth`])
//! - SQLite connection pooling ([`storage`])
//! - Common error types ([`error`])
//!
//! This crate has no knowledge of the domain model; it only provides
//! mechanisms the other crates build on.

pub mod auth;
pub mod crypto;
pub mod error;
pub mod storage;

pub use error::{CommonError, CommonResult};
