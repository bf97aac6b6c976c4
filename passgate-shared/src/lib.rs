//! # Passgate Shared Library
//!
//! This crate contains the authentication core used by the Passgate API
//! server: token minting and verification, the pluggable strategies, the
//! strategy dispatcher, and the classified failures they produce.
//!
//! ## Module Organization
//!
//! - `auth`: Tokens, strategies, dispatcher and Axum middleware
//! - `error`: Classified authentication failures and error codes

pub mod auth;
pub mod error;

/// Current version of the Passgate shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
