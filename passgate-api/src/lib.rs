//! # Passgate API Server Library
//!
//! This library provides the HTTP surface of Passgate: configuration, the
//! built-in user directory, and the router exposing the login, refresh and
//! identity endpoints.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `directory`: In-memory user directory
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod directory;
pub mod error;
pub mod routes;
