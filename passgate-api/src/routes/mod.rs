/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (login, refresh, me)

pub mod auth;
pub mod health;
