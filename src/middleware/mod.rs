//! HTTP middleware components.
//!
//! Middleware run before route handlers. They can authenticate requests
//! and short-circuit the ones that fail.

/// Bearer token authentication middleware
pub mod auth;
