//! HTTP request handlers (route handlers).
//!
//! Each handler extracts request data, calls one service function and
//! converts the result into a JSON response.

/// Catalog browsing and administration endpoints
pub mod catalog;
/// Purchase, resale and owned-entry listing endpoints
pub mod closet;
pub mod health;
/// Ledger and profile endpoints
pub mod ledger;
