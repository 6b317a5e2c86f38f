//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They take the store and the caller's `AuthContext` explicitly, own the
//! unit-of-work boundaries, and return `AppError` on failure.

pub mod catalog_service;
pub mod closet_service;
pub mod ledger_service;
pub mod user_service;
