//! Data models representing database entities and API bodies.

/// Catalog entries (clothing and shop items)
pub mod catalog;
/// Ledger (bank book) entries
pub mod ledger;
/// Ownership (closet) records
pub mod ownership;
/// Users and roles
pub mod user;
