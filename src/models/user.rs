//! User data models and API response types.
//!
//! This module defines:
//! - `User`: Database entity representing a shop customer or administrator
//! - `Role`: Authorization role checked by the admin gate
//! - `UserResponse`: Response body returned to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authorization role of a user.
///
/// Maps to the PostgreSQL enum type `user_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular customer. Can buy and resell but cannot touch the catalog.
    Ordinary,
    /// Catalog administrator.
    Admin,
}

/// Represents a user record from the database.
///
/// # Database Table
///
/// Maps to the `users` table. Each user:
/// - Authenticates with a bearer token stored as a SHA-256 hash
/// - Holds a simulated balance in whole currency units
///
/// # Balance Storage
///
/// Balances are stored as `i64` and must never go negative (enforced by
/// a database CHECK constraint and by the purchase workflow).
/// Every change to `balance` is paired with one ledger entry.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct User {
    /// Unique identifier for this user
    pub id: Uuid,

    /// Login email
    pub email: String,

    /// Current simulated balance
    pub balance: i64,

    /// Authorization role
    pub role: Role,

    /// SHA-256 hash (hex) of the user's bearer token
    #[serde(skip_serializing)]
    pub api_key_hash: String,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of last balance update
    pub updated_at: DateTime<Utc>,
}

/// Response body for `GET /api/v1/me`.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "email": "kim@example.com",
///   "balance": 700,
///   "role": "ordinary"
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub balance: i64,
    pub role: Role,
}

/// Convert database User to API UserResponse.
///
/// Drops the token hash and timestamps.
impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            balance: user.balance,
            role: user.role,
        }
    }
}
