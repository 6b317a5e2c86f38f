//! Ledger (bank book) models.
//!
//! This module defines:
//! - `LedgerEntry`: Append-only record of one balance-affecting transaction
//! - `LedgerKind`: Purchase or sale
//! - `NewLedgerEntry`: Fields for appending an entry
//! - `LedgerEntryResponse`: Response body returned to clients

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of balance-affecting transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ledger_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    /// Balance decreased by buying a catalog entry
    Purchase,
    /// Balance increased by reselling an owned entry
    Sale,
}

/// Represents a ledger record from the database.
///
/// # Database Table
///
/// Maps to the `ledger_entries` table. Rows are never updated or deleted.
/// `id` is a BIGSERIAL, so ordering by `id` is insertion order.
///
/// # Balance Snapshot
///
/// `balance` is the user's balance right after this transaction. The most
/// recent entry's snapshot always equals `users.balance`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct LedgerEntry {
    /// Insertion sequence number
    pub id: i64,

    /// Owner of the balance
    pub user_id: Uuid,

    /// Amount moved, always non-negative; direction comes from `kind`
    pub amount: i64,

    /// Purchase or sale
    pub kind: LedgerKind,

    /// Balance after this transaction
    pub balance: i64,

    /// Calendar date of the transaction (UTC)
    pub date: NaiveDate,

    /// Free text, taken from the catalog entry description
    pub summary: String,

    pub created_at: DateTime<Utc>,
}

/// Fields for appending a ledger entry.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub user_id: Uuid,
    pub amount: i64,
    pub kind: LedgerKind,
    pub balance: i64,
    pub summary: String,
}

/// Response body for ledger endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 42,
///   "amount": 300,
///   "kind": "purchase",
///   "balance": 700,
///   "date": "2026-01-02",
///   "summary": "A sturdy denim jacket"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntryResponse {
    pub id: i64,
    pub amount: i64,
    pub kind: LedgerKind,
    pub balance: i64,
    pub date: NaiveDate,
    pub summary: String,
}

/// Convert database LedgerEntry to API LedgerEntryResponse.
///
/// Drops `user_id` (always the caller) and the precise timestamp.
impl From<LedgerEntry> for LedgerEntryResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id,
            amount: entry.amount,
            kind: entry.kind,
            balance: entry.balance,
            date: entry.date,
            summary: entry.summary,
        }
    }
}
