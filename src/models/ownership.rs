//! Ownership (closet) models.
//!
//! An ownership row links a user to one purchased catalog entry instance.
//! Buying the same entry twice creates two rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::catalog::{CatalogEntry, CatalogKind, Category};

/// Represents an ownership record from the `ownerships` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct Ownership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub catalog_entry_id: Uuid,
    pub acquired_at: DateTime<Utc>,
}

/// An ownership row joined with the catalog entry it refers to.
///
/// Produced by the closet listing query and returned by purchases.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OwnedEntry {
    pub ownership_id: Uuid,
    pub user_id: Uuid,
    pub acquired_at: DateTime<Utc>,
    pub catalog_entry_id: Uuid,
    pub kind: CatalogKind,
    pub name: String,
    pub category: Category,
    pub image_url: Option<String>,
    pub description: String,
    pub price: i64,
}

impl OwnedEntry {
    pub fn new(ownership: Ownership, entry: CatalogEntry) -> Self {
        Self {
            ownership_id: ownership.id,
            user_id: ownership.user_id,
            acquired_at: ownership.acquired_at,
            catalog_entry_id: entry.id,
            kind: entry.kind,
            name: entry.name,
            category: entry.category,
            image_url: entry.image_url,
            description: entry.description,
            price: entry.price,
        }
    }
}

/// Request body for `POST /api/v1/closet`.
///
/// ```json
/// { "catalog_entry_id": "550e8400-e29b-41d4-a716-446655440000" }
/// ```
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub catalog_entry_id: Uuid,
}

/// Response body for closet endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "770e8400-e29b-41d4-a716-446655440002",
///   "catalog_entry_id": "550e8400-e29b-41d4-a716-446655440000",
///   "kind": "clothing",
///   "name": "Denim Jacket",
///   "category": "top",
///   "image_url": null,
///   "price": 300,
///   "acquired_at": "2026-01-02T10:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipResponse {
    /// Ownership id, used to resell this instance
    pub id: Uuid,
    pub catalog_entry_id: Uuid,
    pub kind: CatalogKind,
    pub name: String,
    pub category: Category,
    pub image_url: Option<String>,
    pub price: i64,
    pub acquired_at: DateTime<Utc>,
}

impl From<OwnedEntry> for OwnershipResponse {
    fn from(owned: OwnedEntry) -> Self {
        Self {
            id: owned.ownership_id,
            catalog_entry_id: owned.catalog_entry_id,
            kind: owned.kind,
            name: owned.name,
            category: owned.category,
            image_url: owned.image_url,
            price: owned.price,
            acquired_at: owned.acquired_at,
        }
    }
}
