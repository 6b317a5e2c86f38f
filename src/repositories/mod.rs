//! Persistence interface.
//!
//! Services never talk to SQL directly. They go through two traits:
//!
//! - [`Store`]: read-only queries that need no transaction, plus [`Store::begin`]
//! - [`UnitOfWork`]: reads and writes that belong to one atomic transaction
//!
//! A unit of work is a scope guard. Its writes become visible only after
//! [`UnitOfWork::commit`]; dropping it on any other path (an early `return`,
//! a `?`, a panic) rolls everything back.
//!
//! Two implementations exist: [`postgres::PgStore`] for production and
//! [`memory::MemoryStore`] for tests and local experiments.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        catalog::{CatalogEntry, CatalogKind, Category, NewCatalogEntry, UpdateCatalogEntryRequest},
        ledger::{LedgerEntry, NewLedgerEntry},
        ownership::{OwnedEntry, Ownership},
        user::User,
    },
};

/// Shared handle stored in the axum router state.
pub type SharedStore = Arc<dyn Store>;

/// Read-side queries and transaction factory.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Cheap connectivity check used by the health endpoint.
    async fn ping(&self) -> Result<(), AppError>;

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, AppError>;

    /// Look up the user whose bearer token hashes to `api_key_hash`.
    async fn find_user_by_api_key_hash(&self, api_key_hash: &str)
    -> Result<Option<User>, AppError>;

    /// Entries of one kind, optionally narrowed to a category, in creation order.
    async fn list_catalog(
        &self,
        kind: CatalogKind,
        category: Option<Category>,
    ) -> Result<Vec<CatalogEntry>, AppError>;

    async fn find_catalog_entry(&self, entry_id: Uuid) -> Result<Option<CatalogEntry>, AppError>;

    /// A user's ownership rows joined with catalog data, in acquisition order.
    async fn list_owned(
        &self,
        user_id: Uuid,
        category: Option<Category>,
    ) -> Result<Vec<OwnedEntry>, AppError>;

    /// A user's ledger entries in insertion order.
    async fn list_ledger(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>, AppError>;

    /// Start a unit of work.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError>;
}

/// One atomic transaction.
///
/// `lock_*` methods take a row lock for the rest of the unit of work, so
/// a concurrent workflow touching the same row waits for commit or rollback.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn lock_user(&mut self, user_id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_catalog_entry(&mut self, entry_id: Uuid)
    -> Result<Option<CatalogEntry>, AppError>;

    async fn lock_ownership(&mut self, ownership_id: Uuid) -> Result<Option<Ownership>, AppError>;

    async fn set_balance(&mut self, user_id: Uuid, balance: i64) -> Result<(), AppError>;

    async fn append_ledger(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntry, AppError>;

    async fn insert_ownership(
        &mut self,
        user_id: Uuid,
        catalog_entry_id: Uuid,
    ) -> Result<Ownership, AppError>;

    /// Returns `false` when no row matched.
    async fn delete_ownership(&mut self, ownership_id: Uuid) -> Result<bool, AppError>;

    async fn insert_catalog_entry(&mut self, entry: NewCatalogEntry)
    -> Result<CatalogEntry, AppError>;

    /// Apply the editable fields of `patch`. Returns `None` when no row matched.
    async fn update_catalog_entry(
        &mut self,
        entry_id: Uuid,
        patch: &UpdateCatalogEntryRequest,
    ) -> Result<Option<CatalogEntry>, AppError>;

    /// Returns `false` when no row matched and
    /// [`AppError::CatalogEntryInUse`] when ownership rows still point at it.
    async fn delete_catalog_entry(&mut self, entry_id: Uuid) -> Result<bool, AppError>;

    /// Make every write of this unit of work visible at once.
    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}
