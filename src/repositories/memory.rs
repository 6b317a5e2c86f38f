//! In-process implementation of the persistence interface.
//!
//! Units of work hold an owned lock on the whole state for their lifetime,
//! which serializes them the way row locks serialize PostgreSQL
//! transactions. Writes go to a working copy that replaces the shared state
//! on commit and is thrown away on drop.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::hash_api_key,
    models::{
        catalog::{CatalogEntry, CatalogKind, Category, NewCatalogEntry, UpdateCatalogEntryRequest},
        ledger::{LedgerEntry, NewLedgerEntry},
        ownership::{OwnedEntry, Ownership},
        user::{Role, User},
    },
    repositories::{Store, UnitOfWork},
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: Vec<User>,
    catalog: Vec<CatalogEntry>,
    ownerships: Vec<Ownership>,
    ledger: Vec<LedgerEntry>,
    last_ledger_id: i64,
}

impl MemoryState {
    fn user(&self, user_id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    fn catalog_entry(&self, entry_id: Uuid) -> Option<&CatalogEntry> {
        self.catalog.iter().find(|e| e.id == entry_id)
    }
}

/// Store that keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_ownership_insert: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user that authenticates with `api_key`.
    pub async fn insert_user(&self, email: &str, role: Role, balance: i64, api_key: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            balance,
            role,
            api_key_hash: hash_api_key(api_key),
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.users.push(user.clone());
        user
    }

    /// Add a catalog entry directly, bypassing the admin gate.
    pub async fn seed_catalog_entry(&self, entry: NewCatalogEntry) -> CatalogEntry {
        let entry = build_catalog_entry(entry);
        self.state.lock().await.catalog.push(entry.clone());
        entry
    }

    /// Make the next `insert_ownership` fail with a database error.
    pub fn fail_next_ownership_insert(&self) {
        self.fail_ownership_insert.store(true, Ordering::SeqCst);
    }
}

fn build_catalog_entry(entry: NewCatalogEntry) -> CatalogEntry {
    let now = Utc::now();
    CatalogEntry {
        id: Uuid::new_v4(),
        kind: entry.kind,
        name: entry.name,
        category: entry.category,
        image_url: entry.image_url,
        description: entry.description,
        price: entry.price,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.state.lock().await.user(user_id).cloned())
    }

    async fn find_user_by_api_key_hash(
        &self,
        api_key_hash: &str,
    ) -> Result<Option<User>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.api_key_hash == api_key_hash)
            .cloned())
    }

    async fn list_catalog(
        &self,
        kind: CatalogKind,
        category: Option<Category>,
    ) -> Result<Vec<CatalogEntry>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .catalog
            .iter()
            .filter(|e| e.kind == kind && category.is_none_or(|c| e.category == c))
            .cloned()
            .collect())
    }

    async fn find_catalog_entry(&self, entry_id: Uuid) -> Result<Option<CatalogEntry>, AppError> {
        Ok(self.state.lock().await.catalog_entry(entry_id).cloned())
    }

    async fn list_owned(
        &self,
        user_id: Uuid,
        category: Option<Category>,
    ) -> Result<Vec<OwnedEntry>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .ownerships
            .iter()
            .filter(|o| o.user_id == user_id)
            .filter_map(|o| {
                state
                    .catalog_entry(o.catalog_entry_id)
                    .map(|e| OwnedEntry::new(o.clone(), e.clone()))
            })
            .filter(|owned| category.is_none_or(|c| owned.category == c))
            .collect())
    }

    async fn list_ledger(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .ledger
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        let guard = self.state.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryUnitOfWork {
            guard,
            working,
            fail_ownership_insert: self.fail_ownership_insert.clone(),
        }))
    }
}

/// Unit of work over a private copy of the state.
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    fail_ownership_insert: Arc<AtomicBool>,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_user(&mut self, user_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.working.user(user_id).cloned())
    }

    async fn find_catalog_entry(
        &mut self,
        entry_id: Uuid,
    ) -> Result<Option<CatalogEntry>, AppError> {
        Ok(self.working.catalog_entry(entry_id).cloned())
    }

    async fn lock_ownership(&mut self, ownership_id: Uuid) -> Result<Option<Ownership>, AppError> {
        Ok(self
            .working
            .ownerships
            .iter()
            .find(|o| o.id == ownership_id)
            .cloned())
    }

    async fn set_balance(&mut self, user_id: Uuid, balance: i64) -> Result<(), AppError> {
        let user = self
            .working
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(AppError::UserNotFound)?;
        user.balance = balance;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn append_ledger(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntry, AppError> {
        self.working.last_ledger_id += 1;
        let now = Utc::now();
        let entry = LedgerEntry {
            id: self.working.last_ledger_id,
            user_id: entry.user_id,
            amount: entry.amount,
            kind: entry.kind,
            balance: entry.balance,
            date: now.date_naive(),
            summary: entry.summary,
            created_at: now,
        };
        self.working.ledger.push(entry.clone());
        Ok(entry)
    }

    async fn insert_ownership(
        &mut self,
        user_id: Uuid,
        catalog_entry_id: Uuid,
    ) -> Result<Ownership, AppError> {
        if self.fail_ownership_insert.swap(false, Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::Protocol(
                "injected ownership insert failure".to_string(),
            )));
        }

        let ownership = Ownership {
            id: Uuid::new_v4(),
            user_id,
            catalog_entry_id,
            acquired_at: Utc::now(),
        };
        self.working.ownerships.push(ownership.clone());
        Ok(ownership)
    }

    async fn delete_ownership(&mut self, ownership_id: Uuid) -> Result<bool, AppError> {
        let before = self.working.ownerships.len();
        self.working.ownerships.retain(|o| o.id != ownership_id);
        Ok(self.working.ownerships.len() < before)
    }

    async fn insert_catalog_entry(
        &mut self,
        entry: NewCatalogEntry,
    ) -> Result<CatalogEntry, AppError> {
        let entry = build_catalog_entry(entry);
        self.working.catalog.push(entry.clone());
        Ok(entry)
    }

    async fn update_catalog_entry(
        &mut self,
        entry_id: Uuid,
        patch: &UpdateCatalogEntryRequest,
    ) -> Result<Option<CatalogEntry>, AppError> {
        let Some(entry) = self.working.catalog.iter_mut().find(|e| e.id == entry_id) else {
            return Ok(None);
        };
        patch.apply_to(entry);
        entry.updated_at = Utc::now();
        Ok(Some(entry.clone()))
    }

    async fn delete_catalog_entry(&mut self, entry_id: Uuid) -> Result<bool, AppError> {
        if self
            .working
            .ownerships
            .iter()
            .any(|o| o.catalog_entry_id == entry_id)
        {
            return Err(AppError::CatalogEntryInUse);
        }

        let before = self.working.catalog.len();
        self.working.catalog.retain(|e| e.id != entry_id);
        Ok(self.working.catalog.len() < before)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryUnitOfWork {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }
}
