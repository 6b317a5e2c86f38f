//! PostgreSQL implementation of the persistence interface.
//!
//! Every query is an explicit parameterised SQL statement. Units of work wrap
//! a `sqlx::Transaction`, which rolls back on drop unless committed.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        catalog::{CatalogEntry, CatalogKind, Category, NewCatalogEntry, UpdateCatalogEntryRequest},
        ledger::{LedgerEntry, NewLedgerEntry},
        ownership::{OwnedEntry, Ownership},
        user::User,
    },
    repositories::{Store, UnitOfWork},
};

/// Store backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_user_by_api_key_hash(
        &self,
        api_key_hash: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE api_key_hash = $1")
            .bind(api_key_hash)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn list_catalog(
        &self,
        kind: CatalogKind,
        category: Option<Category>,
    ) -> Result<Vec<CatalogEntry>, AppError> {
        // A NULL category matches every row of the kind
        let entries = sqlx::query_as::<_, CatalogEntry>(
            r#"
            SELECT * FROM catalog_entries
            WHERE kind = $1
              AND ($2::catalog_category IS NULL OR category = $2)
            ORDER BY created_at, id
            "#,
        )
        .bind(kind)
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn find_catalog_entry(&self, entry_id: Uuid) -> Result<Option<CatalogEntry>, AppError> {
        let entry =
            sqlx::query_as::<_, CatalogEntry>("SELECT * FROM catalog_entries WHERE id = $1")
                .bind(entry_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(entry)
    }

    async fn list_owned(
        &self,
        user_id: Uuid,
        category: Option<Category>,
    ) -> Result<Vec<OwnedEntry>, AppError> {
        let owned = sqlx::query_as::<_, OwnedEntry>(
            r#"
            SELECT
                o.id AS ownership_id,
                o.user_id,
                o.acquired_at,
                c.id AS catalog_entry_id,
                c.kind,
                c.name,
                c.category,
                c.image_url,
                c.description,
                c.price
            FROM ownerships o
            JOIN catalog_entries c ON c.id = o.catalog_entry_id
            WHERE o.user_id = $1
              AND ($2::catalog_category IS NULL OR c.category = $2)
            ORDER BY o.acquired_at, o.id
            "#,
        )
        .bind(user_id)
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(owned)
    }

    async fn list_ledger(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>, AppError> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            "SELECT * FROM ledger_entries WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// Unit of work over one PostgreSQL transaction.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_user(&mut self, user_id: Uuid) -> Result<Option<User>, AppError> {
        // FOR UPDATE serializes concurrent balance changes for this user
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(user)
    }

    async fn find_catalog_entry(
        &mut self,
        entry_id: Uuid,
    ) -> Result<Option<CatalogEntry>, AppError> {
        let entry =
            sqlx::query_as::<_, CatalogEntry>("SELECT * FROM catalog_entries WHERE id = $1")
                .bind(entry_id)
                .fetch_optional(&mut *self.tx)
                .await?;

        Ok(entry)
    }

    async fn lock_ownership(&mut self, ownership_id: Uuid) -> Result<Option<Ownership>, AppError> {
        let ownership =
            sqlx::query_as::<_, Ownership>("SELECT * FROM ownerships WHERE id = $1 FOR UPDATE")
                .bind(ownership_id)
                .fetch_optional(&mut *self.tx)
                .await?;

        Ok(ownership)
    }

    async fn set_balance(&mut self, user_id: Uuid, balance: i64) -> Result<(), AppError> {
        let updated_count =
            sqlx::query("UPDATE users SET balance = $1, updated_at = NOW() WHERE id = $2")
                .bind(balance)
                .bind(user_id)
                .execute(&mut *self.tx)
                .await?
                .rows_affected();

        if updated_count == 0 {
            return Err(AppError::UserNotFound);
        }

        Ok(())
    }

    async fn append_ledger(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntry, AppError> {
        let entry = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO ledger_entries (user_id, amount, kind, balance, date, summary)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.amount)
        .bind(entry.kind)
        .bind(entry.balance)
        .bind(Utc::now().date_naive())
        .bind(entry.summary)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(entry)
    }

    async fn insert_ownership(
        &mut self,
        user_id: Uuid,
        catalog_entry_id: Uuid,
    ) -> Result<Ownership, AppError> {
        let ownership = sqlx::query_as::<_, Ownership>(
            r#"
            INSERT INTO ownerships (user_id, catalog_entry_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(catalog_entry_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(ownership)
    }

    async fn delete_ownership(&mut self, ownership_id: Uuid) -> Result<bool, AppError> {
        let deleted = sqlx::query("DELETE FROM ownerships WHERE id = $1")
            .bind(ownership_id)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn insert_catalog_entry(
        &mut self,
        entry: NewCatalogEntry,
    ) -> Result<CatalogEntry, AppError> {
        let entry = sqlx::query_as::<_, CatalogEntry>(
            r#"
            INSERT INTO catalog_entries (kind, name, category, image_url, description, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(entry.kind)
        .bind(entry.name)
        .bind(entry.category)
        .bind(entry.image_url)
        .bind(entry.description)
        .bind(entry.price)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(entry)
    }

    async fn update_catalog_entry(
        &mut self,
        entry_id: Uuid,
        patch: &UpdateCatalogEntryRequest,
    ) -> Result<Option<CatalogEntry>, AppError> {
        // Only the editable columns appear here; id, kind and category are fixed.
        // image_url may be cleared, so it takes an explicit "present" flag ($2).
        let entry = sqlx::query_as::<_, CatalogEntry>(
            r#"
            UPDATE catalog_entries
            SET name = COALESCE($1, name),
                image_url = CASE WHEN $2 THEN $3 ELSE image_url END,
                description = COALESCE($4, description),
                price = COALESCE($5, price),
                updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(patch.name.as_deref())
        .bind(patch.image_url.is_some())
        .bind(patch.image_url.clone().flatten())
        .bind(patch.description.as_deref())
        .bind(patch.price)
        .bind(entry_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(entry)
    }

    async fn delete_catalog_entry(&mut self, entry_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM catalog_entries WHERE id = $1")
            .bind(entry_id)
            .execute(&mut *self.tx)
            .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(sqlx::Error::Database(err)) if err.is_foreign_key_violation() => {
                Err(AppError::CatalogEntryInUse)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let uow = *self;
        uow.tx.commit().await?;
        Ok(())
    }
}
