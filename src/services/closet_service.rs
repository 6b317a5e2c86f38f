//! Closet service - purchase and resale of catalog entries.
//!
//! This service handles:
//! - Balance checks before a purchase
//! - Ledger append and balance update through the balance mutator
//! - Ownership record creation (purchase) and removal (resale)
//!
//! # Atomicity Guarantees
//!
//! Each workflow runs inside one unit of work. All of its writes commit
//! together; any early return drops the unit of work and rolls them back.

use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        catalog::Category,
        ledger::{LedgerEntry, LedgerKind},
        ownership::OwnedEntry,
    },
    repositories::Store,
    services::ledger_service,
};

/// Share of the current catalog price paid back on resale.
pub const RESALE_PERCENT: i64 = 40;

/// Resale value of an entry priced at `price`.
///
/// `price * 40 / 100` rounded half up, in integer arithmetic that cannot
/// overflow. Prices are never negative.
pub fn resale_value(price: i64) -> i64 {
    price / 100 * RESALE_PERCENT + (price % 100 * RESALE_PERCENT + 50) / 100
}

/// Buy one unit of a catalog entry.
///
/// # Process
///
/// 1. Start a unit of work
/// 2. Lock the requesting user
/// 3. Load the catalog entry
/// 4. Check the balance covers the price
/// 5. Append the Purchase ledger entry and lower the balance
/// 6. Create the ownership record
/// 7. Commit (or roll back on error)
///
/// # Errors
///
/// - `UserNotFound`: Requesting user doesn't exist
/// - `CatalogEntryNotFound`: Entry doesn't exist
/// - `InsufficientBalance`: Price exceeds the balance; nothing is written
/// - `Database`: Database error occurred
pub async fn purchase(
    store: &dyn Store,
    auth: &AuthContext,
    catalog_entry_id: Uuid,
) -> Result<OwnedEntry, AppError> {
    let mut uow = store.begin().await?;

    let user = uow
        .lock_user(auth.user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let entry = uow
        .find_catalog_entry(catalog_entry_id)
        .await?
        .ok_or(AppError::CatalogEntryNotFound)?;

    let ledger_entry = ledger_service::apply_balance_change(
        uow.as_mut(),
        &user,
        LedgerKind::Purchase,
        entry.price,
        entry.description.clone(),
    )
    .await
    .inspect_err(|err| {
        if matches!(err, AppError::InsufficientBalance) {
            tracing::warn!(
                user_id = %user.id,
                catalog_entry_id = %entry.id,
                balance = user.balance,
                price = entry.price,
                "purchase rejected: insufficient balance"
            );
        }
    })?;

    let ownership = uow.insert_ownership(user.id, entry.id).await?;

    uow.commit().await?;

    tracing::info!(
        user_id = %user.id,
        catalog_entry_id = %entry.id,
        ownership_id = %ownership.id,
        price = entry.price,
        balance = ledger_entry.balance,
        "catalog entry purchased"
    );

    Ok(OwnedEntry::new(ownership, entry))
}

/// Resell an owned entry for [`RESALE_PERCENT`] of its current price.
///
/// # Process
///
/// 1. Start a unit of work
/// 2. Lock the ownership record (must belong to the requester)
/// 3. Lock the owner and load the catalog entry
/// 4. Append the Sale ledger entry and raise the balance
/// 5. Delete the ownership record
/// 6. Commit
///
/// # Errors
///
/// - `OwnershipNotFound`: Record doesn't exist or belongs to another user
/// - `UserNotFound` / `CatalogEntryNotFound`: Referenced rows are missing
/// - `Database`: Database error occurred
pub async fn resell(
    store: &dyn Store,
    auth: &AuthContext,
    ownership_id: Uuid,
) -> Result<LedgerEntry, AppError> {
    let mut uow = store.begin().await?;

    // Another user's record is reported as missing, not forbidden
    let ownership = uow
        .lock_ownership(ownership_id)
        .await?
        .filter(|o| o.user_id == auth.user_id)
        .ok_or(AppError::OwnershipNotFound)?;

    let user = uow
        .lock_user(ownership.user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let entry = uow
        .find_catalog_entry(ownership.catalog_entry_id)
        .await?
        .ok_or(AppError::CatalogEntryNotFound)?;

    let sale_amount = resale_value(entry.price);
    let ledger_entry = ledger_service::apply_balance_change(
        uow.as_mut(),
        &user,
        LedgerKind::Sale,
        sale_amount,
        entry.description.clone(),
    )
    .await?;

    if !uow.delete_ownership(ownership.id).await? {
        return Err(AppError::OwnershipNotFound);
    }

    uow.commit().await?;

    tracing::info!(
        user_id = %user.id,
        ownership_id = %ownership.id,
        sale_amount,
        balance = ledger_entry.balance,
        "owned entry resold"
    );

    Ok(ledger_entry)
}

/// The requester's owned entries, optionally narrowed to one category.
///
/// An absent category returns everything the user owns.
pub async fn list_owned(
    store: &dyn Store,
    auth: &AuthContext,
    category: Option<Category>,
) -> Result<Vec<OwnedEntry>, AppError> {
    store.list_owned(auth.user_id, category).await
}
