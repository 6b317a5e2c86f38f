//! Ledger and profile HTTP handlers.
//!
//! - GET /api/v1/ledger - The caller's bank book
//! - GET /api/v1/me - The caller's profile and balance

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{ledger::LedgerEntryResponse, user::UserResponse},
    repositories::SharedStore,
    services::{ledger_service, user_service},
};
use axum::{Extension, Json, extract::State};

/// List the caller's ledger entries, oldest first.
pub async fn list_ledger(
    State(store): State<SharedStore>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<LedgerEntryResponse>>, AppError> {
    let entries = ledger_service::list_ledger(store.as_ref(), &auth).await?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Current profile, including balance.
pub async fn me(
    State(store): State<SharedStore>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service::current_user(store.as_ref(), &auth).await?;

    Ok(Json(user.into()))
}
