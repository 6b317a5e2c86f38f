//! Closet HTTP handlers.
//!
//! This module implements the purchase/resale endpoints:
//! - POST /api/v1/closet - Buy a catalog entry
//! - GET /api/v1/closet - List owned entries, optionally by `?category=`
//! - DELETE /api/v1/closet/:id - Resell an owned entry

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        catalog::CategoryQuery,
        ledger::LedgerEntryResponse,
        ownership::{OwnershipResponse, PurchaseRequest},
    },
    repositories::SharedStore,
    services::closet_service,
};
use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// Buy one unit of a catalog entry with the caller's balance.
///
/// # Request Body
///
/// ```json
/// { "catalog_entry_id": "550e8400-..." }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: The new ownership record
/// - **Error (404)**: Catalog entry not found
/// - **Error (422)**: Insufficient balance
pub async fn purchase(
    State(store): State<SharedStore>,
    Extension(auth): Extension<AuthContext>,
    request: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = request?;
    let owned = closet_service::purchase(store.as_ref(), &auth, request.catalog_entry_id).await?;

    Ok((StatusCode::CREATED, Json(OwnershipResponse::from(owned))))
}

/// List the caller's owned entries.
pub async fn list_owned(
    State(store): State<SharedStore>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> Result<Json<Vec<OwnershipResponse>>, AppError> {
    let Query(query) = query?;
    let owned = closet_service::list_owned(store.as_ref(), &auth, query.category).await?;

    Ok(Json(owned.into_iter().map(Into::into).collect()))
}

/// Resell an owned entry for 40% of its current price.
///
/// # Response
///
/// - **Success (200 OK)**: The Sale ledger entry
/// - **Error (404)**: Ownership record not found or not the caller's
pub async fn resell(
    State(store): State<SharedStore>,
    Extension(auth): Extension<AuthContext>,
    ownership_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<LedgerEntryResponse>, AppError> {
    let Path(ownership_id) = ownership_id?;
    let entry = closet_service::resell(store.as_ref(), &auth, ownership_id).await?;

    Ok(Json(entry.into()))
}
