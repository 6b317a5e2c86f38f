//! Catalog HTTP handlers.
//!
//! This module implements the catalog endpoints for both kinds
//! (`clothing` and `shop_item`):
//! - GET /api/v1/catalog/{kind} - List entries, optionally by `?category=`
//! - GET /api/v1/catalog/{kind}/{id} - Get one entry
//! - POST /api/v1/catalog/{kind} - Create entry (admin)
//! - PATCH /api/v1/catalog/{kind}/{id} - Update entry (admin)
//! - DELETE /api/v1/catalog/{kind}/{id} - Delete entry (admin)

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::catalog::{
        CatalogEntryResponse, CatalogKind, CategoryQuery, CreateCatalogEntryRequest,
        UpdateCatalogEntryRequest,
    },
    repositories::SharedStore,
    services::catalog_service,
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

/// List catalog entries of one kind.
///
/// Without `?category=` every entry of the kind is returned.
///
/// # Response
///
/// - **Success (200 OK)**: Array of entries (may be empty)
/// - **Error (400)**: Category belongs to the other kind
pub async fn list_entries(
    State(store): State<SharedStore>,
    kind: Result<Path<CatalogKind>, PathRejection>,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> Result<Json<Vec<CatalogEntryResponse>>, AppError> {
    let Path(kind) = kind?;
    let Query(query) = query?;
    let entries = catalog_service::list_catalog(store.as_ref(), kind, query.category).await?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Get a single catalog entry.
///
/// # Response
///
/// - **Success (200 OK)**: The entry
/// - **Error (404)**: No entry of this kind with that id
pub async fn get_entry(
    State(store): State<SharedStore>,
    path: Result<Path<(CatalogKind, Uuid)>, PathRejection>,
) -> Result<Json<CatalogEntryResponse>, AppError> {
    let Path((kind, entry_id)) = path?;
    let entry = catalog_service::get_catalog_entry(store.as_ref(), kind, entry_id).await?;

    Ok(Json(entry.into()))
}

/// Create a catalog entry.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Denim Jacket",
///   "category": "top",
///   "image_url": "https://cdn.example.com/denim.png",
///   "description": "A sturdy denim jacket",
///   "price": 300
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: The created entry
/// - **Error (403)**: Caller is not an administrator
/// - **Error (400)**: Empty name, negative price or foreign category
pub async fn create_entry(
    State(store): State<SharedStore>,
    Extension(auth): Extension<AuthContext>,
    kind: Result<Path<CatalogKind>, PathRejection>,
    request: Result<Json<CreateCatalogEntryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(kind) = kind?;
    let Json(request) = request?;
    let entry =
        catalog_service::create_catalog_entry(store.as_ref(), &auth, kind, request).await?;

    Ok((StatusCode::CREATED, Json(CatalogEntryResponse::from(entry))))
}

/// Update name, image, description or price of a catalog entry.
pub async fn update_entry(
    State(store): State<SharedStore>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<(CatalogKind, Uuid)>, PathRejection>,
    patch: Result<Json<UpdateCatalogEntryRequest>, JsonRejection>,
) -> Result<Json<CatalogEntryResponse>, AppError> {
    let Path((kind, entry_id)) = path?;
    let Json(patch) = patch?;
    let entry =
        catalog_service::update_catalog_entry(store.as_ref(), &auth, kind, entry_id, patch)
            .await?;

    Ok(Json(entry.into()))
}

/// Delete a catalog entry.
///
/// Returns 204 No Content on success and 409 while any user still owns it.
pub async fn delete_entry(
    State(store): State<SharedStore>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<(CatalogKind, Uuid)>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path((kind, entry_id)) = path?;
    catalog_service::delete_catalog_entry(store.as_ref(), &auth, kind, entry_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
