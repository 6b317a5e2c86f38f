//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Every service call returns `Result<T, AppError>`. A workflow that fails
/// returns before committing its unit of work, so no variant ever comes
/// with partial state behind it.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Missing or unknown bearer token
/// - **Authorization Errors**: Non-admin attempting a catalog mutation
/// - **Resource Errors**: User, catalog entry or ownership not found
/// - **Business Logic Errors**: Insufficient balance, entry still owned
/// - **Validation Errors**: Invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Bearer token is missing or does not match any user.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// The acting user could not be resolved.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("User not found")]
    UserNotFound,

    /// Requested catalog entry does not exist (or is of another kind).
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Catalog entry not found")]
    CatalogEntryNotFound,

    /// Requested ownership record does not exist or belongs to someone else.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Ownership record not found")]
    OwnershipNotFound,

    /// Purchase would drive the balance negative.
    ///
    /// Returns HTTP 422 Unprocessable Entity.
    #[error("Insufficient balance")]
    InsufficientBalance,

    /// Acting user is not an administrator.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Administrator role required")]
    Unauthorized,

    /// Catalog entry is still referenced by ownership records.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Catalog entry is still owned by users")]
    CatalogEntryInUse,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl AppError {
    /// Stable machine-readable code used in the JSON body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "internal_error",
            AppError::InvalidApiKey => "invalid_api_key",
            AppError::UserNotFound => "user_not_found",
            AppError::CatalogEntryNotFound => "catalog_entry_not_found",
            AppError::OwnershipNotFound => "ownership_not_found",
            AppError::InsufficientBalance => "insufficient_balance",
            AppError::Unauthorized => "unauthorized",
            AppError::CatalogEntryInUse => "catalog_entry_in_use",
            AppError::InvalidRequest(_) => "invalid_request",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound
            | AppError::CatalogEntryNotFound
            | AppError::OwnershipNotFound => StatusCode::NOT_FOUND,
            AppError::InsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized => StatusCode::FORBIDDEN,
            AppError::CatalogEntryInUse => StatusCode::CONFLICT,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

// Extractor rejections (malformed JSON, a non-UUID id, an unknown kind or
// category) use the same JSON error body as every other failure.

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Database errors are logged and replaced by a generic message so that
/// query details never reach the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                "An internal error occurred".to_string()
            }
            AppError::InvalidRequest(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (self.status(), body).into_response()
    }
}
