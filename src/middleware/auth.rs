//! Bearer token authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the token from the Authorization header
//! 2. Hash it and resolve the user that owns it
//! 3. Inject an `AuthContext` into the request
//! 4. Reject unauthenticated requests with HTTP 401

use crate::{error::AppError, repositories::SharedStore};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Identity of the user making the current request.
///
/// Inserted into the request extensions by [`auth_middleware`] and passed
/// explicitly into every service call. The role is deliberately absent:
/// the admin gate re-reads it from the store on every catalog mutation.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// ID of the authenticated user
    pub user_id: Uuid,

    /// Email of the authenticated user, used in log lines
    pub email: String,
}

/// SHA-256 hex digest of a bearer token, as stored in `users.api_key_hash`.
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Bearer token authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <token>` header from request
/// 2. Hash the `<token>` using SHA-256
/// 3. Look up the user with a matching hash
/// 4. If found: inject `AuthContext` into request, call next handler
/// 5. If not found: return 401 Unauthorized error
pub async fn auth_middleware(
    State(store): State<SharedStore>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidApiKey)?;

    let api_key = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::InvalidApiKey)?;

    let user = store
        .find_user_by_api_key_hash(&hash_api_key(api_key))
        .await?
        .ok_or(AppError::InvalidApiKey)?;

    // Route handlers extract this with Extension<AuthContext>
    request.extensions_mut().insert(AuthContext {
        user_id: user.id,
        email: user.email,
    });

    Ok(next.run(request).await)
}
