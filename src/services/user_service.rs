//! User resolution and the admin gate.

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::user::{Role, User},
    repositories::{Store, UnitOfWork},
};

/// Load the user behind the request's auth context.
pub async fn current_user(store: &dyn Store, auth: &AuthContext) -> Result<User, AppError> {
    store
        .find_user(auth.user_id)
        .await?
        .ok_or(AppError::UserNotFound)
}

/// Admin gate run before every catalog mutation.
///
/// The role is read from the store on each call rather than trusted from
/// the auth context, so a demotion takes effect on the next request. The
/// read happens inside the mutation's own unit of work with the user row
/// locked, so the role cannot change between the check and the write.
///
/// # Errors
///
/// - `UserNotFound`: the acting user no longer exists
/// - `Unauthorized`: the acting user is not an administrator
pub async fn ensure_admin(uow: &mut dyn UnitOfWork, auth: &AuthContext) -> Result<User, AppError> {
    let user = uow
        .lock_user(auth.user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    match user.role {
        Role::Admin => Ok(user),
        Role::Ordinary => {
            tracing::warn!(user_id = %user.id, email = %user.email, "catalog mutation rejected: not an admin");
            Err(AppError::Unauthorized)
        }
    }
}
