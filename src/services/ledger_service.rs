//! Balance mutation and the ledger (bank book).
//!
//! `users.balance` is only ever written by [`apply_balance_change`], which
//! appends the matching ledger entry through the same unit of work. Hence
//! the latest ledger snapshot of a user always equals the stored balance.

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        ledger::{LedgerEntry, LedgerKind, NewLedgerEntry},
        user::User,
    },
    repositories::{Store, UnitOfWork},
};

/// Balance after moving `amount` in the direction given by `kind`.
///
/// # Errors
///
/// - `InsufficientBalance`: a purchase would go below zero
/// - `InvalidRequest`: the amount is negative or the result overflows
pub fn next_balance(balance: i64, kind: LedgerKind, amount: i64) -> Result<i64, AppError> {
    if amount < 0 {
        return Err(AppError::InvalidRequest(
            "Amount must not be negative".to_string(),
        ));
    }

    let next = match kind {
        LedgerKind::Purchase => balance.checked_sub(amount),
        LedgerKind::Sale => balance.checked_add(amount),
    }
    .ok_or_else(|| AppError::InvalidRequest("Balance out of range".to_string()))?;

    if next < 0 {
        return Err(AppError::InsufficientBalance);
    }

    Ok(next)
}

/// Change a user's balance and append the ledger entry recording it.
///
/// Both writes go through `uow`; they become visible together when the
/// caller commits, or not at all. Nothing is written when the balance check
/// fails.
pub async fn apply_balance_change(
    uow: &mut dyn UnitOfWork,
    user: &User,
    kind: LedgerKind,
    amount: i64,
    summary: String,
) -> Result<LedgerEntry, AppError> {
    let balance = next_balance(user.balance, kind, amount)?;

    let entry = uow
        .append_ledger(NewLedgerEntry {
            user_id: user.id,
            amount,
            kind,
            balance,
            summary,
        })
        .await?;
    uow.set_balance(user.id, balance).await?;

    Ok(entry)
}

/// The requesting user's ledger in insertion order.
pub async fn list_ledger(
    store: &dyn Store,
    auth: &AuthContext,
) -> Result<Vec<LedgerEntry>, AppError> {
    store.list_ledger(auth.user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1000, LedgerKind::Purchase, 300, 700)]
    #[case(300, LedgerKind::Purchase, 300, 0)]
    #[case(700, LedgerKind::Sale, 120, 820)]
    #[case(0, LedgerKind::Sale, 0, 0)]
    fn computes_next_balance(
        #[case] balance: i64,
        #[case] kind: LedgerKind,
        #[case] amount: i64,
        #[case] expected: i64,
    ) {
        assert_eq!(next_balance(balance, kind, amount).unwrap(), expected);
    }

    #[test]
    fn purchase_below_zero_is_insufficient() {
        let err = next_balance(299, LedgerKind::Purchase, 300).unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance));
    }

    #[test]
    fn overflow_and_negative_amounts_are_rejected() {
        assert!(matches!(
            next_balance(i64::MAX, LedgerKind::Sale, 1),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            next_balance(10, LedgerKind::Sale, -1),
            Err(AppError::InvalidRequest(_))
        ));
    }
}
