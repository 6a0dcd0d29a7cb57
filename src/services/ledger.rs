//! Ledger
//!
//! The only code that moves cash and inventory. Debits are conditional
//! UPDATEs so non-negativity is enforced in the same statement that mutates
//! the row; a miss re-reads the available figure for the error payload.
//! All deltas are strictly positive.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::AppError;
use crate::store::{inventories, users};

pub async fn credit_cash(
    conn: &mut PgConnection,
    user_id: Uuid,
    delta: i64,
) -> Result<(), AppError> {
    debug_assert!(delta > 0);
    let rows = users::credit_cash(conn, user_id, delta).await?;
    if rows == 0 {
        return Err(AppError::not_found("User", user_id.to_string()));
    }
    Ok(())
}

pub async fn debit_cash(
    conn: &mut PgConnection,
    base_ticker: &str,
    user_id: Uuid,
    delta: i64,
) -> Result<(), AppError> {
    debug_assert!(delta > 0);
    let rows = users::try_debit_cash(conn, user_id, delta).await?;
    if rows == 0 {
        let user = users::get_by_id(conn, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", user_id.to_string()))?;
        return Err(AppError::InsufficientBalance {
            ticker: base_ticker.to_string(),
            required: delta,
            available: user.balance,
        });
    }
    Ok(())
}

pub async fn credit_inventory(
    conn: &mut PgConnection,
    user_id: Uuid,
    ticker: &str,
    delta: i64,
) -> Result<(), AppError> {
    debug_assert!(delta > 0);
    let rows = inventories::credit(conn, user_id, ticker, delta).await?;
    if rows == 0 {
        return Err(AppError::not_found("Inventory", ticker));
    }
    Ok(())
}

pub async fn debit_inventory(
    conn: &mut PgConnection,
    user_id: Uuid,
    ticker: &str,
    delta: i64,
) -> Result<(), AppError> {
    debug_assert!(delta > 0);
    let rows = inventories::try_debit(conn, user_id, ticker, delta).await?;
    if rows == 0 {
        let inventory = inventories::get(conn, user_id, ticker)
            .await?
            .ok_or_else(|| AppError::not_found("Inventory", ticker))?;
        return Err(AppError::InsufficientBalance {
            ticker: ticker.to_string(),
            required: delta,
            available: inventory.quantity,
        });
    }
    Ok(())
}
