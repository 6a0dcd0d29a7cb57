//! Freeze Accountant
//!
//! Moves funds between *available* and *frozen* when an order starts or
//! stops resting. There is no standalone frozen counter: freezing debits the
//! available pool, and the open order's residue (`amount` for an ASK,
//! `amount * price` for a BID) is the live frozen figure until the order
//! executes or is cancelled.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::services::ledger;

/// Reserve `delta` of `ticker` against an open order. Fails with
/// `InsufficientBalance` when the available pool cannot cover it.
pub async fn freeze(
    conn: &mut PgConnection,
    config: &AppConfig,
    user_id: Uuid,
    ticker: &str,
    delta: i64,
) -> Result<(), AppError> {
    if ticker == config.base_ticker {
        ledger::debit_cash(conn, &config.base_ticker, user_id, delta).await
    } else {
        ledger::debit_inventory(conn, user_id, ticker, delta).await
    }
}

/// Return a cancelled order's residue to the available pool.
pub async fn unfreeze(
    conn: &mut PgConnection,
    config: &AppConfig,
    user_id: Uuid,
    ticker: &str,
    delta: i64,
) -> Result<(), AppError> {
    if ticker == config.base_ticker {
        ledger::credit_cash(conn, user_id, delta).await
    } else {
        ledger::credit_inventory(conn, user_id, ticker, delta).await
    }
}
