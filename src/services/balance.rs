//! Balance Service
//!
//! Per-ticker holdings (available plus frozen) and the admin deposit /
//! withdraw operations.

use std::collections::BTreeMap;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{Direction, Order};
use crate::services::ledger;
use crate::store::{instruments, inventories, orders, users};

/// Total holdings per ticker: inventory quantity per instrument, cash under
/// the base ticker, plus the frozen portion held in open orders added back.
pub async fn user_balance(
    conn: &mut PgConnection,
    config: &AppConfig,
    user_id: Uuid,
) -> Result<BTreeMap<String, i64>, AppError> {
    let user = users::get_by_id(&mut *conn, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", user_id.to_string()))?;

    let mut balances = BTreeMap::new();
    for inventory in inventories::list_for_user(&mut *conn, user_id).await? {
        balances.insert(inventory.instrument_ticker, inventory.quantity);
    }
    balances.insert(config.base_ticker.clone(), user.balance);

    let open_orders = orders::open_for_user(&mut *conn, user_id).await?;
    add_frozen_holdings(&mut balances, &config.base_ticker, &open_orders);

    Ok(balances)
}

/// Add each open order's frozen quantum back onto the owner's holdings:
/// an ASK froze `amount` units of its ticker, a priced BID froze
/// `amount * price` cash.
pub fn add_frozen_holdings(
    balances: &mut BTreeMap<String, i64>,
    base_ticker: &str,
    open_orders: &[Order],
) {
    for order in open_orders {
        if let Some((direction, quantum)) = order.frozen_quantum() {
            let ticker = match direction {
                Direction::Ask => order.instrument_ticker.clone(),
                Direction::Bid => base_ticker.to_string(),
            };
            *balances.entry(ticker).or_insert(0) += quantum;
        }
    }
}

/// Admin deposit of `amount > 0` of `ticker` to a user.
pub async fn deposit(
    conn: &mut PgConnection,
    config: &AppConfig,
    user_id: Uuid,
    ticker: &str,
    amount: i64,
) -> Result<(), AppError> {
    users::get_by_id(&mut *conn, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", user_id.to_string()))?;

    if ticker == config.base_ticker {
        ledger::credit_cash(&mut *conn, user_id, amount).await
    } else {
        instruments::get_by_ticker(&mut *conn, ticker)
            .await?
            .ok_or_else(|| AppError::not_found("Instrument", ticker))?;
        ledger::credit_inventory(&mut *conn, user_id, ticker, amount).await
    }
}

/// Admin withdrawal of `amount > 0` of `ticker` from a user's *available*
/// holdings. Frozen funds cannot be withdrawn.
pub async fn withdraw(
    conn: &mut PgConnection,
    config: &AppConfig,
    user_id: Uuid,
    ticker: &str,
    amount: i64,
) -> Result<(), AppError> {
    users::get_by_id(&mut *conn, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", user_id.to_string()))?;

    if ticker == config.base_ticker {
        ledger::debit_cash(&mut *conn, &config.base_ticker, user_id, amount).await
    } else {
        instruments::get_by_ticker(&mut *conn, ticker)
            .await?
            .ok_or_else(|| AppError::not_found("Instrument", ticker))?;
        ledger::debit_inventory(&mut *conn, user_id, ticker, amount).await
    }
}
