//! Settlement
//!
//! Turns each fill into ledger postings and a trade record, inside the
//! submission's transaction.
//!
//! The plan branches on which side was *resting*, not on buy/sell: the
//! resting counterparty's funds or units already left their available pool
//! when their order was placed (they are held in the order's residue), so
//! settlement only debits the incoming side and credits both. Debiting the
//! resting side again would double-spend the freeze.

use chrono::Utc;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{Direction, Trade};
use crate::services::ledger;
use crate::services::matching::Fill;
use crate::store::trades;

/// A single ledger movement. Cash lives on the user row; inventory is
/// per (user, ticker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Posting {
    CreditCash { user_id: Uuid, delta: i64 },
    DebitCash { user_id: Uuid, delta: i64 },
    CreditInventory { user_id: Uuid, ticker: String, delta: i64 },
    DebitInventory { user_id: Uuid, ticker: String, delta: i64 },
}

/// Ledger movements for one fill.
///
/// Resting ASK (incoming BID): the seller's units were debited at freeze
/// time, so the cash leg moves now and the withheld units go to the buyer.
/// Resting BID (incoming ASK): the buyer's cash was debited at freeze time,
/// so the inventory leg moves now and the withheld cash goes to the seller.
pub fn plan_fill(fill: &Fill) -> Vec<Posting> {
    let cash = fill.cash_value();
    match fill.resting_direction {
        Direction::Ask => vec![
            Posting::DebitCash {
                user_id: fill.buyer_id,
                delta: cash,
            },
            Posting::CreditCash {
                user_id: fill.seller_id,
                delta: cash,
            },
            Posting::CreditInventory {
                user_id: fill.buyer_id,
                ticker: fill.ticker.clone(),
                delta: fill.amount,
            },
        ],
        Direction::Bid => vec![
            Posting::DebitInventory {
                user_id: fill.seller_id,
                ticker: fill.ticker.clone(),
                delta: fill.amount,
            },
            Posting::CreditInventory {
                user_id: fill.buyer_id,
                ticker: fill.ticker.clone(),
                delta: fill.amount,
            },
            Posting::CreditCash {
                user_id: fill.seller_id,
                delta: cash,
            },
        ],
    }
}

/// Execute a posting plan through the ledger.
pub async fn apply(
    conn: &mut PgConnection,
    config: &AppConfig,
    postings: &[Posting],
) -> Result<(), AppError> {
    for posting in postings {
        match posting {
            Posting::CreditCash { user_id, delta } => {
                ledger::credit_cash(conn, *user_id, *delta).await?
            }
            Posting::DebitCash { user_id, delta } => {
                ledger::debit_cash(conn, &config.base_ticker, *user_id, *delta).await?
            }
            Posting::CreditInventory {
                user_id,
                ticker,
                delta,
            } => ledger::credit_inventory(conn, *user_id, ticker, *delta).await?,
            Posting::DebitInventory {
                user_id,
                ticker,
                delta,
            } => ledger::debit_inventory(conn, *user_id, ticker, *delta).await?,
        }
    }
    Ok(())
}

/// Post one fill's ledger movements and append its trade record.
pub async fn settle_fill(
    conn: &mut PgConnection,
    config: &AppConfig,
    fill: &Fill,
) -> Result<Trade, AppError> {
    apply(conn, config, &plan_fill(fill)).await?;

    let trade = Trade {
        id: Uuid::new_v4(),
        seller_id: Some(fill.seller_id),
        buyer_id: Some(fill.buyer_id),
        instrument_ticker: Some(fill.ticker.clone()),
        amount: fill.amount,
        price: fill.price,
        executed_at: Utc::now(),
    };
    trades::insert(conn, &trade).await?;

    tracing::debug!(
        "settled fill: {} x {} {} (seller {}, buyer {})",
        fill.amount,
        fill.price,
        fill.ticker,
        fill.seller_id,
        fill.buyer_id
    );
    Ok(trade)
}
