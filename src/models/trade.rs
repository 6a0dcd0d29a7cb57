use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::format_timestamp;

/// An executed exchange of `amount` units at `price` per unit. Append-only;
/// counterparty references go NULL if the user or instrument is deleted so
/// the audit trail survives cascades.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trade {
    pub id: Uuid,
    pub seller_id: Option<Uuid>,
    pub buyer_id: Option<Uuid>,
    pub instrument_ticker: Option<String>,
    pub amount: i64,
    pub price: i64,
    pub executed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TradeResponse {
    pub ticker: String,
    pub amount: i64,
    pub price: i64,
    pub timestamp: String,
}

impl From<Trade> for TradeResponse {
    fn from(trade: Trade) -> Self {
        Self {
            ticker: trade.instrument_ticker.unwrap_or_default(),
            amount: trade.amount,
            price: trade.price,
            timestamp: format_timestamp(trade.executed_at),
        }
    }
}
