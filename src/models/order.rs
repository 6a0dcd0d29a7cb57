use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use super::format_timestamp;

/// Internal order direction. BID buys, ASK sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_direction", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Bid,
    Ask,
}

impl Direction {
    /// The side of the book an incoming order matches against.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Bid => Direction::Ask,
            Direction::Ask => Direction::Bid,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Bid => write!(f, "BID"),
            Direction::Ask => write!(f, "ASK"),
        }
    }
}

/// Wire-level order side. Requests and responses speak BUY/SELL; storage and
/// matching speak BID/ASK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn direction(self) -> Direction {
        match self {
            Side::Buy => Direction::Bid,
            Side::Sell => Direction::Ask,
        }
    }
}

impl From<Direction> for Side {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Bid => Side::Buy,
            Direction::Ask => Side::Sell,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    PartiallyExecuted,
    Executed,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::New => write!(f, "NEW"),
            OrderStatus::PartiallyExecuted => write!(f, "PARTIALLY_EXECUTED"),
            OrderStatus::Executed => write!(f, "EXECUTED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// A trading order. `amount` is the unfilled remainder; `filled` what has
/// executed; `amount + filled` equals the originally submitted quantity at
/// all times. `price` is absent for market orders.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub instrument_ticker: String,
    pub direction: Direction,
    pub amount: i64,
    pub filled: i64,
    pub price: Option<i64>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Originally submitted quantity.
    pub fn qty(&self) -> i64 {
        self.amount + self.filled
    }

    pub fn is_resting(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::New | OrderStatus::PartiallyExecuted
        )
    }

    /// Funds reserved against this order while it rests: units of its own
    /// ticker for an ASK, `amount * price` cash for a priced BID.
    pub fn frozen_quantum(&self) -> Option<(Direction, i64)> {
        match self.direction {
            Direction::Ask => Some((Direction::Ask, self.amount)),
            Direction::Bid => self.price.map(|p| (Direction::Bid, self.amount * p)),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub direction: Side,
    #[validate(custom = "crate::models::validate_ticker")]
    pub ticker: String,
    #[validate(range(min = 1))]
    pub qty: i64,
    #[validate(range(min = 1))]
    pub price: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: Uuid,
}

/// Order body echoed inside GET responses, in wire (BUY/SELL) terms.
#[derive(Debug, Serialize)]
pub struct OrderBody {
    pub direction: Side,
    pub ticker: String,
    pub qty: i64,
    pub price: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub status: OrderStatus,
    pub user_id: Uuid,
    pub timestamp: String,
    pub body: OrderBody,
    pub filled: i64,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            status: order.status,
            user_id: order.user_id,
            timestamp: format_timestamp(order.created_at),
            body: OrderBody {
                direction: order.direction.into(),
                ticker: order.instrument_ticker.clone(),
                qty: order.qty(),
                price: order.price,
            },
            filled: order.filled,
        }
    }
}

/// One aggregated price level of the public book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct OrderbookLevel {
    pub price: i64,
    pub qty: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderbookResponse {
    pub bid_levels: Vec<OrderbookLevel>,
    pub ask_levels: Vec<OrderbookLevel>,
}
