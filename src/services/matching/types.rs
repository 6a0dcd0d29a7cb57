use uuid::Uuid;

use crate::models::Direction;

/// One matching event between the incoming order and a resting order.
///
/// `price` is always the resting order's price (maker pricing); the incoming
/// side gets the price improvement. `resting_direction` tells settlement
/// which counterparty's funds already left their available pool at freeze
/// time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    pub seller_id: Uuid,
    pub buyer_id: Uuid,
    pub ticker: String,
    pub price: i64,
    pub amount: i64,
    pub resting_order_id: Uuid,
    pub resting_direction: Direction,
}

impl Fill {
    /// Cash leg of the fill.
    pub fn cash_value(&self) -> i64 {
        self.amount * self.price
    }
}
