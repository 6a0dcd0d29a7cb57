//! Matcher
//!
//! Walks the opposite side of the book in priority order and pairs the
//! incoming order against each head until its quantity is spent or its limit
//! price stops crossing. Mutates the in-memory copies only; persistence is
//! the orchestrator's job.

use crate::models::{Direction, Order, OrderStatus};

use super::types::Fill;

/// Match `incoming` against `book`, which must already be in book-view
/// priority order (best price first, then oldest). Returns the fills in
/// execution order. Both `incoming` and the touched book entries have their
/// `amount`/`filled` advanced; touched entries get EXECUTED or
/// PARTIALLY_EXECUTED status. The incoming order's status is left to the
/// caller, which also decides the fate of any residue.
pub fn match_against_book(incoming: &mut Order, book: &mut [Order]) -> Vec<Fill> {
    let mut fills = Vec::new();

    for head in book.iter_mut() {
        if incoming.amount == 0 {
            break;
        }

        // Resting orders always carry a price; a priceless head means a
        // corrupt book and matching stops rather than guessing.
        let Some(head_price) = head.price else {
            break;
        };

        // Limit orders stop once the head no longer crosses. Market orders
        // (no price) take every level.
        if let Some(limit) = incoming.price {
            let crossed = match incoming.direction {
                Direction::Bid => head_price <= limit,
                Direction::Ask => head_price >= limit,
            };
            if !crossed {
                break;
            }
        }

        let take = incoming.amount.min(head.amount);
        let (seller_id, buyer_id) = match incoming.direction {
            Direction::Bid => (head.user_id, incoming.user_id),
            Direction::Ask => (incoming.user_id, head.user_id),
        };

        fills.push(Fill {
            seller_id,
            buyer_id,
            ticker: incoming.instrument_ticker.clone(),
            price: head_price,
            amount: take,
            resting_order_id: head.id,
            resting_direction: head.direction,
        });

        incoming.amount -= take;
        incoming.filled += take;
        head.amount -= take;
        head.filled += take;
        head.status = if head.amount == 0 {
            OrderStatus::Executed
        } else {
            OrderStatus::PartiallyExecuted
        };
    }

    fills
}
