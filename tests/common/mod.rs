#![allow(dead_code)]

//! Shared test harness: an in-memory accounts model driven through the pure
//! matching and settlement core, mirroring the submission and cancellation
//! state machines so their semantics can be exercised without Postgres.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use spotbook_backend::models::{Direction, Order, OrderStatus};
use spotbook_backend::services::matching::{match_against_book, Fill};
use spotbook_backend::services::settlement::{plan_fill, Posting};

pub const BASE: &str = "RUB";
pub const COIN: &str = "MEMCOIN";

/// Available (non-frozen) holdings per user.
#[derive(Debug, Clone, Default)]
pub struct Accounts {
    pub cash: HashMap<Uuid, i64>,
    pub inventory: HashMap<(Uuid, String), i64>,
}

impl Accounts {
    pub fn deposit_cash(&mut self, user: Uuid, amount: i64) {
        *self.cash.entry(user).or_insert(0) += amount;
    }

    pub fn deposit_units(&mut self, user: Uuid, ticker: &str, amount: i64) {
        *self.inventory.entry((user, ticker.to_string())).or_insert(0) += amount;
    }

    pub fn cash(&self, user: Uuid) -> i64 {
        self.cash.get(&user).copied().unwrap_or(0)
    }

    pub fn units(&self, user: Uuid, ticker: &str) -> i64 {
        self.inventory
            .get(&(user, ticker.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn debit_cash(&mut self, user: Uuid, delta: i64) -> Result<(), String> {
        let balance = self.cash.entry(user).or_insert(0);
        if *balance < delta {
            return Err(format!(
                "Insufficient {BASE} balance. Required: {delta}, Available: {balance}"
            ));
        }
        *balance -= delta;
        Ok(())
    }

    pub fn debit_units(&mut self, user: Uuid, ticker: &str, delta: i64) -> Result<(), String> {
        let quantity = self.inventory.entry((user, ticker.to_string())).or_insert(0);
        if *quantity < delta {
            return Err(format!(
                "Insufficient {ticker} balance. Required: {delta}, Available: {quantity}"
            ));
        }
        *quantity -= delta;
        Ok(())
    }

    pub fn apply(&mut self, postings: &[Posting]) -> Result<(), String> {
        for posting in postings {
            match posting {
                Posting::CreditCash { user_id, delta } => self.deposit_cash(*user_id, *delta),
                Posting::DebitCash { user_id, delta } => self.debit_cash(*user_id, *delta)?,
                Posting::CreditInventory {
                    user_id,
                    ticker,
                    delta,
                } => self.deposit_units(*user_id, ticker, *delta),
                Posting::DebitInventory {
                    user_id,
                    ticker,
                    delta,
                } => self.debit_units(*user_id, ticker, *delta)?,
            }
        }
        Ok(())
    }
}

/// An exchange over one or more instruments, driving the pure core through
/// the same steps as the lifecycle orchestrator: book view, matcher,
/// settlement postings, residue freeze, cancellation unfreeze, with full
/// rollback on any failure.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub accounts: Accounts,
    pub orders: Vec<Order>,
    pub trades: Vec<Fill>,
    seq: i64,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_order(
        &mut self,
        user: Uuid,
        ticker: &str,
        direction: Direction,
        qty: i64,
        price: Option<i64>,
    ) -> Order {
        self.seq += 1;
        Order {
            id: Uuid::new_v4(),
            user_id: user,
            instrument_ticker: ticker.to_string(),
            direction,
            amount: qty,
            filled: 0,
            price,
            status: OrderStatus::New,
            created_at: Utc.timestamp_opt(1_700_000_000 + self.seq, 0).unwrap(),
        }
    }

    /// Book view: resting orders on `side`, best price first, oldest first.
    pub fn resting(&self, ticker: &str, side: Direction) -> Vec<Order> {
        let mut book: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.is_resting() && o.instrument_ticker == ticker && o.direction == side)
            .cloned()
            .collect();
        book.sort_by(|a, b| {
            let by_price = match side {
                Direction::Ask => a.price.cmp(&b.price),
                Direction::Bid => b.price.cmp(&a.price),
            };
            by_price
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        book
    }

    pub fn best_price(&self, ticker: &str, side: Direction) -> Option<i64> {
        self.resting(ticker, side).first().and_then(|o| o.price)
    }

    pub fn order(&self, id: Uuid) -> &Order {
        self.orders.iter().find(|o| o.id == id).expect("order exists")
    }

    pub fn submit_limit(
        &mut self,
        user: Uuid,
        ticker: &str,
        direction: Direction,
        qty: i64,
        price: i64,
    ) -> Result<Order, String> {
        self.submit(user, ticker, direction, qty, Some(price))
    }

    pub fn submit_market(
        &mut self,
        user: Uuid,
        ticker: &str,
        direction: Direction,
        qty: i64,
    ) -> Result<Order, String> {
        self.submit(user, ticker, direction, qty, None)
    }

    fn submit(
        &mut self,
        user: Uuid,
        ticker: &str,
        direction: Direction,
        qty: i64,
        price: Option<i64>,
    ) -> Result<Order, String> {
        let accounts_checkpoint = self.accounts.clone();
        let orders_checkpoint = self.orders.clone();
        let trades_len = self.trades.len();

        let mut incoming = self.new_order(user, ticker, direction, qty, price);
        let mut book = self.resting(ticker, direction.opposite());
        book.truncate(qty as usize);

        let fills = match_against_book(&mut incoming, &mut book);

        for fill in &fills {
            if let Err(e) = self.accounts.apply(&plan_fill(fill)) {
                self.accounts = accounts_checkpoint;
                self.orders = orders_checkpoint;
                self.trades.truncate(trades_len);
                return Err(e);
            }
        }
        for maker in &book {
            if let Some(slot) = self.orders.iter_mut().find(|o| o.id == maker.id) {
                *slot = maker.clone();
            }
        }
        self.trades.extend(fills.iter().cloned());

        if incoming.amount == 0 {
            incoming.status = OrderStatus::Executed;
            self.orders.push(incoming.clone());
            return Ok(incoming);
        }

        let Some(limit) = incoming.price else {
            // market residue cannot rest: undo this submission entirely and
            // record only the cancelled order
            self.accounts = accounts_checkpoint;
            self.orders = orders_checkpoint;
            self.trades.truncate(trades_len);

            let mut cancelled = self.new_order(user, ticker, direction, qty, None);
            cancelled.status = OrderStatus::Cancelled;
            self.orders.push(cancelled.clone());
            return Ok(cancelled);
        };

        let residue = incoming.amount;
        let frozen = match direction {
            Direction::Bid => self.accounts.debit_cash(user, residue * limit),
            Direction::Ask => self.accounts.debit_units(user, ticker, residue),
        };
        if let Err(e) = frozen {
            self.accounts = accounts_checkpoint;
            self.orders = orders_checkpoint;
            self.trades.truncate(trades_len);
            return Err(e);
        }

        incoming.status = if incoming.filled > 0 {
            OrderStatus::PartiallyExecuted
        } else {
            OrderStatus::New
        };
        self.orders.push(incoming.clone());
        Ok(incoming)
    }

    pub fn cancel(&mut self, order_id: Uuid, user: Uuid) -> Result<Order, String> {
        let idx = self
            .orders
            .iter()
            .position(|o| o.id == order_id)
            .ok_or("Order not found")?;
        let order = self.orders[idx].clone();

        if order.user_id != user {
            return Err("Order does not belong to user".to_string());
        }
        if order.status != OrderStatus::New {
            return Err("Order already executed/partially_executed/cancelled".to_string());
        }
        let price = order.price.ok_or("Cannot cancel market order")?;

        match order.direction {
            Direction::Ask => {
                self.accounts
                    .deposit_units(user, &order.instrument_ticker, order.amount)
            }
            Direction::Bid => self.accounts.deposit_cash(user, order.amount * price),
        }

        self.orders[idx].status = OrderStatus::Cancelled;
        Ok(self.orders[idx].clone())
    }

    /// Total system holdings of `ticker`: available across users plus the
    /// frozen residue held by open orders. Conserved by every submission and
    /// cancellation; only deposits change it.
    pub fn total_holdings(&self, ticker: &str) -> i64 {
        let available: i64 = if ticker == BASE {
            self.accounts.cash.values().sum()
        } else {
            self.accounts
                .inventory
                .iter()
                .filter(|((_, t), _)| t == ticker)
                .map(|(_, q)| q)
                .sum()
        };

        let frozen: i64 = self
            .orders
            .iter()
            .filter(|o| o.is_resting())
            .map(|o| match o.direction {
                Direction::Ask if o.instrument_ticker == ticker => o.amount,
                Direction::Bid if ticker == BASE => o.price.map_or(0, |p| o.amount * p),
                _ => 0,
            })
            .sum();

        available + frozen
    }
}
