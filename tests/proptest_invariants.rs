//! Property-based tests for matching and settlement invariants across
//! randomly generated scenarios.

mod common;

use chrono::{TimeZone, Utc};
use common::{World, BASE, COIN};
use proptest::prelude::*;
use uuid::Uuid;

use spotbook_backend::models::{Direction, Order, OrderStatus};
use spotbook_backend::services::matching::match_against_book;
use spotbook_backend::services::settlement::{plan_fill, Posting};

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Bid), Just(Direction::Ask)]
}

fn price_strategy() -> impl Strategy<Value = i64> {
    1i64..=1_000
}

fn qty_strategy() -> impl Strategy<Value = i64> {
    1i64..=100
}

/// Build a resting book on `side` in book-view priority order.
fn make_book(side: Direction, levels: &[(i64, i64)]) -> Vec<Order> {
    let mut book: Vec<Order> = levels
        .iter()
        .enumerate()
        .map(|(i, (price, qty))| Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            instrument_ticker: COIN.to_string(),
            direction: side,
            amount: *qty,
            filled: 0,
            price: Some(*price),
            status: OrderStatus::New,
            created_at: Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap(),
        })
        .collect();
    book.sort_by(|a, b| {
        let by_price = match side {
            Direction::Ask => a.price.cmp(&b.price),
            Direction::Bid => b.price.cmp(&a.price),
        };
        by_price.then(a.created_at.cmp(&b.created_at))
    });
    book
}

fn incoming_order(direction: Direction, qty: i64, price: Option<i64>) -> Order {
    Order {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        instrument_ticker: COIN.to_string(),
        direction,
        amount: qty,
        filled: 0,
        price,
        status: OrderStatus::New,
        created_at: Utc.timestamp_opt(1_800_000_000, 0).unwrap(),
    }
}

/// One step of exchange activity for the model-based conservation runs.
#[derive(Debug, Clone)]
enum Op {
    Limit {
        user: usize,
        direction: Direction,
        qty: i64,
        price: i64,
    },
    Market {
        user: usize,
        direction: Direction,
        qty: i64,
    },
    Cancel {
        nth: usize,
    },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3, direction_strategy(), qty_strategy(), price_strategy()).prop_map(
            |(user, direction, qty, price)| Op::Limit {
                user,
                direction,
                qty,
                price,
            }
        ),
        (0usize..3, direction_strategy(), qty_strategy())
            .prop_map(|(user, direction, qty)| Op::Market { user, direction, qty }),
        (0usize..64).prop_map(|nth| Op::Cancel { nth }),
    ]
}

fn funded_world() -> (World, [Uuid; 3]) {
    let users = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
    let mut world = World::new();
    for user in users {
        world.accounts.deposit_cash(user, 1_000_000);
        world.accounts.deposit_units(user, COIN, 10_000);
    }
    (world, users)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // ========================================================================
    // QUANTITY CONSERVATION
    // ========================================================================

    /// amount + filled stays equal to the submitted quantity on both sides of
    /// every match, and neither field goes negative.
    #[test]
    fn quantity_conservation(
        levels in prop::collection::vec((price_strategy(), qty_strategy()), 0..20),
        direction in direction_strategy(),
        qty in qty_strategy(),
        limit in prop::option::of(price_strategy()),
    ) {
        let mut book = make_book(direction.opposite(), &levels);
        let initial: Vec<i64> = book.iter().map(Order::qty).collect();
        let mut incoming = incoming_order(direction, qty, limit);

        match_against_book(&mut incoming, &mut book);

        prop_assert_eq!(incoming.amount + incoming.filled, qty);
        prop_assert!(incoming.amount >= 0 && incoming.filled >= 0);
        for (head, qty0) in book.iter().zip(initial) {
            prop_assert_eq!(head.amount + head.filled, qty0);
            prop_assert!(head.amount >= 0 && head.filled >= 0);
        }
    }

    // ========================================================================
    // PRICING
    // ========================================================================

    /// Every trade executes at a resting price, within the incoming limit.
    #[test]
    fn trades_at_resting_price_within_limit(
        levels in prop::collection::vec((price_strategy(), qty_strategy()), 0..20),
        direction in direction_strategy(),
        qty in qty_strategy(),
        limit in price_strategy(),
    ) {
        let mut book = make_book(direction.opposite(), &levels);
        let resting_prices: Vec<i64> = book.iter().filter_map(|o| o.price).collect();
        let mut incoming = incoming_order(direction, qty, Some(limit));

        let fills = match_against_book(&mut incoming, &mut book);

        for fill in &fills {
            prop_assert!(resting_prices.contains(&fill.price));
            match direction {
                Direction::Bid => prop_assert!(fill.price <= limit),
                Direction::Ask => prop_assert!(fill.price >= limit),
            }
        }
    }

    /// Fills consume the book strictly in priority order: the fill sequence
    /// is exactly a prefix of the book view.
    #[test]
    fn fills_follow_priority_order(
        levels in prop::collection::vec((price_strategy(), qty_strategy()), 0..20),
        direction in direction_strategy(),
        qty in qty_strategy(),
    ) {
        let mut book = make_book(direction.opposite(), &levels);
        let book_ids: Vec<Uuid> = book.iter().map(|o| o.id).collect();
        let mut incoming = incoming_order(direction, qty, None);

        let fills = match_against_book(&mut incoming, &mut book);

        let fill_ids: Vec<Uuid> = fills.iter().map(|f| f.resting_order_id).collect();
        prop_assert_eq!(&fill_ids[..], &book_ids[..fill_ids.len()]);
    }

    // ========================================================================
    // SETTLEMENT PLANS
    // ========================================================================

    /// A posting plan never debits the resting side: its available pool was
    /// already charged at freeze time.
    #[test]
    fn settlement_never_debits_resting_side(
        levels in prop::collection::vec((price_strategy(), qty_strategy()), 1..10),
        direction in direction_strategy(),
        qty in qty_strategy(),
    ) {
        let mut book = make_book(direction.opposite(), &levels);
        let mut incoming = incoming_order(direction, qty, None);
        let taker = incoming.user_id;

        let fills = match_against_book(&mut incoming, &mut book);

        for fill in &fills {
            for posting in plan_fill(fill) {
                match posting {
                    Posting::DebitCash { user_id, .. }
                    | Posting::DebitInventory { user_id, .. } => {
                        prop_assert_eq!(user_id, taker);
                    }
                    _ => {}
                }
            }
        }
    }

    // ========================================================================
    // CONSERVATION AND BOOK SHAPE (model-based)
    // ========================================================================

    /// Submissions and cancellations never create or destroy value: for both
    /// the cash and the instrument ticker, available + frozen is constant.
    #[test]
    fn holdings_conserved_by_trading(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let (mut world, users) = funded_world();
        let total_cash = world.total_holdings(BASE);
        let total_units = world.total_holdings(COIN);

        for op in ops {
            match op {
                Op::Limit { user, direction, qty, price } => {
                    let _ = world.submit_limit(users[user], COIN, direction, qty, price);
                }
                Op::Market { user, direction, qty } => {
                    let _ = world.submit_market(users[user], COIN, direction, qty);
                }
                Op::Cancel { nth } => {
                    if !world.orders.is_empty() {
                        let order = world.orders[nth % world.orders.len()].clone();
                        let _ = world.cancel(order.id, order.user_id);
                    }
                }
            }

            prop_assert_eq!(world.total_holdings(BASE), total_cash);
            prop_assert_eq!(world.total_holdings(COIN), total_units);
        }
    }

    /// The resting book never crosses: after any activity, the best ask is
    /// strictly above the best bid (or a side is empty).
    #[test]
    fn book_never_crosses(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let (mut world, users) = funded_world();

        for op in ops {
            match op {
                Op::Limit { user, direction, qty, price } => {
                    let _ = world.submit_limit(users[user], COIN, direction, qty, price);
                }
                Op::Market { user, direction, qty } => {
                    let _ = world.submit_market(users[user], COIN, direction, qty);
                }
                Op::Cancel { nth } => {
                    if !world.orders.is_empty() {
                        let order = world.orders[nth % world.orders.len()].clone();
                        let _ = world.cancel(order.id, order.user_id);
                    }
                }
            }

            if let (Some(bid), Some(ask)) = (
                world.best_price(COIN, Direction::Bid),
                world.best_price(COIN, Direction::Ask),
            ) {
                prop_assert!(ask > bid, "book crossed: best ask {} <= best bid {}", ask, bid);
            }
        }
    }

    /// Market orders never rest: any non-executed market submission comes
    /// back CANCELLED with nothing frozen.
    #[test]
    fn market_orders_never_rest(
        ops in prop::collection::vec(op_strategy(), 0..20),
        user in 0usize..3,
        direction in direction_strategy(),
        qty in qty_strategy(),
    ) {
        let (mut world, users) = funded_world();
        for op in ops {
            if let Op::Limit { user, direction, qty, price } = op {
                let _ = world.submit_limit(users[user], COIN, direction, qty, price);
            }
        }

        let order = world.submit_market(users[user], COIN, direction, qty).unwrap();
        prop_assert!(matches!(
            order.status,
            OrderStatus::Executed | OrderStatus::Cancelled
        ));
        if order.status == OrderStatus::Cancelled {
            prop_assert_eq!(order.filled, 0);
            prop_assert_eq!(order.amount, qty);
        }
    }
}
