use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::{Direction, Order, OrderbookLevel};

const ORDER_COLUMNS: &str =
    "id, user_id, instrument_ticker, direction, amount, filled, price, status, created_at";

pub async fn insert(conn: &mut PgConnection, order: &Order) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO orders (id, user_id, instrument_ticker, direction, amount, filled, price, status, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(&order.instrument_ticker)
    .bind(order.direction)
    .bind(order.amount)
    .bind(order.filled)
    .bind(order.price)
    .bind(order.status)
    .bind(order.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn get_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

pub async fn list_for_user(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at"
    ))
    .bind(user_id)
    .fetch_all(conn)
    .await
}

/// Open (NEW or PARTIALLY_EXECUTED) orders of one user, for the frozen-funds
/// add-back of the balance query.
pub async fn open_for_user(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders \
         WHERE user_id = $1 AND status IN ('NEW', 'PARTIALLY_EXECUTED')"
    ))
    .bind(user_id)
    .fetch_all(conn)
    .await
}

/// Resting orders on one side of one instrument in matching priority:
/// best price first (ascending for ASK, descending for BID), then oldest
/// first, then id as a deterministic tie-break.
pub async fn resting(
    conn: &mut PgConnection,
    ticker: &str,
    side: Direction,
    limit: i64,
) -> Result<Vec<Order>, sqlx::Error> {
    let price_order = match side {
        Direction::Ask => "price ASC",
        Direction::Bid => "price DESC",
    };
    sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders \
         WHERE instrument_ticker = $1 AND direction = $2 \
           AND status IN ('NEW', 'PARTIALLY_EXECUTED') \
         ORDER BY {price_order}, created_at ASC, id ASC \
         LIMIT $3"
    ))
    .bind(ticker)
    .bind(side)
    .bind(limit)
    .fetch_all(conn)
    .await
}

/// Aggregated resting quantity per price level for the public book.
pub async fn book_levels(
    conn: &mut PgConnection,
    ticker: &str,
    side: Direction,
    limit: i64,
) -> Result<Vec<OrderbookLevel>, sqlx::Error> {
    let price_order = match side {
        Direction::Ask => "price ASC",
        Direction::Bid => "price DESC",
    };
    sqlx::query_as::<_, OrderbookLevel>(&format!(
        "SELECT price, SUM(amount)::BIGINT AS qty FROM orders \
         WHERE instrument_ticker = $1 AND direction = $2 \
           AND status IN ('NEW', 'PARTIALLY_EXECUTED') \
         GROUP BY price ORDER BY {price_order} LIMIT $3"
    ))
    .bind(ticker)
    .bind(side)
    .bind(limit)
    .fetch_all(conn)
    .await
}

/// Write back the matcher's mutation of one order (fill progress + status).
pub async fn write_back(conn: &mut PgConnection, order: &Order) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET amount = $1, filled = $2, status = $3 WHERE id = $4")
        .bind(order.amount)
        .bind(order.filled)
        .bind(order.status)
        .bind(order.id)
        .execute(conn)
        .await?;
    Ok(())
}
