use sqlx::PgConnection;

use crate::models::Trade;

pub async fn insert(conn: &mut PgConnection, trade: &Trade) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO trades (id, seller_id, buyer_id, instrument_ticker, amount, price, executed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(trade.id)
    .bind(trade.seller_id)
    .bind(trade.buyer_id)
    .bind(&trade.instrument_ticker)
    .bind(trade.amount)
    .bind(trade.price)
    .bind(trade.executed_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Most recent trades of one instrument, newest first.
pub async fn recent_by_ticker(
    conn: &mut PgConnection,
    ticker: &str,
    limit: i64,
) -> Result<Vec<Trade>, sqlx::Error> {
    sqlx::query_as::<_, Trade>(
        "SELECT id, seller_id, buyer_id, instrument_ticker, amount, price, executed_at \
         FROM trades WHERE instrument_ticker = $1 \
         ORDER BY executed_at DESC LIMIT $2",
    )
    .bind(ticker)
    .bind(limit)
    .fetch_all(conn)
    .await
}
