use sqlx::PgConnection;

use crate::models::Instrument;

pub async fn get_by_ticker(
    conn: &mut PgConnection,
    ticker: &str,
) -> Result<Option<Instrument>, sqlx::Error> {
    sqlx::query_as::<_, Instrument>("SELECT ticker, name FROM instruments WHERE ticker = $1")
        .bind(ticker)
        .fetch_optional(conn)
        .await
}

/// Row-lock the instrument for the rest of the transaction. Submissions and
/// cancellations on one instrument serialize on this lock; other instruments
/// proceed in parallel.
pub async fn lock(
    conn: &mut PgConnection,
    ticker: &str,
) -> Result<Option<Instrument>, sqlx::Error> {
    sqlx::query_as::<_, Instrument>(
        "SELECT ticker, name FROM instruments WHERE ticker = $1 FOR UPDATE",
    )
    .bind(ticker)
    .fetch_optional(conn)
    .await
}

pub async fn list(conn: &mut PgConnection) -> Result<Vec<Instrument>, sqlx::Error> {
    sqlx::query_as::<_, Instrument>("SELECT ticker, name FROM instruments ORDER BY ticker")
        .fetch_all(conn)
        .await
}

pub async fn insert(conn: &mut PgConnection, instrument: &Instrument) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO instruments (ticker, name) VALUES ($1, $2)")
        .bind(&instrument.ticker)
        .bind(&instrument.name)
        .execute(conn)
        .await?;
    Ok(())
}

/// Cascades to orders and inventories; trades keep NULLed refs.
pub async fn delete(conn: &mut PgConnection, ticker: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM instruments WHERE ticker = $1")
        .bind(ticker)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
