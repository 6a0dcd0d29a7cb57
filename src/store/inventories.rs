use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::Inventory;

pub async fn get(
    conn: &mut PgConnection,
    user_id: Uuid,
    ticker: &str,
) -> Result<Option<Inventory>, sqlx::Error> {
    sqlx::query_as::<_, Inventory>(
        "SELECT id, user_id, instrument_ticker, quantity FROM inventories \
         WHERE user_id = $1 AND instrument_ticker = $2",
    )
    .bind(user_id)
    .bind(ticker)
    .fetch_optional(conn)
    .await
}

pub async fn list_for_user(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<Inventory>, sqlx::Error> {
    sqlx::query_as::<_, Inventory>(
        "SELECT id, user_id, instrument_ticker, quantity FROM inventories \
         WHERE user_id = $1 ORDER BY instrument_ticker",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}

/// Zero rows for a fresh user across every tradable instrument. The base
/// ticker is excluded: cash lives on the user row.
pub async fn create_rows_for_user(
    conn: &mut PgConnection,
    user_id: Uuid,
    base_ticker: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO inventories (id, user_id, instrument_ticker, quantity) \
         SELECT gen_random_uuid(), $1, ticker, 0 FROM instruments WHERE ticker <> $2 \
         ON CONFLICT (user_id, instrument_ticker) DO NOTHING",
    )
    .bind(user_id)
    .bind(base_ticker)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Zero rows for a fresh instrument across every existing user.
pub async fn create_rows_for_instrument(
    conn: &mut PgConnection,
    ticker: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO inventories (id, user_id, instrument_ticker, quantity) \
         SELECT gen_random_uuid(), id, $1, 0 FROM users \
         ON CONFLICT (user_id, instrument_ticker) DO NOTHING",
    )
    .bind(ticker)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Unconditional inventory credit. Affects no rows when the (user, ticker)
/// row is absent.
pub async fn credit(
    conn: &mut PgConnection,
    user_id: Uuid,
    ticker: &str,
    delta: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE inventories SET quantity = quantity + $1 \
         WHERE user_id = $2 AND instrument_ticker = $3",
    )
    .bind(delta)
    .bind(user_id)
    .bind(ticker)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Conditional inventory debit; affects no rows when the row is absent or
/// the quantity would go negative.
pub async fn try_debit(
    conn: &mut PgConnection,
    user_id: Uuid,
    ticker: &str,
    delta: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE inventories SET quantity = quantity - $1 \
         WHERE user_id = $2 AND instrument_ticker = $3 AND quantity >= $1",
    )
    .bind(delta)
    .bind(user_id)
    .bind(ticker)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}
