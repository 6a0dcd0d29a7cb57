use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::User;

pub async fn insert(conn: &mut PgConnection, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO users (id, name, role, balance, api_key) VALUES ($1, $2, $3, $4, $5)")
        .bind(user.id)
        .bind(&user.name)
        .bind(user.role)
        .bind(user.balance)
        .bind(&user.api_key)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn get_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, name, role, balance, api_key FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn update_api_key(
    conn: &mut PgConnection,
    id: Uuid,
    api_key: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET api_key = $1 WHERE id = $2")
        .bind(api_key)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Cascades to the user's orders and inventories; trades keep NULLed refs.
pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Unconditional cash credit.
pub async fn credit_cash(
    conn: &mut PgConnection,
    id: Uuid,
    delta: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET balance = balance + $1 WHERE id = $2")
        .bind(delta)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Conditional cash debit; affects no rows when the balance would go
/// negative (the caller turns that into `InsufficientBalance`).
pub async fn try_debit_cash(
    conn: &mut PgConnection,
    id: Uuid,
    delta: i64,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE users SET balance = balance - $1 WHERE id = $2 AND balance >= $1")
            .bind(delta)
            .bind(id)
            .execute(conn)
            .await?;
    Ok(result.rows_affected())
}
