//! Schema Bootstrap
//!
//! Idempotent DDL executed at startup. CHECK constraints mirror the core
//! accounting invariants: balances and inventories never go negative, order
//! quantities never go negative. Deleting a user or instrument cascades to
//! orders and inventories; trades keep their rows with NULLed references so
//! the audit history survives.

use sqlx::PgPool;

use crate::config::AppConfig;

/// Create types and tables if missing, then ensure the base instrument row.
pub async fn init_schema(pool: &PgPool, config: &AppConfig) -> Result<(), sqlx::Error> {
    tracing::info!("Initializing database schema...");

    for ddl in [
        CREATE_TYPE_USER_ROLE,
        CREATE_TYPE_ORDER_DIRECTION,
        CREATE_TYPE_ORDER_STATUS,
        CREATE_USERS_TABLE,
        CREATE_INSTRUMENTS_TABLE,
        CREATE_INVENTORIES_TABLE,
        CREATE_ORDERS_TABLE,
        CREATE_ORDERS_BOOK_INDEX,
        CREATE_TRADES_TABLE,
        CREATE_TRADES_TICKER_INDEX,
    ] {
        sqlx::query(ddl).execute(pool).await?;
    }

    // The cash ticker must exist before anything else can be registered.
    sqlx::query(
        "INSERT INTO instruments (ticker, name) VALUES ($1, $2) ON CONFLICT (ticker) DO NOTHING",
    )
    .bind(&config.base_ticker)
    .bind("Base currency")
    .execute(pool)
    .await?;

    tracing::info!(
        "Database schema initialized (base instrument: {})",
        config.base_ticker
    );
    Ok(())
}

const CREATE_TYPE_USER_ROLE: &str = r#"
DO $$ BEGIN
    CREATE TYPE user_role AS ENUM ('user', 'admin');
EXCEPTION WHEN duplicate_object THEN NULL;
END $$
"#;

const CREATE_TYPE_ORDER_DIRECTION: &str = r#"
DO $$ BEGIN
    CREATE TYPE order_direction AS ENUM ('BID', 'ASK');
EXCEPTION WHEN duplicate_object THEN NULL;
END $$
"#;

const CREATE_TYPE_ORDER_STATUS: &str = r#"
DO $$ BEGIN
    CREATE TYPE order_status AS ENUM ('NEW', 'PARTIALLY_EXECUTED', 'EXECUTED', 'CANCELLED');
EXCEPTION WHEN duplicate_object THEN NULL;
END $$
"#;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    role user_role NOT NULL DEFAULT 'user',
    balance BIGINT NOT NULL DEFAULT 0 CHECK (balance >= 0),
    api_key TEXT
)
"#;

const CREATE_INSTRUMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS instruments (
    ticker VARCHAR(10) PRIMARY KEY,
    name VARCHAR(100) NOT NULL
)
"#;

const CREATE_INVENTORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS inventories (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    instrument_ticker VARCHAR(10) NOT NULL REFERENCES instruments(ticker) ON DELETE CASCADE,
    quantity BIGINT NOT NULL DEFAULT 0 CHECK (quantity >= 0),
    UNIQUE (user_id, instrument_ticker)
)
"#;

const CREATE_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    instrument_ticker VARCHAR(10) NOT NULL REFERENCES instruments(ticker) ON DELETE CASCADE,
    direction order_direction NOT NULL,
    amount BIGINT NOT NULL CHECK (amount >= 0),
    filled BIGINT NOT NULL DEFAULT 0 CHECK (filled >= 0),
    price BIGINT CHECK (price IS NULL OR price > 0),
    status order_status NOT NULL DEFAULT 'NEW',
    created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
)
"#;

// Book-view scans: one side of one instrument, resting statuses only.
const CREATE_ORDERS_BOOK_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_orders_book
    ON orders (instrument_ticker, direction, price, created_at)
    WHERE status IN ('NEW', 'PARTIALLY_EXECUTED')
"#;

const CREATE_TRADES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS trades (
    id UUID PRIMARY KEY,
    seller_id UUID REFERENCES users(id) ON DELETE SET NULL,
    buyer_id UUID REFERENCES users(id) ON DELETE SET NULL,
    instrument_ticker VARCHAR(10) REFERENCES instruments(ticker) ON DELETE SET NULL,
    amount BIGINT NOT NULL CHECK (amount > 0),
    price BIGINT NOT NULL CHECK (price > 0),
    executed_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
)
"#;

const CREATE_TRADES_TICKER_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_trades_ticker_time
    ON trades (instrument_ticker, executed_at DESC)
"#;
