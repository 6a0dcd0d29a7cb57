//! Order Lifecycle Orchestrator
//!
//! Owns the submission and cancellation state machines and is the only code
//! that commits or rolls back the per-request transaction. Everything a
//! submission does — book read, matching, settlement, residue freeze, order
//! persistence — happens inside one transaction rooted here, serialized per
//! instrument by the instrument row lock.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{Direction, Order, OrderStatus};
use crate::services::{freeze, settlement};
use crate::store::{instruments, orders};

use super::matcher::match_against_book;

/// Submit an order. Returns the persisted order; a returned CANCELLED status
/// means a market order found insufficient depth (the caller surfaces that
/// as a business-level failure).
pub async fn submit(
    pool: &PgPool,
    config: &AppConfig,
    owner_id: Uuid,
    ticker: &str,
    direction: Direction,
    qty: i64,
    price: Option<i64>,
) -> Result<Order, AppError> {
    if ticker == config.base_ticker {
        return Err(AppError::Validation(format!(
            "instrument '{ticker}' is the base currency and cannot be traded"
        )));
    }
    if let Some(limit) = price {
        // any fill or freeze derived from this order stays within i64
        qty.checked_mul(limit)
            .ok_or_else(|| AppError::Validation("order value is too large".to_string()))?;
    }

    let mut tx = pool.begin().await?;
    match run_submission(&mut *tx, config, owner_id, ticker, direction, qty, price).await {
        Ok(Some(order)) => {
            tx.commit().await?;
            tracing::info!(
                "order {} submitted: {} {} x {:?} {} -> {}",
                order.id,
                direction,
                qty,
                price,
                ticker,
                order.status
            );
            Ok(order)
        }
        Ok(None) => {
            // Market residue cannot rest: undo every posting of this
            // submission, then commit only the cancelled order record.
            tx.rollback().await?;
            let cancelled = Order {
                id: Uuid::new_v4(),
                user_id: owner_id,
                instrument_ticker: ticker.to_string(),
                direction,
                amount: qty,
                filled: 0,
                price: None,
                status: OrderStatus::Cancelled,
                created_at: chrono::Utc::now(),
            };
            let mut tx = pool.begin().await?;
            orders::insert(&mut *tx, &cancelled).await?;
            tx.commit().await?;
            tracing::warn!(
                "market order {} cancelled: not enough depth in {}",
                cancelled.id,
                ticker
            );
            Ok(cancelled)
        }
        Err(e) => {
            tx.rollback().await.ok();
            Err(e)
        }
    }
}

/// The in-transaction part of submission. `Ok(None)` signals a market-order
/// residue, which the caller resolves by unwinding the whole transaction.
async fn run_submission(
    conn: &mut PgConnection,
    config: &AppConfig,
    owner_id: Uuid,
    ticker: &str,
    direction: Direction,
    qty: i64,
    price: Option<i64>,
) -> Result<Option<Order>, AppError> {
    instruments::lock(&mut *conn, ticker)
        .await?
        .ok_or_else(|| AppError::not_found("Instrument", ticker))?;

    // One fill consumes at least one unit, so at most qty resting orders
    // can participate.
    let mut book = orders::resting(&mut *conn, ticker, direction.opposite(), qty).await?;

    let mut order = Order {
        id: Uuid::new_v4(),
        user_id: owner_id,
        instrument_ticker: ticker.to_string(),
        direction,
        amount: qty,
        filled: 0,
        price,
        status: OrderStatus::New,
        created_at: chrono::Utc::now(),
    };

    let fills = match_against_book(&mut order, &mut book);

    for fill in &fills {
        settlement::settle_fill(&mut *conn, config, fill).await?;
    }
    for maker in book.iter().filter(|o| fills.iter().any(|f| f.resting_order_id == o.id)) {
        orders::write_back(&mut *conn, maker).await?;
    }

    if order.amount == 0 {
        order.status = OrderStatus::Executed;
        orders::insert(&mut *conn, &order).await?;
        return Ok(Some(order));
    }

    let Some(limit) = order.price else {
        return Ok(None);
    };

    let residue = order.amount;
    match direction {
        Direction::Bid => {
            freeze::freeze(
                &mut *conn,
                config,
                owner_id,
                &config.base_ticker,
                residue * limit,
            )
            .await
        }
        Direction::Ask => freeze::freeze(&mut *conn, config, owner_id, ticker, residue).await,
    }
    .map_err(|e| match e {
        // a residue the owner cannot cover fails the whole submission
        e @ AppError::InsufficientBalance { .. } => AppError::OrderExecution(e.to_string()),
        other => other,
    })?;

    order.status = if order.filled > 0 {
        OrderStatus::PartiallyExecuted
    } else {
        OrderStatus::New
    };
    orders::insert(&mut *conn, &order).await?;
    Ok(Some(order))
}

/// Cancel a resting order and return its frozen residue to the owner.
pub async fn cancel(
    pool: &PgPool,
    config: &AppConfig,
    order_id: Uuid,
    owner_id: Uuid,
) -> Result<Order, AppError> {
    let mut tx = pool.begin().await?;
    match run_cancellation(&mut *tx, config, order_id, owner_id).await {
        Ok(order) => {
            tx.commit().await?;
            tracing::info!("order {} cancelled by owner", order.id);
            Ok(order)
        }
        Err(e) => {
            tx.rollback().await.ok();
            Err(e)
        }
    }
}

async fn run_cancellation(
    conn: &mut PgConnection,
    config: &AppConfig,
    order_id: Uuid,
    owner_id: Uuid,
) -> Result<Order, AppError> {
    let preliminary = orders::get_by_id(&mut *conn, order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order", order_id.to_string()))?;
    if preliminary.user_id != owner_id {
        return Err(AppError::Forbidden("Order does not belong to user".to_string()));
    }

    // Serialize with in-flight matching on this instrument, then re-read:
    // the order may have filled while we waited for the lock.
    instruments::lock(&mut *conn, &preliminary.instrument_ticker)
        .await?
        .ok_or_else(|| {
            AppError::not_found("Instrument", preliminary.instrument_ticker.clone())
        })?;
    let mut order = orders::get_by_id(&mut *conn, order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order", order_id.to_string()))?;

    if order.status != OrderStatus::New {
        return Err(AppError::OrderExecution(
            "Order already executed/partially_executed/cancelled".to_string(),
        ));
    }
    // market orders never rest; a priceless row here means corruption
    let Some(price) = order.price else {
        return Err(AppError::OrderExecution(
            "Cannot cancel market order".to_string(),
        ));
    };

    match order.direction {
        Direction::Ask => {
            freeze::unfreeze(
                &mut *conn,
                config,
                owner_id,
                &order.instrument_ticker,
                order.amount,
            )
            .await?
        }
        Direction::Bid => {
            freeze::unfreeze(
                &mut *conn,
                config,
                owner_id,
                &config.base_ticker,
                order.amount * price,
            )
            .await?
        }
    }

    order.status = OrderStatus::Cancelled;
    orders::write_back(&mut *conn, &order).await?;
    Ok(order)
}
