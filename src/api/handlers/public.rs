//! Public API Handlers
//!
//! Registration and the unauthenticated read-only views: instrument list,
//! aggregated order book, recent trades.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    Direction, Instrument, OrderbookResponse, RegisterRequest, Role, TradeResponse, User,
    UserResponse,
};
use crate::store::{instruments, inventories, orders, trades, users};
use crate::AppState;

use super::validate;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    /// 1-100, default 10.
    fn resolve(&self) -> Result<i64, AppError> {
        match self.limit {
            None => Ok(10),
            Some(limit) if (1..=100).contains(&limit) => Ok(limit),
            Some(limit) => Err(AppError::Validation(format!(
                "limit must be between 1 and 100, got {limit}"
            ))),
        }
    }
}

/// Create a user and issue its API token. The token is persisted on the user
/// row inside the same transaction, so the credential a client receives is
/// always the one on record.
///
/// POST /api/v1/public/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, AppError> {
    validate(&req)?;

    let mut tx = state.db.pool.begin().await?;

    let mut user = User {
        id: Uuid::new_v4(),
        name: req.name,
        role: Role::User,
        balance: 0,
        api_key: None,
    };
    users::insert(&mut tx, &user).await?;
    inventories::create_rows_for_user(&mut tx, user.id, &state.config.base_ticker).await?;

    let token = state
        .jwt
        .generate_token(&user)
        .map_err(|e| AppError::Internal(format!("failed to issue token: {e}")))?;
    users::update_api_key(&mut tx, user.id, &token).await?;
    user.api_key = Some(token);

    tx.commit().await?;

    tracing::info!("registered user {} ({})", user.name, user.id);
    Ok(Json(user.into()))
}

/// GET /api/v1/public/instrument
pub async fn list_instruments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Instrument>>, AppError> {
    let mut conn = state.db.pool.acquire().await?;
    let list = instruments::list(&mut conn).await?;
    Ok(Json(list))
}

/// Aggregated book: bids descending, asks ascending, at most `limit` levels
/// per side.
///
/// GET /api/v1/public/orderbook/{ticker}
pub async fn get_orderbook(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<OrderbookResponse>, AppError> {
    let limit = query.resolve()?;

    let mut conn = state.db.pool.acquire().await?;
    instruments::get_by_ticker(&mut conn, &ticker)
        .await?
        .ok_or_else(|| AppError::not_found("Instrument", &*ticker))?;

    let bid_levels = orders::book_levels(&mut conn, &ticker, Direction::Bid, limit).await?;
    let ask_levels = orders::book_levels(&mut conn, &ticker, Direction::Ask, limit).await?;

    Ok(Json(OrderbookResponse {
        bid_levels,
        ask_levels,
    }))
}

/// Recent trades, newest first.
///
/// GET /api/v1/public/transactions/{ticker}
pub async fn get_transactions(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<TradeResponse>>, AppError> {
    let limit = query.resolve()?;

    let mut conn = state.db.pool.acquire().await?;
    instruments::get_by_ticker(&mut conn, &ticker)
        .await?
        .ok_or_else(|| AppError::not_found("Instrument", &*ticker))?;

    let list = trades::recent_by_ticker(&mut conn, &ticker, limit).await?;
    Ok(Json(list.into_iter().map(TradeResponse::from).collect()))
}
