//! Admin API Handlers
//!
//! Instrument CRUD, balance deposits/withdrawals, user removal. All routes
//! sit behind the admin guard.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{is_unique_violation, AppError};
use crate::models::{Instrument, InstrumentCreateRequest, UserResponse};
use crate::services::balance;
use crate::store::{instruments, inventories, users};
use crate::AppState;

use super::{validate, SuccessResponse};

#[derive(Debug, Deserialize, Validate)]
pub struct BalanceChangeRequest {
    pub user_id: Uuid,
    #[validate(custom = "crate::models::validate_ticker")]
    pub ticker: String,
    #[validate(range(min = 1))]
    pub amount: i64,
}

/// Create an instrument and zero inventory rows for every existing user.
///
/// POST /api/v1/admin/instrument
pub async fn create_instrument(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InstrumentCreateRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    validate(&req)?;

    let mut tx = state.db.pool.begin().await?;

    if instruments::get_by_ticker(&mut tx, &req.ticker).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Instrument with ticker '{}' already exists",
            req.ticker
        )));
    }

    let instrument = Instrument {
        ticker: req.ticker.clone(),
        name: req.name.clone(),
    };
    if let Err(e) = instruments::insert(&mut tx, &instrument).await {
        // lost a race with a concurrent create
        if is_unique_violation(&e) {
            return Err(AppError::Conflict(format!(
                "Instrument with ticker '{}' already exists",
                req.ticker
            )));
        }
        return Err(e.into());
    }
    inventories::create_rows_for_instrument(&mut tx, &req.ticker).await?;

    tx.commit().await?;

    tracing::info!("instrument {} ({}) created", req.ticker, req.name);
    Ok(Json(SuccessResponse::default()))
}

/// Remove an instrument, cascading to its orders and inventories.
///
/// DELETE /api/v1/admin/instrument/{ticker}
pub async fn delete_instrument(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if ticker == state.config.base_ticker {
        return Err(AppError::Validation(format!(
            "instrument '{ticker}' is the base currency and cannot be removed"
        )));
    }

    let mut tx = state.db.pool.begin().await?;
    let deleted = instruments::delete(&mut tx, &ticker).await?;
    if deleted == 0 {
        return Err(AppError::not_found("Instrument", ticker));
    }
    tx.commit().await?;

    tracing::info!("instrument {} deleted", ticker);
    Ok(Json(SuccessResponse::default()))
}

/// POST /api/v1/admin/balance/deposit
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BalanceChangeRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    validate(&req)?;

    let mut tx = state.db.pool.begin().await?;
    balance::deposit(&mut tx, &state.config, req.user_id, &req.ticker, req.amount).await?;
    tx.commit().await?;

    tracing::info!(
        "deposited {} {} to user {}",
        req.amount,
        req.ticker,
        req.user_id
    );
    Ok(Json(SuccessResponse::default()))
}

/// POST /api/v1/admin/balance/withdraw
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BalanceChangeRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    validate(&req)?;

    let mut tx = state.db.pool.begin().await?;
    balance::withdraw(&mut tx, &state.config, req.user_id, &req.ticker, req.amount).await?;
    tx.commit().await?;

    tracing::info!(
        "withdrew {} {} from user {}",
        req.amount,
        req.ticker,
        req.user_id
    );
    Ok(Json(SuccessResponse::default()))
}

/// Remove a user, cascading to orders and inventories. Returns the deleted
/// user object.
///
/// DELETE /api/v1/admin/user/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let mut tx = state.db.pool.begin().await?;
    let user = users::get_by_id(&mut tx, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", user_id.to_string()))?;
    users::delete(&mut tx, user_id).await?;
    tx.commit().await?;

    tracing::info!("user {} ({}) deleted", user.name, user.id);
    Ok(Json(user.into()))
}
