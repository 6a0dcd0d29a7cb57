//! Order API Handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::AppError;
use crate::models::{CreateOrderRequest, CreateOrderResponse, OrderResponse, OrderStatus};
use crate::services::matching;
use crate::store::orders;
use crate::AppState;

use super::{validate, SuccessResponse};

/// Submit an order. A market order that cannot fully execute comes back
/// CANCELLED and is surfaced as 422 `ORDER CANCELLED`.
///
/// POST /api/v1/order
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, AppError> {
    validate(&req)?;

    let order = matching::submit(
        &state.db.pool,
        &state.config,
        auth.user.id,
        &req.ticker,
        req.direction.direction(),
        req.qty,
        req.price,
    )
    .await?;

    if order.status == OrderStatus::Cancelled {
        return Err(AppError::OrderExecution("ORDER CANCELLED".to_string()));
    }

    Ok(Json(CreateOrderResponse {
        success: true,
        order_id: order.id,
    }))
}

/// GET /api/v1/order
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let mut conn = state.db.pool.acquire().await?;
    let list = orders::list_for_user(&mut conn, auth.user.id).await?;
    Ok(Json(list.into_iter().map(OrderResponse::from).collect()))
}

/// GET /api/v1/order/{id}
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let mut conn = state.db.pool.acquire().await?;
    let order = orders::get_by_id(&mut conn, order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order", order_id.to_string()))?;

    if order.user_id != auth.user.id {
        return Err(AppError::Forbidden(
            "Order does not belong to user".to_string(),
        ));
    }

    Ok(Json(order.into()))
}

/// DELETE /api/v1/order/{id}
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    matching::cancel(&state.db.pool, &state.config, order_id, auth.user.id).await?;
    Ok(Json(SuccessResponse::default()))
}
