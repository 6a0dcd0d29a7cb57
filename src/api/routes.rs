use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::auth::middleware::{auth_middleware, require_admin};
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/public/register", post(handlers::public::register))
        .route("/public/instrument", get(handlers::public::list_instruments))
        .route(
            "/public/orderbook/:ticker",
            get(handlers::public::get_orderbook),
        )
        .route(
            "/public/transactions/:ticker",
            get(handlers::public::get_transactions),
        );

    // Authenticated user routes
    let user_routes = Router::new()
        .route(
            "/order",
            post(handlers::order::create_order).get(handlers::order::list_orders),
        )
        .route(
            "/order/:order_id",
            get(handlers::order::get_order).delete(handlers::order::cancel_order),
        )
        .route("/balance", get(handlers::balance::get_balance))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Admin routes (auth + role guard; auth runs first)
    let admin_routes = Router::new()
        .route("/admin/instrument", post(handlers::admin::create_instrument))
        .route(
            "/admin/instrument/:ticker",
            delete(handlers::admin::delete_instrument),
        )
        .route("/admin/balance/deposit", post(handlers::admin::deposit))
        .route("/admin/balance/withdraw", post(handlers::admin::withdraw))
        .route("/admin/user/:user_id", delete(handlers::admin::delete_user))
        .layer(axum_middleware::from_fn(require_admin))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
}
