//! Balance API Handler

use axum::{extract::State, Extension, Json};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::auth::middleware::AuthUser;
use crate::error::AppError;
use crate::services::balance;
use crate::AppState;

/// Per-ticker holdings of the caller, available plus frozen, read in one
/// transaction for a consistent snapshot.
///
/// GET /api/v1/balance
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<BTreeMap<String, i64>>, AppError> {
    let mut tx = state.db.pool.begin().await?;
    let balances = balance::user_balance(&mut tx, &state.config, auth.user.id).await?;
    tx.commit().await?;
    Ok(Json(balances))
}
