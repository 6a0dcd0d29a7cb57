use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{Role, User};
use crate::store::users;
use crate::AppState;

/// `Authorization: TOKEN <jwt>`
const TOKEN_PREFIX: &str = "TOKEN ";

/// The authenticated user, loaded fresh from the store so deleted users are
/// locked out immediately even with a valid token.
#[derive(Clone)]
pub struct AuthUser {
    pub user: User,
}

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthenticated("Authorization header missing".to_string()))?;

    let token = auth_header
        .strip_prefix(TOKEN_PREFIX)
        .ok_or_else(|| AppError::Unauthenticated("Invalid authorization format".to_string()))?;

    let claims = state
        .jwt
        .verify_token(token)
        .map_err(|_| AppError::Unauthenticated("Invalid or expired token".to_string()))?;

    let mut conn = state.db.pool.acquire().await?;
    let user = users::get_by_id(&mut conn, claims.id)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("User not found".to_string()))?;

    request.extensions_mut().insert(AuthUser { user });
    Ok(next.run(request).await)
}

/// Layered inside `auth_middleware` on admin routes.
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| AppError::Unauthenticated("Authorization required".to_string()))?;

    if auth_user.user.role != Role::Admin {
        return Err(AppError::Forbidden(
            "Permission denied. Admin access required.".to_string(),
        ));
    }
    Ok(next.run(request).await)
}
