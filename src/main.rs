use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spotbook_backend::auth::jwt::JwtManager;
use spotbook_backend::config::AppConfig;
use spotbook_backend::db::{init_schema, Database};
use spotbook_backend::{api, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spotbook_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;

    tracing::info!("Starting spotbook backend v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Base instrument: {}", config.base_ticker);

    // Initialize database
    let db = Database::connect(&config.database_url, config.db_max_connections).await?;
    init_schema(&db.pool, &config).await?;
    tracing::info!("Database connected");

    // Token issuing/verification
    let jwt = JwtManager::new(&config.jwt_secret, config.token_expire_minutes);

    // Build application state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        jwt,
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api::routes::create_router(state.clone()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
