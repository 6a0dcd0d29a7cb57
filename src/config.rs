//! Application Configuration
//!
//! Built once at startup from environment variables (with `.env` support via
//! dotenvy in `main`) and shared through `AppState`.

use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub jwt_secret: String,
    pub token_expire_minutes: i64,
    /// Distinguished cash ticker. Lives on the user row, never traded.
    pub base_ticker: String,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            // Assemble from parts the way the deployment env provides them
            Err(_) => {
                let user = env_or("POSTGRES_USER", "trading_user");
                let password = env_or("POSTGRES_PASSWORD", "secure_password_2024");
                let host = env_or("POSTGRES_HOST", "localhost");
                let port = env_or("POSTGRES_PORT", "5432");
                let db = env_or("POSTGRES_DB", "trading_platform_db");
                format!("postgres://{user}:{password}@{host}:{port}/{db}")
            }
        };

        let config = Self {
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", "20").parse()?,
            port: env_or("PORT", "8000").parse()?,
            jwt_secret: env_or("SECRET_KEY", "ultra-secret-key"),
            token_expire_minutes: env_or("ACCESS_TOKEN_EXPIRE_MINUTES", "999999").parse()?,
            base_ticker: env_or("BASE_INSTRUMENT_TICKER", "RUB"),
        };

        if config.base_ticker.len() < 2
            || config.base_ticker.len() > 10
            || !config.base_ticker.chars().all(|c| c.is_ascii_uppercase())
        {
            anyhow::bail!(
                "BASE_INSTRUMENT_TICKER must be 2-10 uppercase letters, got '{}'",
                config.base_ticker
            );
        }

        Ok(config)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
