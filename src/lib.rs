//! Multi-asset spot exchange backend.
//!
//! Accepts limit and market orders, maintains a per-instrument order book in
//! Postgres, matches crossing orders under price-time priority, settles
//! balances and inventories between counterparties atomically, and exposes
//! the resulting state over an HTTP API.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

use crate::auth::jwt::JwtManager;
use crate::config::AppConfig;
use crate::db::Database;

pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
    pub jwt: JwtManager,
}
