//! Store Handles
//!
//! Data access for the five relations. Every function takes
//! `&mut PgConnection` so the same code runs against the pool for plain
//! reads and against an open transaction for mutation; the lifecycle
//! orchestrator is the only owner of commit/rollback.

pub mod instruments;
pub mod inventories;
pub mod orders;
pub mod trades;
pub mod users;
