//! Order Matching Module
//!
//! Price-time priority matching against the persisted book.
//!
//! ```text
//! API Handler
//!   ↓
//! orchestrator (one transaction per request, owns commit/rollback)
//!   ├→ store::orders::resting (book view, priority order)
//!   ├→ matcher (pure walk, emits Fills)
//!   ├→ settlement (posting plan per fill + trade record)
//!   └→ freeze (residue reservation)
//! ```
//!
//! The matcher itself is pure: it walks an in-memory slice of the book
//! loaded under the instrument lock and mutates copies, so the matching
//! semantics are testable without a database. The orchestrator writes the
//! mutated orders back inside the same transaction.

mod matcher;
mod orchestrator;
mod types;

pub use matcher::match_against_book;
pub use orchestrator::{cancel, submit};
pub use types::Fill;
