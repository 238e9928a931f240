//! Domain layer containing the session engine's business logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, enums, errors, timestamps)
//! - `catalog` - Items, the shared pool, and deterministic shuffling
//! - `memory` - Cross-session ledger of recently shown items
//! - `session` - The session aggregate: roster, turns, consensus, post-match

pub mod catalog;
pub mod foundation;
pub mod memory;
pub mod session;
