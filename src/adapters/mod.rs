//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the engine to external systems:
//! - `catalog` - Content suppliers (built-in list, TMDB)
//! - `storage` - Session history ledgers (YAML file, in-memory)

pub mod catalog;
pub mod storage;
