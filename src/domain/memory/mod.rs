//! Session memory module.
//!
//! The only state that outlives a session: a bounded ledger of which items
//! recent sessions showed, read to keep repeats out of new pools.

mod ledger;

pub use ledger::{SessionHistoryEntry, SessionMemory, DEFAULT_HISTORY_WINDOW};
