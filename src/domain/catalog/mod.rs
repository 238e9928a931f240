//! Catalog domain - candidate items and how they are ordered.
//!
//! - `Item` - A rateable candidate
//! - `Pool` - The deduplicated, shared candidate list of one session
//! - `shuffle_seeded` / `shuffle_random` - Reproducible and ad hoc orderings
//! - `fallback_catalog` - Built-in titles used when the supplier has nothing

mod fallback;
mod item;
mod pool;
mod shuffle;

pub use fallback::fallback_catalog;
pub use item::{Item, MAX_SCORE};
pub use pool::{dedupe_by_title, exclude_ids, Pool};
pub use shuffle::{participant_seed, seed_hash, shuffle_random, shuffle_seeded};
