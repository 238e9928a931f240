//! Content supplier adapters.
//!
//! - `StaticCatalog` - Fixed list, the built-in titles by default
//! - `TmdbCatalog` - Popular and trending titles from The Movie Database

mod static_catalog;
mod tmdb;

pub use static_catalog::StaticCatalog;
pub use tmdb::{TmdbCatalog, TmdbConfig};
