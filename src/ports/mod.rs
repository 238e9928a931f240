//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ContentSupplier` - Where candidate items come from
//! - `HistoryRepository` - Durable storage for the session-memory ledger

mod content_supplier;
mod history_repository;

pub use content_supplier::{ContentSupplier, SupplierError};
pub use history_repository::{HistoryRepository, HistoryStorageError};
