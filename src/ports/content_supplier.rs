//! Content Supplier Port - Interface for fetching candidate items.
//!
//! Suppliers may blend several sub-sources and filter on their own terms.
//! The engine only relies on getting a list back or an error it can
//! recover from with the built-in catalog.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::catalog::Item;
use crate::domain::foundation::ItemId;

/// Errors a content supplier can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SupplierError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode catalog response: {0}")]
    Decode(String),

    #[error("Supplier is not configured: {0}")]
    NotConfigured(String),
}

/// Port for fetching a candidate pool.
#[async_trait]
pub trait ContentSupplier: Send + Sync {
    /// Fetch candidate items, leaving out ids in `exclude` where possible.
    ///
    /// # Errors
    /// Any `SupplierError`; callers fall back to static content.
    async fn fetch_pool(&self, exclude: &HashSet<ItemId>) -> Result<Vec<Item>, SupplierError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
