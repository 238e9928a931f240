//! Static Catalog - Content supplier backed by a fixed item list.
//!
//! Serves the built-in fallback titles by default. Useful offline, in
//! tests, and whenever no remote catalog is configured.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::catalog::{exclude_ids, fallback_catalog, Item};
use crate::domain::foundation::ItemId;
use crate::ports::{ContentSupplier, SupplierError};

#[derive(Debug, Clone)]
pub struct StaticCatalog {
    items: Vec<Item>,
}

impl StaticCatalog {
    /// A catalog serving the built-in titles.
    pub fn new() -> Self {
        Self::with_items(fallback_catalog().to_vec())
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        Self { items }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentSupplier for StaticCatalog {
    async fn fetch_pool(&self, exclude: &HashSet<ItemId>) -> Result<Vec<Item>, SupplierError> {
        Ok(exclude_ids(self.items.clone(), exclude))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
