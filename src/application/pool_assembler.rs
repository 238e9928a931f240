//! PoolAssembler - builds the single shared pool for a new session.
//!
//! Asks the content supplier first. Supplier errors and empty results are
//! logged and replaced by the built-in catalog, shuffled with the session
//! seed. Only an empty built-in catalog makes assembly fail.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::catalog::{dedupe_by_title, exclude_ids, fallback_catalog, shuffle_seeded, Item};
use crate::domain::foundation::ItemId;
use crate::domain::session::SessionError;
use crate::ports::ContentSupplier;

pub struct PoolAssembler {
    supplier: Arc<dyn ContentSupplier>,
    fallback: Vec<Item>,
}

impl PoolAssembler {
    pub fn new(supplier: Arc<dyn ContentSupplier>) -> Self {
        Self {
            supplier,
            fallback: fallback_catalog().to_vec(),
        }
    }

    /// Replaces the built-in fallback titles.
    pub fn with_fallback(mut self, fallback: Vec<Item>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Fetches, deduplicates and filters a pool.
    ///
    /// # Errors
    ///
    /// `EmptyPool` only when the supplier yields nothing and the fallback
    /// catalog is itself empty.
    pub async fn assemble(
        &self,
        session_seed: &str,
        exclude: &HashSet<ItemId>,
    ) -> Result<Vec<Item>, SessionError> {
        match self.supplier.fetch_pool(exclude).await {
            Ok(items) => {
                let fetched = items.len();
                let pool = exclude_ids(dedupe_by_title(items), exclude);
                if !pool.is_empty() {
                    info!(
                        supplier = self.supplier.name(),
                        fetched,
                        pool_size = pool.len(),
                        "Assembled pool from supplier"
                    );
                    return Ok(pool);
                }
                warn!(
                    supplier = self.supplier.name(),
                    fetched,
                    "Supplier yielded no usable items, using fallback catalog"
                );
            }
            Err(e) => {
                warn!(
                    supplier = self.supplier.name(),
                    error = %e,
                    "Supplier failed, using fallback catalog"
                );
            }
        }

        self.fallback_pool(session_seed, exclude)
    }

    fn fallback_pool(
        &self,
        session_seed: &str,
        exclude: &HashSet<ItemId>,
    ) -> Result<Vec<Item>, SessionError> {
        let all = dedupe_by_title(self.fallback.clone());
        let mut pool = exclude_ids(all.clone(), exclude);
        if pool.is_empty() {
            debug!("Recent history covers the whole fallback catalog, ignoring it");
            pool = all;
        }
        if pool.is_empty() {
            error!("Fallback catalog is empty, no pool can be built");
            return Err(SessionError::EmptyPool);
        }

        Ok(shuffle_seeded(&pool, session_seed))
    }
}
