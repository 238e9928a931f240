//! Pool - the shared, deduplicated set of candidates for one session.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::foundation::ItemId;

use super::Item;

/// Drops later entries whose normalized title was already seen.
///
/// Keeps the first occurrence, so the caller's order decides which
/// sub-source wins.
pub fn dedupe_by_title(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.normalized_title()))
        .collect()
}

/// Drops items whose id appears in `exclude`.
pub fn exclude_ids(items: Vec<Item>, exclude: &HashSet<ItemId>) -> Vec<Item> {
    if exclude.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| !exclude.contains(&item.id))
        .collect()
}

/// The session's ground-truth candidate list.
///
/// Pool order is the tie-break for consensus, so it never changes once the
/// pool is built. An item matched and skipped via "keep looking" is
/// *retired*: it stays resolvable by id but is no longer a live candidate.
#[derive(Debug, Clone, Default)]
pub struct Pool {
    items: Vec<Arc<Item>>,
    retired: HashSet<ItemId>,
}

impl Pool {
    /// Builds a pool, dropping duplicate ids (first one wins).
    pub fn new(items: Vec<Item>) -> Self {
        let mut ids = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| ids.insert(item.id.clone()))
            .map(Arc::new)
            .collect();

        Self {
            items,
            retired: HashSet::new(),
        }
    }

    /// Number of live (non-retired) items.
    pub fn len(&self) -> usize {
        self.items.len() - self.retired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live items in pool order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Item>> {
        self.items
            .iter()
            .filter(move |item| !self.retired.contains(&item.id))
    }

    /// Looks up an item by id, retired ones included.
    pub fn get(&self, id: &ItemId) -> Option<&Arc<Item>> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Returns true if `id` is a live candidate.
    pub fn is_live(&self, id: &ItemId) -> bool {
        !self.retired.contains(id) && self.get(id).is_some()
    }

    /// Position of an item in pool order.
    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// Retires an item. Returns false if it is unknown or already retired.
    pub fn retire(&mut self, id: &ItemId) -> bool {
        self.get(id).is_some() && self.retired.insert(id.clone())
    }
}
