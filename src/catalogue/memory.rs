//! In-memory catalogue for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};

use crate::types::CatalogueItem;
use super::{Catalogue, CatalogueError, CatalogueQuery, QueryKind};

/// In-memory catalogue for testing.
///
/// Items keep insertion order so children come back in authoring order, the
/// way the real catalogue returns them. Answers are projected through
/// [`CatalogueItem::to_graph`], so they carry the same aliases as a live
/// response.
#[derive(Debug, Default)]
pub struct InMemoryCatalogue {
    items: RwLock<Vec<CatalogueItem>>,
    failure: RwLock<Option<CatalogueError>>,
    queries: AtomicUsize,
}

impl InMemoryCatalogue {
    /// Create a new empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalogue holding `items`.
    pub fn with_items(items: impl IntoIterator<Item = CatalogueItem>) -> Self {
        let catalogue = Self::new();
        for item in items {
            catalogue.upsert(item);
        }
        catalogue
    }

    /// Insert an item, replacing any item at the same path in place.
    pub fn upsert(&self, item: CatalogueItem) {
        let mut items = self.items.write();
        match items.iter_mut().find(|existing| existing.path == item.path) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
    }

    /// Remove the item at `path`.
    pub fn remove(&self, path: &str) -> Option<CatalogueItem> {
        let mut items = self.items.write();
        let index = items.iter().position(|item| item.path == path)?;
        Some(items.remove(index))
    }

    /// Make every following query fail with `error` (`None` to recover).
    pub fn set_failure(&self, error: Option<CatalogueError>) {
        *self.failure.write() = error;
    }

    /// Number of queries answered or failed so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Get number of items.
    pub fn num_items(&self) -> usize {
        self.items.read().len()
    }

    fn story_response(&self, path: &str) -> Value {
        let story = self
            .items
            .read()
            .iter()
            .find(|item| item.path == path)
            .map(CatalogueItem::to_graph)
            .unwrap_or(Value::Null);
        json!({ "data": { "story": story } })
    }

    fn children_response(&self, folder: &str) -> Value {
        let folder = folder.trim_end_matches('/');
        let items = self.items.read();
        let children: Vec<Value> = items
            .iter()
            .filter(|item| parent_of(&item.path) == Some(folder))
            .map(CatalogueItem::to_graph)
            .collect();

        let prefix = format!("{}/", folder);
        if children.is_empty() && !items.iter().any(|item| item.path.starts_with(&prefix)) {
            // Unknown folder: the catalogue answers with a null node.
            return json!({ "data": { "catalogue": null } });
        }
        json!({ "data": { "catalogue": { "path": folder, "children": children } } })
    }
}

fn parent_of(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    trimmed.rfind('/').map(|index| &trimmed[..index])
}

#[async_trait]
impl Catalogue for InMemoryCatalogue {
    async fn query(&self, query: &CatalogueQuery) -> Result<Value, CatalogueError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.failure.read().clone() {
            return Err(error);
        }

        Ok(match query.kind {
            QueryKind::Story => self.story_response(&query.path),
            QueryKind::Children => self.children_response(&query.path),
        })
    }
}
