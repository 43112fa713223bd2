//! Content fetcher: one story query per page path.

use serde_json::Value;

use crate::catalogue::{Catalogue, CatalogueError, CatalogueQuery};

/// Raw response of the story query, kept exactly as the catalogue sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawStoryGraph(Value);

impl RawStoryGraph {
    /// Wrap a response envelope.
    pub fn new(envelope: Value) -> Self {
        Self(envelope)
    }

    /// The story node (`data.story`), if the catalogue returned one.
    pub fn story(&self) -> Option<&Value> {
        self.0
            .get("data")
            .and_then(|data| data.get("story"))
            .filter(|story| story.is_object())
    }

    /// Whether the catalogue knows the requested path.
    pub fn story_exists(&self) -> bool {
        self.story().is_some()
    }

    /// The full envelope.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Unwrap the envelope.
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<Value> for RawStoryGraph {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Fetch the raw story graph for a catalogue path.
///
/// `path` must already have the exclusive marker stripped. The graph is
/// returned uninterpreted; failures propagate so a missing story surfaces as
/// an error instead of an empty page.
pub async fn fetch_story<C: Catalogue + ?Sized>(
    catalogue: &C,
    path: &str,
    language: &str,
) -> Result<RawStoryGraph, CatalogueError> {
    let envelope = catalogue.query(&CatalogueQuery::story(path, language)).await?;
    tracing::debug!(path = %path, found = envelope["data"]["story"].is_object(), "Fetched story graph");
    Ok(RawStoryGraph::new(envelope))
}
