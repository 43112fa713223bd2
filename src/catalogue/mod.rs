//! Catalogue backends.
//!
//! The catalogue is the external content repository. The rest of the crate
//! only sees it through [`Catalogue::query`]: a query kind, a path and a
//! language tag in, a raw GraphQL response envelope out.

pub mod memory;
pub mod query;

#[cfg(feature = "http")]
pub mod http;

use async_trait::async_trait;
use serde_json::Value;

pub use query::{CHILDREN_QUERY, STORY_QUERY};

/// Language tag used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Error type for catalogue queries.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogueError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("Catalogue transport error: {0}")]
    Transport(String),
    /// The catalogue answered with a non-success status.
    #[error("Catalogue returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },
    /// The catalogue answered with GraphQL errors and no data.
    #[error("Catalogue query failed: {}", .0.join("; "))]
    Query(Vec<String>),
    /// The response body was not a GraphQL envelope.
    #[error("Malformed catalogue response: {0}")]
    Malformed(String),
}

/// Which query document to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Full story graph for one path.
    Story,
    /// Direct children of a folder with their exclusivity flag.
    Children,
}

impl QueryKind {
    /// GraphQL document for this kind.
    pub fn document(&self) -> &'static str {
        match self {
            Self::Story => STORY_QUERY,
            Self::Children => CHILDREN_QUERY,
        }
    }

    /// Short name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Children => "children",
        }
    }
}

/// A parameterized catalogue query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueQuery {
    /// Query document to run.
    pub kind: QueryKind,
    /// Catalogue path variable.
    pub path: String,
    /// Language tag variable.
    pub language: String,
}

impl CatalogueQuery {
    /// Story query for `path`.
    pub fn story(path: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            kind: QueryKind::Story,
            path: path.into(),
            language: language.into(),
        }
    }

    /// Children query for the folder at `path`.
    pub fn children(path: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            kind: QueryKind::Children,
            path: path.into(),
            language: language.into(),
        }
    }

    /// GraphQL variables object.
    pub fn variables(&self) -> Value {
        serde_json::json!({ "path": self.path, "language": self.language })
    }
}

/// Trait for catalogue backends.
///
/// Implementations return the response envelope (`{"data": ...}`) untouched;
/// interpreting its shape is the caller's job. A response carrying only
/// GraphQL errors must be reported as [`CatalogueError::Query`].
#[async_trait]
pub trait Catalogue: Send + Sync {
    /// Run a query.
    async fn query(&self, query: &CatalogueQuery) -> Result<Value, CatalogueError>;
}

/// Extract GraphQL error messages from a response envelope, if the envelope
/// carries errors and no data.
pub(crate) fn envelope_errors(envelope: &Value) -> Option<Vec<String>> {
    let errors = envelope.get("errors")?.as_array()?;
    if errors.is_empty() || envelope.get("data").map_or(false, |d| !d.is_null()) {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|e| {
                e.get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string()
            })
            .collect(),
    )
}

pub use memory::InMemoryCatalogue;

#[cfg(feature = "http")]
pub use http::{GraphqlCatalogue, GraphqlCatalogueConfig};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_errors_without_data() {
        let envelope = json!({ "data": null, "errors": [{ "message": "bad path" }] });
        assert_eq!(envelope_errors(&envelope), Some(vec!["bad path".to_string()]));
    }

    #[test]
    fn test_partial_data_is_not_an_error() {
        let envelope = json!({ "data": { "story": null }, "errors": [{ "message": "x" }] });
        assert_eq!(envelope_errors(&envelope), None);
    }

    #[test]
    fn test_query_error_display_joins_messages() {
        let err = CatalogueError::Query(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Catalogue query failed: a; b");
    }

    #[test]
    fn test_variables() {
        let query = CatalogueQuery::story("/stories/a", "en");
        assert_eq!(query.variables(), json!({ "path": "/stories/a", "language": "en" }));
        assert_eq!(query.kind.document(), STORY_QUERY);
    }
}
