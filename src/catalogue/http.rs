//! GraphQL-over-HTTP catalogue for production use.
//!
//! ## Configuration
//!
//! All settings can be configured via environment variables:
//! - `CATALOGUE_URL`: GraphQL endpoint (takes precedence)
//! - `CATALOGUE_TENANT`: tenant identifier, expands to
//!   `https://api.crystallize.com/<tenant>/catalogue`
//! - `CATALOGUE_TIMEOUT_SECS`: request timeout (default: 10)

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;

use super::{envelope_errors, Catalogue, CatalogueError, CatalogueQuery};

/// Longest response body kept in a [`CatalogueError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Configuration for the GraphQL catalogue client.
#[derive(Debug, Clone)]
pub struct GraphqlCatalogueConfig {
    /// GraphQL endpoint URL.
    pub endpoint: String,
    /// Request timeout in seconds (default: 10).
    pub timeout_secs: u64,
}

impl GraphqlCatalogueConfig {
    /// Endpoint of a hosted catalogue tenant.
    pub fn for_tenant(tenant: &str) -> String {
        format!("https://api.crystallize.com/{}/catalogue", tenant)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let endpoint = std::env::var("CATALOGUE_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| {
                std::env::var("CATALOGUE_TENANT")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .map(|tenant| Self::for_tenant(&tenant))
            })
            .unwrap_or_else(|| "http://localhost:4000/graphql".to_string());

        Self {
            endpoint,
            timeout_secs: std::env::var("CATALOGUE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        }
    }
}

impl Default for GraphqlCatalogueConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Catalogue reached over GraphQL/HTTP.
///
/// One POST per query, no retries; backoff belongs to whoever operates the
/// transport.
#[derive(Debug, Clone)]
pub struct GraphqlCatalogue {
    client: reqwest::Client,
    endpoint: String,
}

impl GraphqlCatalogue {
    /// Create a client with the given configuration.
    pub fn new(config: GraphqlCatalogueConfig) -> Result<Self, CatalogueError> {
        tracing::info!(
            endpoint = %config.endpoint,
            timeout_secs = config.timeout_secs,
            "Initializing catalogue client"
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogueError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint,
        })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self, CatalogueError> {
        Self::new(GraphqlCatalogueConfig::from_env())
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Catalogue for GraphqlCatalogue {
    async fn query(&self, query: &CatalogueQuery) -> Result<Value, CatalogueError> {
        let start = Instant::now();
        let body = serde_json::json!({
            "query": query.kind.document(),
            "variables": query.variables(),
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| CatalogueError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), text));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| CatalogueError::Malformed(e.to_string()))?;
        let envelope = check_envelope(envelope)?;

        tracing::debug!(
            query = query.kind.as_str(),
            path = %query.path,
            latency_ms = start.elapsed().as_millis() as u64,
            "Catalogue query completed"
        );

        Ok(envelope)
    }
}

/// Error for a non-success HTTP status, keeping at most
/// [`MAX_ERROR_BODY`] bytes of the body.
fn status_error(status: u16, mut body: String) -> CatalogueError {
    truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
    CatalogueError::Status { status, body }
}

/// Accept a decoded GraphQL envelope, or map it to the matching error.
fn check_envelope(envelope: Value) -> Result<Value, CatalogueError> {
    if !envelope.is_object() {
        return Err(CatalogueError::Malformed("response is not a JSON object".into()));
    }
    if let Some(messages) = envelope_errors(&envelope) {
        return Err(CatalogueError::Query(messages));
    }
    Ok(envelope)
}

fn truncate_at_char_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}
