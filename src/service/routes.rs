//! Axum routes for the story page service.

use axum::{
    extract::{Json, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::catalogue::{Catalogue, GraphqlCatalogue};
use crate::renderer::{PrebuildReport, RenderError};
use crate::types::PathEntry;

use super::middleware::record_page_served;
use super::state::ServiceState;

/// Type alias for the service state with the GraphQL catalogue.
pub type AppState = ServiceState<GraphqlCatalogue>;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Enumerated page paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathListResponse {
    /// Every renderable path, public first.
    pub paths: Vec<PathEntry>,
    /// Number of restricted entries.
    pub restricted_count: usize,
}

/// Service health response (detailed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub access_policy: String,
    pub revalidate_secs: u64,
    pub started_at: String,
    pub cache: CacheHealth,
    /// Catalogue reachability.
    pub catalogue: bool,
}

/// Page cache information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheHealth {
    pub pages: usize,
    pub capacity: usize,
    pub regenerating: usize,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Readiness response with dependency status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub catalogue: bool,
    pub details: Option<String>,
}

/// Structured error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<RenderError> for (StatusCode, Json<ErrorResponse>) {
    fn from(e: RenderError) -> Self {
        let (status, code) = match &e {
            RenderError::NotFound(_) => (StatusCode::NOT_FOUND, "STORY_NOT_FOUND"),
            RenderError::Catalogue(_) => (StatusCode::BAD_GATEWAY, "CATALOGUE_UNAVAILABLE"),
        };
        tracing::warn!(code = code, error = %e, "Request error");
        (status, Json(ErrorResponse::new(code, e.to_string())))
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Serve a story page.
///
/// Answers `304 Not Modified` when `If-None-Match` carries the current
/// fingerprint.
async fn story_handler<C: Catalogue + ?Sized + 'static>(
    State(state): State<Arc<ServiceState<C>>>,
    Path(story): Path<String>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let outcome = state.renderer.render(&story).await?;
    record_page_served(outcome.cache, outcome.page.exclusive);

    let etag = format!("\"{}\"", outcome.page.fingerprint);
    let revalidate = state.renderer.cache().revalidate().as_secs().max(1);
    let cache_control = format!("s-maxage={}, stale-while-revalidate", revalidate);

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.split(',').any(|tag| tag.trim() == etag));

    let mut response = if not_modified {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        Json(outcome.page.as_ref()).into_response()
    };

    let response_headers = response.headers_mut();
    for (name, value) in [
        (header::ETAG, etag),
        (header::CACHE_CONTROL, cache_control),
    ] {
        if let Ok(value) = HeaderValue::from_str(&value) {
            response_headers.insert(name, value);
        }
    }
    response_headers.insert("x-cache", HeaderValue::from_static(outcome.cache.as_str()));

    Ok(response)
}

/// Enumerate the renderable paths.
async fn paths_handler<C: Catalogue + ?Sized + 'static>(
    State(state): State<Arc<ServiceState<C>>>,
) -> Json<PathListResponse> {
    let paths = state.renderer.enumerate().await;
    Json(PathListResponse {
        restricted_count: paths.iter().filter(|p| p.is_restricted).count(),
        paths,
    })
}

/// Regenerate every enumerated path.
async fn prebuild_handler<C: Catalogue + ?Sized + 'static>(
    State(state): State<Arc<ServiceState<C>>>,
) -> Json<PrebuildReport> {
    Json(state.renderer.prebuild().await)
}

/// Health check endpoint (detailed).
async fn health_handler<C: Catalogue + ?Sized + 'static>(
    State(state): State<Arc<ServiceState<C>>>,
) -> Json<HealthResponse> {
    let catalogue = state.check_catalogue().await.is_ok();
    let stats = state.renderer.cache_stats();

    Json(HealthResponse {
        status: if catalogue { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        access_policy: state.renderer.access_policy().to_string(),
        revalidate_secs: state.renderer.cache().revalidate().as_secs(),
        started_at: state.started_at().to_rfc3339(),
        cache: CacheHealth {
            pages: stats.len,
            capacity: stats.cap,
            regenerating: stats.regenerating,
        },
        catalogue,
    })
}

/// Liveness probe endpoint.
///
/// Does NOT check dependencies.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 if the catalogue answers, 503 otherwise.
async fn readiness_handler<C: Catalogue + ?Sized + 'static>(
    State(state): State<Arc<ServiceState<C>>>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    match state.check_catalogue().await {
        Ok(()) => Ok(Json(ReadinessResponse {
            ready: true,
            catalogue: true,
            details: None,
        })),
        Err(e) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                ready: false,
                catalogue: false,
                details: Some(e.to_string()),
            }),
        )),
    }
}

// ============================================================================
// Router Construction
// ============================================================================

/// Route serving the pages under a stories root (`/stories` → `/stories/:story`).
pub fn story_route(stories_root: &str) -> String {
    let root = stories_root.trim_matches('/');
    if root.is_empty() {
        "/:story".to_string()
    } else {
        format!("/{}/:story", root)
    }
}

/// Create the Axum router for the story page service.
///
/// Pages are served under the renderer's stories root, so every path
/// returned by `/api/paths` is routable.
pub fn create_router<C: Catalogue + ?Sized + 'static>(state: ServiceState<C>) -> Router {
    let page_route = story_route(state.renderer.stories_root());
    let state = Arc::new(state);

    Router::new()
        // Pages
        .route(&page_route, get(story_handler::<C>))
        // Build-time operations
        .route("/api/paths", get(paths_handler::<C>))
        .route("/api/prebuild", post(prebuild_handler::<C>))
        // Health checks
        .route("/health", get(health_handler::<C>))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler::<C>))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::catalogue::{CatalogueError, InMemoryCatalogue};
    use crate::renderer::RendererConfig;
    use crate::types::{BooleanContent, CatalogueItem, Component, ComponentContent};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(catalogue: Arc<InMemoryCatalogue>) -> Router {
        let config = RendererConfig {
            cache: CacheConfig { max_entries: 16, revalidate: Duration::from_secs(60) },
            ..RendererConfig::default()
        };
        create_router(ServiceState::new(catalogue, config))
    }

    #[test]
    fn test_story_route_follows_root() {
        assert_eq!(story_route("/stories"), "/stories/:story");
        assert_eq!(story_route("/journal/"), "/journal/:story");
        assert_eq!(story_route("/"), "/:story");
    }

    #[tokio::test]
    async fn test_custom_stories_root_serves_enumerated_paths() {
        let catalogue = Arc::new(InMemoryCatalogue::with_items([
            CatalogueItem::new("1", "Espresso", "/journal/espresso").with_component(Component::new(
                "is-exclusive",
                ComponentContent::Boolean(BooleanContent { value: Some(true) }),
            )),
        ]));
        let config = RendererConfig {
            stories_root: "/journal".to_string(),
            ..RendererConfig::default()
        };
        let app = create_router(ServiceState::new(catalogue, config));

        let (_, _, body) = get(app.clone(), "/api/paths", None).await;
        let paths: Vec<String> = body["paths"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["path"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(paths, vec!["/journal/espresso", "/journal/espresso-_-_-exclusive"]);

        for path in &paths {
            let (status, _, body) = get(app.clone(), path, None).await;
            assert_eq!(status, StatusCode::OK, "{}", path);
            assert_eq!(body["key"], path.as_str());
        }

        let (status, _, _) = get(app, "/stories/espresso", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    fn catalogue() -> Arc<InMemoryCatalogue> {
        Arc::new(InMemoryCatalogue::with_items([
            CatalogueItem::new("1", "Coffee", "/stories/coffee").with_component(Component::new(
                "is-exclusive",
                ComponentContent::Boolean(BooleanContent { value: Some(true) }),
            )),
            CatalogueItem::new("2", "Tea", "/stories/tea"),
        ]))
    }

    async fn get(app: Router, uri: &str, if_none_match: Option<&str>) -> (StatusCode, HeaderMap, Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(tag) = if_none_match {
            request = request.header(header::IF_NONE_MATCH, tag);
        }
        let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    #[tokio::test]
    async fn test_story_page() {
        let app = app(catalogue());

        let (status, headers, body) = get(app.clone(), "/stories/coffee", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["x-cache"], "MISS");
        assert_eq!(body["meta"]["title"], "Coffee");
        assert_eq!(body["meta"]["type"], "article");
        assert_eq!(body["exclusive"], false);
        assert_eq!(body["sections"][1]["kind"], "members_only");

        let (_, headers, _) = get(app, "/stories/coffee", None).await;
        assert_eq!(headers["x-cache"], "HIT");
        assert_eq!(headers[header::CACHE_CONTROL], "s-maxage=60, stale-while-revalidate");
    }

    #[tokio::test]
    async fn test_exclusive_page() {
        let (status, _, body) = get(app(catalogue()), "/stories/tea-_-_-exclusive", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["exclusive"], true);
        assert_eq!(body["key"], "/stories/tea-_-_-exclusive");
    }

    #[tokio::test]
    async fn test_etag_not_modified() {
        let app = app(catalogue());
        let (_, headers, _) = get(app.clone(), "/stories/tea", None).await;
        let etag = headers[header::ETAG].to_str().unwrap().to_string();

        let (status, headers, _) = get(app, "/stories/tea", Some(&etag)).await;
        assert_eq!(status, StatusCode::NOT_MODIFIED);
        assert_eq!(headers[header::ETAG].to_str().unwrap(), etag);
    }

    #[tokio::test]
    async fn test_missing_story_is_404() {
        let (status, _, body) = get(app(catalogue()), "/stories/ghost", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "STORY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_catalogue_failure_is_502() {
        let catalogue = catalogue();
        catalogue.set_failure(Some(CatalogueError::Status { status: 500, body: String::new() }));

        let (status, _, body) = get(app(catalogue), "/stories/coffee", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "CATALOGUE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_paths() {
        let (status, _, body) = get(app(catalogue()), "/api/paths", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["restricted_count"], 1);
        let paths: Vec<&str> = body["paths"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, vec!["/stories/coffee", "/stories/tea", "/stories/coffee-_-_-exclusive"]);
    }

    #[tokio::test]
    async fn test_readiness_tracks_catalogue() {
        let catalogue = catalogue();
        let (status, _, _) = get(app(Arc::clone(&catalogue)), "/health/ready", None).await;
        assert_eq!(status, StatusCode::OK);

        catalogue.set_failure(Some(CatalogueError::Transport("down".into())));
        let (status, _, body) = get(app(catalogue), "/health/ready", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["ready"], false);
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = get(app(catalogue()), "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["access_policy"], "request_only");
        assert_eq!(body["cache"]["capacity"], 16);
    }
}
