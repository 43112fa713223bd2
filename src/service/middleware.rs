//! Service middleware for metrics and request tracking.
//!
//! ## Metrics Exposed
//!
//! Emitted as structured events on target `story_pages::metrics`:
//!
//! - `request_metric` - path pattern, method, status, latency
//! - `page_metric` - cache status and variant of every served page
//! - `render_metric` - emitted by the renderer for every generated page

use std::sync::OnceLock;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use regex_lite::Regex;
use tracing::info;

use crate::renderer::CacheStatus;

/// Metrics middleware that records request counts and latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| normalize_path(request.uri().path()));

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    info!(
        target: "story_pages::metrics",
        metric_type = "request",
        path = %path,
        method = %method,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request_metric"
    );

    response
}

fn slug_path_regex() -> Option<&'static Regex> {
    static SLUG_PATH: OnceLock<Option<Regex>> = OnceLock::new();
    SLUG_PATH
        .get_or_init(|| Regex::new(r"^(/[^/]+)/[^/]+$").ok())
        .as_ref()
}

/// Normalize an unmatched path for metrics to avoid high cardinality.
///
/// Routed requests are labelled with their route pattern. For anything else
/// the last segment of a two-segment path (a story slug under any stories
/// root, marker included) is replaced with a placeholder.
pub fn normalize_path(path: &str) -> String {
    match slug_path_regex() {
        Some(re) => re.replace(path, "$1/:story").to_string(),
        None => path.to_string(),
    }
}

/// Record how a page was served.
pub fn record_page_served(cache: CacheStatus, exclusive: bool) {
    info!(
        target: "story_pages::metrics",
        metric_type = "page",
        cache = cache.as_str(),
        exclusive = exclusive,
        "page_metric"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_replaces_slug() {
        assert_eq!(normalize_path("/stories/coffee"), "/stories/:story");
        assert_eq!(normalize_path("/stories/coffee-_-_-exclusive"), "/stories/:story");
    }

    #[test]
    fn test_normalize_path_follows_any_root() {
        assert_eq!(normalize_path("/journal/espresso"), "/journal/:story");
        assert_eq!(normalize_path("/journal/espresso-_-_-exclusive"), "/journal/:story");
    }

    #[test]
    fn test_normalize_path_preserves_other_shapes() {
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(normalize_path("/a/b/c"), "/a/b/c");
    }
}
