//! Story Page Service Binary
//!
//! Serves composed story pages over HTTP:
//! - Structured JSON logging
//! - Request tracing with correlation IDs
//! - Optional prebuild of every enumerated path before accepting traffic
//! - Graceful shutdown handling
//!
//! ## Configuration
//!
//! Environment variables (see `story_pages::config`):
//! - `CATALOGUE_URL` / `CATALOGUE_TENANT`: catalogue GraphQL endpoint
//! - `STORIES_ROOT`, `CATALOGUE_LANGUAGE`, `ACCESS_POLICY`
//! - `REVALIDATE_SECS`, `CACHE_MAX_ENTRIES`, `PREBUILD`
//! - `PORT`: Service port (default: 8001)
//! - `HOST`: Service host (default: 0.0.0.0)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! CATALOGUE_TENANT=furniture cargo run --bin story_page_service --features service
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Instrument};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use story_pages::config::{LogFormat, StoryPagesConfig};
use story_pages::service::{create_router, metrics_middleware, ServiceState};
use story_pages::GraphqlCatalogue;

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "story_page_service=info,story_pages=info,tower_http=info".into());

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_current_span(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .flatten_event(true)
                )
                .init();
        }
    }
}

/// Request logging middleware that adds correlation ID and timing
async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let trace_id = request
        .headers()
        .get("X-Request-Id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let method = request.method().clone();
    let uri = request.uri().path().to_string();

    let span = info_span!(
        "request",
        trace_id = %trace_id,
        method = %method,
        path = %uri,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    );

    let response = next.run(request).instrument(span.clone()).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    span.record("status", status);
    span.record("latency_ms", latency.as_millis() as u64);

    info!(
        target: "story_page_service::access",
        trace_id = %trace_id,
        method = %method,
        path = %uri,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request completed"
    );

    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = StoryPagesConfig::from_env();
    init_tracing(config.log_format);

    let version = env!("CARGO_PKG_VERSION");
    let build_sha = option_env!("BUILD_SHA").unwrap_or("dev");

    info!(
        version = version,
        build_sha = build_sha,
        stories_root = %config.renderer.stories_root,
        access_policy = %config.renderer.access_policy,
        revalidate_secs = config.renderer.cache.revalidate.as_secs(),
        "Starting Story Page Service"
    );

    let catalogue = Arc::new(GraphqlCatalogue::from_env()?);
    let state = ServiceState::new(catalogue, config.renderer.clone());

    if config.prebuild {
        let prebuild_start = Instant::now();
        let report = state.renderer.prebuild().await;
        info!(
            enumerated = report.enumerated,
            generated = report.generated,
            failed = report.failures.len(),
            latency_ms = prebuild_start.elapsed().as_millis() as u64,
            "Prebuild finished"
        );
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        address = %addr,
        version = version,
        "Story Page Service listening"
    );

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Story Page Service shutdown complete");

    Ok(())
}
