//! Story Page REST Service
//!
//! Serves composed story pages with incremental regeneration.
//!
//! ## Endpoints
//!
//! - `GET <stories root>/:story` - Composed page (`ETag`, `Cache-Control`, `X-Cache`)
//! - `GET /api/paths` - Enumerate renderable paths
//! - `POST /api/prebuild` - Generate and cache every enumerated path
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{metrics_middleware, normalize_path, record_page_served};
pub use routes::{create_router, story_route, AppState, ErrorResponse};
pub use state::ServiceState;
