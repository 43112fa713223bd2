//! Runtime configuration.
//!
//! Resolved once at startup from environment variables and passed into the
//! renderer and the service; nothing reads the environment while serving.
//!
//! - `STORIES_ROOT`: catalogue folder holding the stories (default: /stories)
//! - `CATALOGUE_LANGUAGE`: language tag sent with every query (default: en)
//! - `ACCESS_POLICY`: `request_only` or `require_catalogue_flag` (default: request_only)
//! - `REVALIDATE_SECS`: seconds before a cached page is stale (default: 1)
//! - `CACHE_MAX_ENTRIES`: maximum cached pages (default: 1024)
//! - `PREBUILD`: generate every enumerated path at startup (default: true)
//! - `HOST`: service host (default: 0.0.0.0)
//! - `PORT`: service port (default: 8001)
//! - `LOG_FORMAT`: "json" or "pretty" (default: json)

use std::time::Duration;

use crate::access::AccessPolicy;
use crate::cache::CacheConfig;
use crate::catalogue::DEFAULT_LANGUAGE;
use crate::renderer::RendererConfig;
use crate::types::DEFAULT_STORIES_ROOT;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON lines.
    Json,
    /// Human-readable output for local development.
    Pretty,
}

impl LogFormat {
    fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("pretty") {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct StoryPagesConfig {
    /// Renderer settings.
    pub renderer: RendererConfig,
    /// Generate every enumerated path before accepting traffic.
    pub prebuild: bool,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Log output format.
    pub log_format: LogFormat,
}

impl StoryPagesConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let access_policy = match get("ACCESS_POLICY").map(|v| v.parse::<AccessPolicy>()) {
            Some(Ok(policy)) => policy,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Ignoring ACCESS_POLICY, using request_only");
                AccessPolicy::default()
            }
            None => AccessPolicy::default(),
        };

        Self {
            renderer: RendererConfig {
                stories_root: get("STORIES_ROOT").unwrap_or_else(|| DEFAULT_STORIES_ROOT.to_string()),
                language: get("CATALOGUE_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
                access_policy,
                cache: CacheConfig {
                    max_entries: get("CACHE_MAX_ENTRIES")
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(1024),
                    revalidate: Duration::from_secs(
                        get("REVALIDATE_SECS")
                            .and_then(|s| s.parse().ok())
                            .unwrap_or(1),
                    ),
                },
            },
            prebuild: get("PREBUILD")
                .map(|s| !matches!(s.to_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(true),
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("PORT").and_then(|s| s.parse().ok()).unwrap_or(8001),
            log_format: get("LOG_FORMAT").map(|s| LogFormat::parse(&s)).unwrap_or(LogFormat::Json),
        }
    }
}

impl Default for StoryPagesConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
