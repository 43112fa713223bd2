//! Story page renderer.
//!
//! Runs the per-request pipeline and owns the revalidation cache.
//!
//! ## Pipeline
//!
//! ```text
//! route param → StoryRequest → fetch_story → normalize → AccessGate → compose → RenderedPage
//! ```
//!
//! ## Regeneration
//!
//! 1. Fresh page cached: serve it
//! 2. Stale page cached: serve it, regenerate in the background (one task per key)
//! 3. Nothing cached: generate while the request waits, then cache
//!
//! A failed background regeneration keeps the previous page. A story that
//! disappeared from the catalogue is evicted.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::access::{AccessGate, AccessPolicy};
use crate::cache::{CacheConfig, CacheLookup, CacheStats, RevalidationCache};
use crate::canonical::page_fingerprint;
use crate::catalogue::{Catalogue, CatalogueError, DEFAULT_LANGUAGE};
use crate::compose::compose;
use crate::enumerator::enumerate_paths;
use crate::fetcher::fetch_story;
use crate::normalize::normalize;
use crate::types::{PathEntry, RenderedPage, StoryRequest, DEFAULT_STORIES_ROOT};

/// Error type for page rendering.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderError {
    /// The catalogue has no story at this path.
    #[error("Story not found: {0}")]
    NotFound(String),
    /// The catalogue could not be queried.
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
}

/// Renderer configuration.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Catalogue folder holding the stories.
    pub stories_root: String,
    /// Language tag sent with every query.
    pub language: String,
    /// How exclusive renderings are granted.
    pub access_policy: AccessPolicy,
    /// Page cache settings.
    pub cache: CacheConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            stories_root: DEFAULT_STORIES_ROOT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            access_policy: AccessPolicy::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// How a served page was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    /// Fresh page from the cache.
    Hit,
    /// Stale page from the cache; a regeneration was scheduled.
    Stale,
    /// Generated for this request.
    Miss,
}

impl CacheStatus {
    /// Header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Stale => "STALE",
            Self::Miss => "MISS",
        }
    }
}

/// A served page and how it was obtained.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// The page.
    pub page: Arc<RenderedPage>,
    /// Cache status.
    pub cache: CacheStatus,
}

/// A path that failed during prebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrebuildFailure {
    /// Page path.
    pub path: String,
    /// Error message.
    pub error: String,
}

/// Summary of a prebuild run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrebuildReport {
    /// Number of paths enumerated.
    pub enumerated: usize,
    /// Number of pages generated and cached.
    pub generated: usize,
    /// Paths left to on-demand generation.
    pub failures: Vec<PrebuildFailure>,
}

/// Story page renderer.
pub struct StoryRenderer<C: Catalogue + ?Sized> {
    catalogue: Arc<C>,
    cache: Arc<RevalidationCache>,
    gate: AccessGate,
    stories_root: String,
    language: String,
}

impl<C: Catalogue + ?Sized + 'static> StoryRenderer<C> {
    /// Create a renderer over `catalogue`.
    pub fn new(catalogue: Arc<C>, config: RendererConfig) -> Self {
        Self {
            catalogue,
            cache: Arc::new(RevalidationCache::new(config.cache)),
            gate: AccessGate::new(config.access_policy),
            stories_root: config.stories_root,
            language: config.language,
        }
    }

    /// Catalogue backend.
    pub fn catalogue(&self) -> &Arc<C> {
        &self.catalogue
    }

    /// Active access policy.
    pub fn access_policy(&self) -> AccessPolicy {
        self.gate.policy()
    }

    /// Catalogue folder holding the stories.
    pub fn stories_root(&self) -> &str {
        &self.stories_root
    }

    /// Language tag sent with every query.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Page cache.
    pub fn cache(&self) -> &Arc<RevalidationCache> {
        &self.cache
    }

    /// Get cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Decode a route parameter.
    pub fn request(&self, path_param: &str) -> StoryRequest {
        StoryRequest::parse_under(path_param, &self.stories_root)
    }

    /// Enumerate the paths to prebuild.
    pub async fn enumerate(&self) -> Vec<PathEntry> {
        enumerate_paths(self.catalogue.as_ref(), &self.stories_root, &self.language).await
    }

    /// Generate a page, bypassing the cache.
    pub async fn generate(&self, request: &StoryRequest) -> Result<RenderedPage, RenderError> {
        let start = Instant::now();
        let raw = fetch_story(self.catalogue.as_ref(), &request.catalogue_path, &self.language).await?;
        if !raw.story_exists() {
            return Err(RenderError::NotFound(request.catalogue_path.clone()));
        }

        let view = normalize(&raw);
        let exclusive = self.gate.decide(request, view.is_exclusive);
        let sections = compose(&view, exclusive);
        let meta = view.meta();
        let fingerprint = page_fingerprint(&meta, &sections);

        tracing::info!(
            target: "story_pages::metrics",
            metric_type = "render",
            key = %request.page_key(),
            exclusive = exclusive,
            sections = sections.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "render_metric"
        );

        Ok(RenderedPage {
            key: request.page_key(),
            catalogue_path: request.catalogue_path.clone(),
            exclusive,
            meta,
            sections,
            fingerprint,
            generated_at: Utc::now(),
        })
    }

    /// Serve the page for a route parameter through the cache.
    pub async fn render(self: &Arc<Self>, path_param: &str) -> Result<RenderOutcome, RenderError> {
        let request = self.request(path_param);
        let key = request.page_key();

        match self.cache.lookup(&key) {
            CacheLookup::Fresh(page) => Ok(RenderOutcome { page, cache: CacheStatus::Hit }),
            CacheLookup::Stale(page) => {
                self.schedule_regeneration(request);
                Ok(RenderOutcome { page, cache: CacheStatus::Stale })
            }
            CacheLookup::Miss => {
                let page = Arc::new(self.generate(&request).await?);
                self.cache.insert(key, Arc::clone(&page));
                Ok(RenderOutcome { page, cache: CacheStatus::Miss })
            }
        }
    }

    /// Regenerate `request` in the background unless a regeneration for the
    /// same key is already in flight.
    fn schedule_regeneration(self: &Arc<Self>, request: StoryRequest) {
        let key = request.page_key();
        let Some(guard) = self.cache.begin_regeneration(&key) else {
            tracing::debug!(key = %key, "Regeneration already in flight");
            return;
        };

        let renderer = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = guard;
            match renderer.generate(&request).await {
                Ok(page) => {
                    renderer.cache.insert(key.clone(), Arc::new(page));
                    tracing::debug!(key = %key, "Regenerated page");
                }
                Err(RenderError::NotFound(path)) => {
                    renderer.cache.invalidate(&key);
                    tracing::info!(key = %key, path = %path, "Story removed from catalogue, evicted page");
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Regeneration failed, keeping previous page");
                }
            }
        });
    }

    /// Generate and cache every enumerated path.
    ///
    /// Failures are reported, not raised: those paths are generated on
    /// demand later.
    pub async fn prebuild(&self) -> PrebuildReport {
        let paths = self.enumerate().await;
        let mut report = PrebuildReport {
            enumerated: paths.len(),
            ..PrebuildReport::default()
        };

        for entry in paths {
            let request = self.request(&entry.path);
            match self.generate(&request).await {
                Ok(page) => {
                    self.cache.insert(request.page_key(), Arc::new(page));
                    report.generated += 1;
                }
                Err(e) => {
                    tracing::warn!(path = %entry.path, error = %e, "Prebuild failed for path");
                    report.failures.push(PrebuildFailure {
                        path: entry.path,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            enumerated = report.enumerated,
            generated = report.generated,
            failed = report.failures.len(),
            "Prebuild complete"
        );
        report
    }
}
