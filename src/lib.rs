//! # story-pages
//!
//! Static page resolution and content composition for editorial stories
//! served from a headless catalogue.
//!
//! The crate answers one question per request:
//!
//! > Given a story path, which sections make up the page, and in what order?
//!
//! ## Core Contract
//!
//! 1. Enumerate every renderable path (public, plus exclusive variants)
//! 2. Fetch and normalize the story graph of one path into a typed view
//! 3. Gate and compose the view into an ordered section list
//! 4. Cache the page and regenerate it in the background once stale
//!
//! ## Architecture
//!
//! ```text
//! enumerate_paths → {PathEntry}
//! StoryRequest → fetch_story → normalize → AccessGate → compose → RenderedPage
//!                     ↓                                               ↓
//!          Catalogue (GraphQL or Memory)                     RevalidationCache
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same raw graph + same access decision → identical sections
//! - Paragraph, byline and product order follow the catalogue
//! - Page fingerprints ignore the generation timestamp

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod catalogue;
pub mod fetcher;
pub mod normalize;
pub mod access;
pub mod compose;
pub mod enumerator;
pub mod cache;
pub mod canonical;
pub mod renderer;
pub mod config;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{
    CatalogueItem, Component, ComponentContent, StoryView, Paragraph, Author, FeaturedProduct,
    PageMeta, PathEntry, StoryRequest, Section, ProductPlacement, RenderedPage,
    EXCLUSIVE_MARKER, DEFAULT_STORIES_ROOT,
};
pub use catalogue::{Catalogue, CatalogueQuery, CatalogueError, QueryKind, InMemoryCatalogue};
#[cfg(feature = "http")]
pub use catalogue::{GraphqlCatalogue, GraphqlCatalogueConfig};
pub use fetcher::{fetch_story, RawStoryGraph};
pub use normalize::normalize;
pub use access::{decide_access, AccessGate, AccessPolicy};
pub use compose::{compose, product_injection_index};
pub use enumerator::{enumerate_paths, partition_children};
pub use cache::{RevalidationCache, CacheConfig, CacheLookup, CacheStats};
pub use canonical::{canonical_hash, canonical_hash_hex, page_fingerprint};
pub use renderer::{
    StoryRenderer, RendererConfig, RenderError, RenderOutcome, CacheStatus, PrebuildReport,
};
pub use config::StoryPagesConfig;

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceState};
