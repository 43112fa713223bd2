//! Service state management.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::catalogue::{Catalogue, CatalogueError, CatalogueQuery};
use crate::renderer::{RendererConfig, StoryRenderer};

/// Shared service state.
///
/// Holds the renderer (and through it the catalogue and page cache).
pub struct ServiceState<C: Catalogue + ?Sized + 'static> {
    /// The page renderer.
    pub renderer: Arc<StoryRenderer<C>>,
    started_at: DateTime<Utc>,
}

impl<C: Catalogue + ?Sized + 'static> ServiceState<C> {
    /// Create service state over a catalogue.
    pub fn new(catalogue: Arc<C>, config: RendererConfig) -> Self {
        Self::with_renderer(Arc::new(StoryRenderer::new(catalogue, config)))
    }

    /// Create service state around an existing renderer.
    pub fn with_renderer(renderer: Arc<StoryRenderer<C>>) -> Self {
        Self {
            renderer,
            started_at: Utc::now(),
        }
    }

    /// When the service state was created.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Check that the catalogue answers a children query for the stories
    /// folder.
    pub async fn check_catalogue(&self) -> Result<(), CatalogueError> {
        let query = CatalogueQuery::children(self.renderer.stories_root(), self.renderer.language());
        self.renderer.catalogue().query(&query).await.map(|_| ())
    }
}

impl<C: Catalogue + ?Sized + 'static> Clone for ServiceState<C> {
    fn clone(&self) -> Self {
        Self {
            renderer: Arc::clone(&self.renderer),
            started_at: self.started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::InMemoryCatalogue;

    #[tokio::test]
    async fn test_check_catalogue() {
        let catalogue = Arc::new(InMemoryCatalogue::new());
        let state = ServiceState::new(Arc::clone(&catalogue), RendererConfig::default());
        assert!(state.check_catalogue().await.is_ok());

        catalogue.set_failure(Some(CatalogueError::Transport("down".into())));
        assert!(state.check_catalogue().await.is_err());
    }

    #[test]
    fn test_clone_shares_renderer() {
        let state = ServiceState::new(Arc::new(InMemoryCatalogue::new()), RendererConfig::default());
        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.renderer, &clone.renderer));
        assert_eq!(state.started_at(), clone.started_at());
    }
}
