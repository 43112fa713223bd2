//! Path identifiers and decoded render requests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved suffix that marks a request for the restricted (exclusive)
/// rendering of a story.
pub const EXCLUSIVE_MARKER: &str = "-_-_-exclusive";

/// Catalogue folder holding all stories.
pub const DEFAULT_STORIES_ROOT: &str = "/stories";

/// One renderable path produced by the path enumerator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathEntry {
    /// Full page path, including the marker for restricted entries.
    pub path: String,
    /// Whether this entry addresses the restricted rendering.
    pub is_restricted: bool,
}

impl PathEntry {
    /// Public entry for a catalogue path.
    pub fn public(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_restricted: false,
        }
    }

    /// Restricted entry for a catalogue path (appends the marker).
    pub fn restricted(path: &str) -> Self {
        Self {
            path: format!("{}{}", path, EXCLUSIVE_MARKER),
            is_restricted: true,
        }
    }
}

/// A render request decoded once at the boundary.
///
/// Two independent facts come out of the raw route parameter: which catalogue
/// item to look up, and whether the caller asked for the exclusive variant.
/// Nothing downstream re-parses the marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryRequest {
    /// Story slug with the marker removed.
    pub slug: String,
    /// Catalogue path used for the lookup.
    pub catalogue_path: String,
    /// Whether the marker was present.
    pub exclusive_requested: bool,
}

impl StoryRequest {
    /// Decode a route parameter under the default stories root.
    pub fn parse(path_param: &str) -> Self {
        Self::parse_under(path_param, DEFAULT_STORIES_ROOT)
    }

    /// Decode a route parameter under `root`.
    ///
    /// Accepts a bare slug (`foo`), a slug with the marker
    /// (`foo-_-_-exclusive`) or a full page path (`/stories/foo-_-_-exclusive`).
    pub fn parse_under(path_param: &str, root: &str) -> Self {
        let exclusive_requested = path_param.contains(EXCLUSIVE_MARKER);
        let stripped = path_param.replacen(EXCLUSIVE_MARKER, "", 1);

        let root = root.trim_end_matches('/');
        let relative = stripped
            .strip_prefix(root)
            .filter(|rest| rest.starts_with('/'))
            .unwrap_or(&stripped);
        let slug = relative.trim_matches('/').to_string();

        Self {
            catalogue_path: format!("{}/{}", root, slug),
            slug,
            exclusive_requested,
        }
    }

    /// Cache key of the rendered page; equal to the enumerated page path.
    pub fn page_key(&self) -> String {
        if self.exclusive_requested {
            format!("{}{}", self.catalogue_path, EXCLUSIVE_MARKER)
        } else {
            self.catalogue_path.clone()
        }
    }
}

impl fmt::Display for StoryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.page_key())
    }
}
