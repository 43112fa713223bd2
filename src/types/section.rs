//! Renderable sections and the rendered page record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalogue::{Image, Video};
use super::story::{FeaturedProduct, PageMeta};

/// `sizes` hint requested for byline photos.
pub const AUTHOR_PHOTO_SIZES: &str = "50px";

/// Heading of the members-only placeholder.
pub const MEMBERS_ONLY_HEADING: &str = "No access 😢";

/// Lead text of the members-only placeholder.
pub const MEMBERS_ONLY_LEAD: &str = "This is a members only article";

/// Byline entry as rendered in the hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BylineEntry {
    /// Author name.
    pub name: Option<String>,
    /// Author role.
    pub role: Option<String>,
    /// Author photo.
    pub photo: Option<Image>,
    /// Fixed thumbnail size hint for the photo.
    pub photo_sizes: String,
}

/// Where a featured-products block sits in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductPlacement {
    /// Spliced into the middle of the narrative.
    MidNarrative,
    /// Closing block of the document.
    EndOfDocument,
}

/// One renderable block of the composed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    /// Opening block: hero media, title, intro and byline.
    Hero {
        title: Option<String>,
        intro: Option<Value>,
        images: Vec<Image>,
        videos: Vec<Video>,
        byline: Vec<BylineEntry>,
    },
    /// One narrative paragraph.
    Paragraph {
        index: usize,
        title: Option<String>,
        body: Option<Value>,
        images: Vec<Image>,
        videos: Vec<Video>,
        /// Mirrored layout, set on odd paragraph indices.
        mirror: bool,
    },
    /// Placeholder standing in for the gated narrative.
    MembersOnly { heading: String, lead: String },
    /// Merchandising block.
    FeaturedProducts {
        placement: ProductPlacement,
        products: Vec<FeaturedProduct>,
    },
}

impl Section {
    /// Members-only placeholder.
    pub fn members_only() -> Self {
        Self::MembersOnly {
            heading: MEMBERS_ONLY_HEADING.to_string(),
            lead: MEMBERS_ONLY_LEAD.to_string(),
        }
    }

    /// Whether this section is part of the narrative body
    /// (a paragraph or the placeholder replacing them).
    pub fn is_body(&self) -> bool {
        matches!(self, Self::Paragraph { .. } | Self::MembersOnly { .. })
    }

    /// Placement of a featured-products section.
    pub fn product_placement(&self) -> Option<ProductPlacement> {
        match self {
            Self::FeaturedProducts { placement, .. } => Some(*placement),
            _ => None,
        }
    }
}

/// A fully composed page, as cached and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedPage {
    /// Page key (catalogue path, plus the marker for the exclusive variant).
    pub key: String,
    /// Catalogue path the content came from.
    pub catalogue_path: String,
    /// Whether the full narrative was composed.
    pub exclusive: bool,
    /// Page metadata.
    pub meta: PageMeta,
    /// Ordered sections.
    pub sections: Vec<Section>,
    /// Canonical hash of `meta` and `sections`.
    pub fingerprint: String,
    /// When this page was generated.
    pub generated_at: DateTime<Utc>,
}
