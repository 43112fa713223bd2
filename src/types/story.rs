//! Normalized story view.
//!
//! A `StoryView` is built once per fetch by the normalizer and never mutated
//! afterwards. Every field already carries its empty default, so the render
//! layer never has to probe for absence.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalogue::{Image, Video};

/// Content classification of every story page.
pub const ARTICLE_KIND: &str = "article";

/// One narrative paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Section heading.
    pub title: Option<String>,
    /// Structured rich-text body.
    pub body: Option<Value>,
    /// Paragraph images.
    pub images: Vec<Image>,
    /// Paragraph videos.
    pub videos: Vec<Video>,
}

/// One byline author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// Display name.
    pub name: Option<String>,
    /// Role on the story ("Photographer", "Editor", ...).
    pub role: Option<String>,
    /// Contact address.
    pub email: Option<String>,
    /// First image of the author's picture component.
    pub photo: Option<Image>,
}

/// A product promoted alongside the story.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturedProduct {
    /// Catalogue id.
    pub id: Option<String>,
    /// Product name.
    pub name: Option<String>,
    /// Catalogue path of the product page.
    pub path: Option<String>,
    /// Price of the default variant.
    pub price: Option<f64>,
    /// Thumbnail rendition of the default variant's first image.
    pub thumbnail_url: Option<String>,
}

/// Page metadata handed to the view layer's `<head>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Story name.
    pub title: Option<String>,
    /// First plain-text intro segment.
    pub description: Option<String>,
    /// First hero image URL.
    pub preview_media_url: Option<String>,
    /// Always [`ARTICLE_KIND`].
    #[serde(rename = "type")]
    pub kind: String,
}

/// Flat, typed view over a fetched story graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryView {
    /// Story name.
    pub name: Option<String>,
    /// Catalogue path.
    pub path: Option<String>,
    /// Publication timestamp as returned by the catalogue.
    pub published_at: Option<String>,
    /// Catalogue `is-exclusive` flag (`false` when not authored).
    pub is_exclusive: bool,
    /// Intro plain-text segments.
    pub intro_plain_text: Vec<String>,
    /// Intro structured rich text.
    pub intro_structured: Option<Value>,
    /// Hero images.
    pub hero_images: Vec<Image>,
    /// Hero videos.
    pub hero_videos: Vec<Video>,
    /// Narrative paragraphs in catalogue order.
    pub paragraphs: Vec<Paragraph>,
    /// Byline authors in catalogue order.
    pub byline: Vec<Author>,
    /// Featured products in catalogue order.
    pub featured_products: Vec<FeaturedProduct>,
}

impl StoryView {
    /// Derive page metadata.
    pub fn meta(&self) -> PageMeta {
        PageMeta {
            title: self.name.clone(),
            description: self.intro_plain_text.first().cloned(),
            preview_media_url: self.hero_images.first().and_then(|i| i.url.clone()),
            kind: ARTICLE_KIND.to_string(),
        }
    }

    /// Whether any featured product was authored.
    pub fn has_featured_products(&self) -> bool {
        !self.featured_products.is_empty()
    }
}
