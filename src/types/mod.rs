//! Core types for story pages.

pub mod catalogue;
pub mod story;
pub mod request;
pub mod section;

pub use catalogue::{
    CatalogueItem, Component, ComponentContent, Image, ImageVariant, Video,
    SingleLineContent, RichTextContent, ImageContent, VideoContent, BooleanContent,
    ItemRelationsContent, ParagraphContent, ParagraphCollectionContent, ParagraphTitle, ProductVariant,
};
pub use story::{StoryView, Paragraph, Author, FeaturedProduct, PageMeta, ARTICLE_KIND};
pub use request::{PathEntry, StoryRequest, EXCLUSIVE_MARKER, DEFAULT_STORIES_ROOT};
pub use section::{Section, ProductPlacement, BylineEntry, RenderedPage, AUTHOR_PHOTO_SIZES};
