//! Content normalizer.
//!
//! Walks a raw story graph once and produces a fully typed [`StoryView`].
//! Every access chain (story, component, content, field) may be broken at any
//! link; a broken chain yields the field's empty value. A content payload of
//! the wrong shape counts as absent. Lists inside a payload may be `null` and
//! are decoded element by element, so a null or malformed entry only empties
//! itself.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::fetcher::RawStoryGraph;
use crate::types::{
    Author, BooleanContent, FeaturedProduct, Image, ImageContent, ItemRelationsContent,
    Paragraph, ParagraphCollectionContent, ProductVariant, RichTextContent,
    SingleLineContent, StoryView, VideoContent,
};

/// Narrowest product thumbnail width worth showing.
pub const PRODUCT_THUMBNAIL_MIN_WIDTH: u32 = 200;

/// Normalize a raw story graph. Pure; never fails.
pub fn normalize(raw: &RawStoryGraph) -> StoryView {
    let Some(story) = raw.story() else {
        return StoryView::default();
    };

    let intro = content::<RichTextContent>(story, "intro").unwrap_or_default();

    StoryView {
        name: string_field(story, "name"),
        path: string_field(story, "path"),
        published_at: string_field(story, "publishedAt"),
        is_exclusive: content::<BooleanContent>(story, "isExclusive")
            .and_then(|c| c.value)
            .unwrap_or(false),
        intro_plain_text: intro.plain_text,
        intro_structured: intro.json.filter(|json| !json.is_null()),
        hero_images: content::<ImageContent>(story, "hero_images")
            .map(|c| c.images)
            .unwrap_or_default(),
        hero_videos: content::<VideoContent>(story, "hero_videos")
            .map(|c| c.videos)
            .unwrap_or_default(),
        paragraphs: paragraphs(story),
        byline: relation_items(story, "byline").iter().map(author).collect(),
        featured_products: relation_items(story, "featuredProducts")
            .iter()
            .map(featured_product)
            .collect(),
    }
}

/// Deserialize the `content` of the component selected under `alias`.
fn content<T: DeserializeOwned>(node: &Value, alias: &str) -> Option<T> {
    let content = node.get(alias)?.get("content")?;
    if content.is_null() {
        return None;
    }
    match serde_json::from_value(content.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!(component = alias, error = %e, "Ignoring component with unexpected shape");
            None
        }
    }
}

fn string_field(node: &Value, key: &str) -> Option<String> {
    node.get(key).and_then(Value::as_str).map(str::to_string)
}

fn single_line(node: &Value, alias: &str) -> Option<String> {
    content::<SingleLineContent>(node, alias).and_then(|c| c.text)
}

fn relation_items(story: &Value, alias: &str) -> Vec<Value> {
    content::<ItemRelationsContent>(story, alias)
        .map(|c| c.items)
        .unwrap_or_default()
}

fn paragraphs(story: &Value) -> Vec<Paragraph> {
    content::<ParagraphCollectionContent>(story, "story")
        .map(|c| c.paragraphs)
        .unwrap_or_default()
        .into_iter()
        .map(|p| Paragraph {
            title: p.title.and_then(|t| t.text),
            body: p.body.and_then(|b| b.json).filter(|json| !json.is_null()),
            images: p.images,
            videos: p.videos,
        })
        .collect()
}

fn author(item: &Value) -> Author {
    Author {
        name: single_line(item, "name"),
        role: single_line(item, "role"),
        email: single_line(item, "email"),
        photo: content::<ImageContent>(item, "picture").and_then(|c| c.images.into_iter().next()),
    }
}

fn featured_product(item: &Value) -> FeaturedProduct {
    let variant: Option<ProductVariant> = item
        .get("defaultVariant")
        .filter(|v| v.is_object())
        .and_then(|v| serde_json::from_value(v.clone()).ok());

    FeaturedProduct {
        id: string_field(item, "id"),
        name: string_field(item, "name"),
        path: string_field(item, "path"),
        price: variant.as_ref().and_then(|v| v.price),
        thumbnail_url: variant
            .as_ref()
            .and_then(|v| v.images.first())
            .and_then(thumbnail_url),
    }
}

/// Pick the narrowest rendition at least [`PRODUCT_THUMBNAIL_MIN_WIDTH`] wide,
/// else the widest one, else the original image URL.
fn thumbnail_url(image: &Image) -> Option<String> {
    let sized = image
        .variants
        .iter()
        .filter_map(|v| Some((v.width.unwrap_or(0), v.url.as_ref()?)));

    let large_enough = sized
        .clone()
        .filter(|(width, _)| *width >= PRODUCT_THUMBNAIL_MIN_WIDTH)
        .min_by_key(|(width, _)| *width);

    large_enough
        .or_else(|| sized.max_by_key(|(width, _)| *width))
        .map(|(_, url)| url.clone())
        .or_else(|| image.url.clone())
}
