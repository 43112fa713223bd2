//! Catalogue content model.
//!
//! Mirrors the payload shapes the catalogue returns for each component type.
//! Every field is optional or defaulted: an absent or `null` field means "not
//! authored", never an error. Lists are decoded element by element, so one
//! malformed element never takes its siblings with it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Decode a list that may be `null` or hold malformed elements.
///
/// Anything other than an array yields an empty list. `null` and malformed
/// elements are skipped.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(list_elements(Value::deserialize(deserializer)?)
        .filter(|element| !element.is_null())
        .filter_map(|element| serde_json::from_value(element).ok())
        .collect())
}

/// Like [`lenient_list`], but a `null` or malformed element keeps its slot as
/// the default value, so positions stay aligned with the catalogue.
fn positional_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(list_elements(Value::deserialize(deserializer)?)
        .map(|element| serde_json::from_value(element).unwrap_or_default())
        .collect())
}

/// Decode an optional nested object; `null` or a malformed value is `None`.
fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok().flatten())
}

fn list_elements(value: Value) -> impl Iterator<Item = Value> {
    match value {
        Value::Array(elements) => elements,
        _ => Vec::new(),
    }
    .into_iter()
}

/// One rendition of an image at a specific width.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageVariant {
    /// Rendition URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Width in pixels.
    #[serde(default)]
    pub width: Option<u32>,
    /// Height in pixels.
    #[serde(default)]
    pub height: Option<u32>,
}

/// An image with its renditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Original image URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Alternative text.
    #[serde(default)]
    pub alt_text: Option<String>,
    /// Available renditions.
    #[serde(default, deserialize_with = "lenient_list")]
    pub variants: Vec<ImageVariant>,
}

impl Image {
    /// Image with a URL and no renditions.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }
}

/// A video with its streaming playlists and poster thumbnails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// Streaming playlist URLs (HLS, DASH, ...).
    #[serde(default, deserialize_with = "lenient_list")]
    pub playlists: Vec<String>,
    /// Poster images.
    #[serde(default, deserialize_with = "lenient_list")]
    pub thumbnails: Vec<Image>,
}

/// `SingleLineContent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SingleLineContent {
    #[serde(default)]
    pub text: Option<String>,
}

/// `RichTextContent`: structured JSON tree plus plain-text segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichTextContent {
    #[serde(default)]
    pub json: Option<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub plain_text: Vec<String>,
}

/// `ImageContent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    #[serde(default, deserialize_with = "lenient_list")]
    pub images: Vec<Image>,
}

/// `VideoContent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoContent {
    #[serde(default, deserialize_with = "lenient_list")]
    pub videos: Vec<Video>,
}

/// `BooleanContent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BooleanContent {
    #[serde(default)]
    pub value: Option<bool>,
}

/// `ItemRelationsContent`. Items stay raw because each relation target
/// (author, product) is queried with a different selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRelationsContent {
    #[serde(default, deserialize_with = "lenient_list")]
    pub items: Vec<Value>,
}

/// A paragraph title inside a paragraph collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphTitle {
    #[serde(default)]
    pub text: Option<String>,
}

/// A paragraph body inside a paragraph collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphBody {
    #[serde(default)]
    pub json: Option<Value>,
}

/// One paragraph of a `ParagraphCollectionContent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphContent {
    #[serde(default, deserialize_with = "lenient_option")]
    pub title: Option<ParagraphTitle>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub body: Option<ParagraphBody>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub images: Vec<Image>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub videos: Vec<Video>,
}

/// `ParagraphCollectionContent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphCollectionContent {
    #[serde(default, deserialize_with = "positional_list")]
    pub paragraphs: Vec<ParagraphContent>,
}

/// Component payload, one variant per component type.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentContent {
    /// Single line of text.
    SingleLine(SingleLineContent),
    /// Rich text.
    RichText(RichTextContent),
    /// Image set.
    Images(ImageContent),
    /// Video set.
    Videos(VideoContent),
    /// Boolean flag.
    Boolean(BooleanContent),
    /// Relations to other catalogue items.
    ItemRelations(Vec<CatalogueItem>),
    /// Ordered paragraphs.
    ParagraphCollection(ParagraphCollectionContent),
}

/// A named, typed content slot on a catalogue item.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Symbolic id (`title`, `hero`, `byline`, ...).
    pub id: String,
    /// `None` when the slot exists but was never authored.
    pub content: Option<ComponentContent>,
}

impl Component {
    /// Create an authored component.
    pub fn new(id: impl Into<String>, content: ComponentContent) -> Self {
        Self {
            id: id.into(),
            content: Some(content),
        }
    }

    /// Create an empty (unauthored) component.
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: None,
        }
    }
}

/// Default variant of a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub images: Vec<Image>,
}

/// A path-addressed node of the catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueItem {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unique catalogue path.
    pub path: String,
    /// Publication timestamp (RFC 3339).
    pub published_at: Option<String>,
    /// Ordered components.
    pub components: Vec<Component>,
    /// Set for products only.
    pub default_variant: Option<ProductVariant>,
}

impl CatalogueItem {
    /// Create an item with no components.
    pub fn new(id: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
            published_at: None,
            components: Vec::new(),
            default_variant: None,
        }
    }

    /// Builder: append a component.
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// Builder: set the publication timestamp.
    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = Some(published_at.into());
        self
    }

    /// Builder: set the product default variant.
    pub fn with_default_variant(mut self, variant: ProductVariant) -> Self {
        self.default_variant = Some(variant);
        self
    }

    /// Look up a component by id.
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Value of the `is-exclusive` boolean component, `false` when absent.
    pub fn is_exclusive(&self) -> bool {
        matches!(
            self.component(IS_EXCLUSIVE_COMPONENT).and_then(|c| c.content.as_ref()),
            Some(ComponentContent::Boolean(BooleanContent { value: Some(true) }))
        )
    }

    /// Project the item into the response shape of the catalogue queries,
    /// each component under the alias the query selects it as. Unauthored
    /// lists come out as `null`, the way the live catalogue answers.
    pub fn to_graph(&self) -> Value {
        let mut node = Map::new();
        node.insert("id".into(), Value::String(self.id.clone()));
        node.insert("path".into(), Value::String(self.path.clone()));
        if self.component("name").is_none() {
            node.insert("name".into(), Value::String(self.name.clone()));
        }
        if let Some(published_at) = &self.published_at {
            node.insert("publishedAt".into(), Value::String(published_at.clone()));
        }
        if let Some(variant) = &self.default_variant {
            node.insert(
                "defaultVariant".into(),
                serde_json::to_value(variant).map_or(Value::Null, null_empty_lists),
            );
        }
        for component in &self.components {
            let content = match &component.content {
                Some(content) => content_to_graph(content),
                None => Value::Null,
            };
            let mut slot = Map::new();
            slot.insert("id".into(), Value::String(component.id.clone()));
            slot.insert("content".into(), content);
            node.insert(component_alias(&component.id).into(), Value::Object(slot));
        }
        Value::Object(node)
    }
}

/// Component id of the exclusivity flag.
pub const IS_EXCLUSIVE_COMPONENT: &str = "is-exclusive";

/// Alias under which a component id appears in query responses.
pub fn component_alias(id: &str) -> &str {
    match id {
        "hero" => "hero_images",
        "hero-video" => "hero_videos",
        "featured-products" => "featuredProducts",
        IS_EXCLUSIVE_COMPONENT => "isExclusive",
        other => other,
    }
}

/// Replace empty lists with `null`, leaving rich-text trees untouched.
fn null_empty_lists(value: Value) -> Value {
    match value {
        Value::Array(elements) if elements.is_empty() => Value::Null,
        Value::Array(elements) => Value::Array(elements.into_iter().map(null_empty_lists).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, field)| {
                    let field = if key == "json" { field } else { null_empty_lists(field) };
                    (key, field)
                })
                .collect(),
        ),
        other => other,
    }
}

fn content_to_graph(content: &ComponentContent) -> Value {
    let value = match content {
        ComponentContent::SingleLine(c) => serde_json::to_value(c),
        ComponentContent::RichText(c) => serde_json::to_value(c),
        ComponentContent::Images(c) => serde_json::to_value(c),
        ComponentContent::Videos(c) => serde_json::to_value(c),
        ComponentContent::Boolean(c) => serde_json::to_value(c),
        ComponentContent::ParagraphCollection(c) => serde_json::to_value(c),
        ComponentContent::ItemRelations(items) => {
            let items: Vec<Value> = items.iter().map(CatalogueItem::to_graph).collect();
            return null_empty_lists(serde_json::json!({ "items": items }));
        }
    };
    value.map_or(Value::Null, null_empty_lists)
}
