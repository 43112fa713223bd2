//! Golden tests for story page generation.
//!
//! These tests drive the full pipeline (enumerate, fetch, normalize, gate,
//! compose, cache) against an in-memory catalogue.

use std::sync::Arc;
use std::time::Duration;

use story_pages::types::{
    BooleanContent, ImageContent, ParagraphCollectionContent, ParagraphContent, ParagraphTitle,
    ProductVariant, SingleLineContent,
};
use story_pages::{
    compose, decide_access, enumerate_paths, fetch_story, normalize, CacheConfig, CacheStatus,
    CatalogueError, CatalogueItem, Component, ComponentContent, InMemoryCatalogue, PathEntry,
    ProductPlacement, RenderError, RendererConfig, Section, StoryRenderer, StoryRequest,
    DEFAULT_STORIES_ROOT,
};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn make_story(slug: &str, exclusive: bool, paragraphs: usize) -> CatalogueItem {
    CatalogueItem::new(slug, format!("Story {}", slug), format!("/stories/{}", slug))
        .with_published_at("2021-06-01T08:00:00Z")
        .with_component(Component::new(
            "is-exclusive",
            ComponentContent::Boolean(BooleanContent { value: Some(exclusive) }),
        ))
        .with_component(Component::new(
            "story",
            ComponentContent::ParagraphCollection(ParagraphCollectionContent {
                paragraphs: (0..paragraphs)
                    .map(|i| ParagraphContent {
                        title: Some(ParagraphTitle { text: Some(format!("Paragraph {}", i)) }),
                        ..ParagraphContent::default()
                    })
                    .collect(),
            }),
        ))
}

fn make_product(id: &str) -> CatalogueItem {
    CatalogueItem::new(id, format!("Product {}", id), format!("/shop/{}", id))
        .with_default_variant(ProductVariant { price: Some(49.0), images: Vec::new() })
}

fn make_author(name: &str) -> CatalogueItem {
    CatalogueItem::new(name, name, format!("/authors/{}", name))
        .with_component(Component::new(
            "name",
            ComponentContent::SingleLine(SingleLineContent { text: Some(name.to_string()) }),
        ))
        .with_component(Component::new(
            "picture",
            ComponentContent::Images(ImageContent {
                images: vec![story_pages::types::Image::from_url(format!("{}.jpg", name))],
            }),
        ))
}

fn with_products(item: CatalogueItem) -> CatalogueItem {
    item.with_component(Component::new(
        "featured-products",
        ComponentContent::ItemRelations(vec![make_product("grinder"), make_product("kettle")]),
    ))
}

fn make_renderer(
    items: Vec<CatalogueItem>,
    revalidate: Duration,
) -> (Arc<InMemoryCatalogue>, Arc<StoryRenderer<InMemoryCatalogue>>) {
    let catalogue = Arc::new(InMemoryCatalogue::with_items(items));
    let config = RendererConfig {
        cache: CacheConfig { max_entries: 64, revalidate },
        ..RendererConfig::default()
    };
    (Arc::clone(&catalogue), Arc::new(StoryRenderer::new(catalogue, config)))
}

fn kinds(sections: &[Section]) -> Vec<&'static str> {
    sections
        .iter()
        .map(|s| match s {
            Section::Hero { .. } => "hero",
            Section::Paragraph { .. } => "paragraph",
            Section::MembersOnly { .. } => "members_only",
            Section::FeaturedProducts { placement: ProductPlacement::MidNarrative, .. } => "products_mid",
            Section::FeaturedProducts { placement: ProductPlacement::EndOfDocument, .. } => "products_end",
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Path Enumeration
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_enumeration_adds_exclusive_variants() {
    let catalogue = InMemoryCatalogue::with_items(vec![
        make_story("coffee", true, 2),
        make_story("tea", false, 2),
    ]);

    let paths = enumerate_paths(&catalogue, DEFAULT_STORIES_ROOT, "en").await;
    assert_eq!(
        paths,
        vec![
            PathEntry::public("/stories/coffee"),
            PathEntry::public("/stories/tea"),
            PathEntry::restricted("/stories/coffee"),
        ]
    );
    assert_eq!(paths[2].path, "/stories/coffee-_-_-exclusive");
}

#[tokio::test]
async fn test_enumeration_failure_is_empty() {
    let catalogue = InMemoryCatalogue::with_items(vec![make_story("coffee", true, 2)]);
    catalogue.set_failure(Some(CatalogueError::Transport("connection refused".into())));

    let paths = enumerate_paths(&catalogue, DEFAULT_STORIES_ROOT, "en").await;
    assert!(paths.is_empty());
}

#[tokio::test]
async fn test_enumeration_of_unknown_root_is_empty() {
    let catalogue = InMemoryCatalogue::with_items(vec![make_story("coffee", true, 2)]);
    let paths = enumerate_paths(&catalogue, "/journal", "en").await;
    assert!(paths.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Fetch, Normalize, Compose
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_byline_is_empty() {
    let catalogue = InMemoryCatalogue::with_items(vec![make_story("coffee", false, 1)]);
    let raw = fetch_story(&catalogue, "/stories/coffee", "en").await.unwrap();

    let view = normalize(&raw);
    assert!(view.byline.is_empty());
    assert_eq!(view.name.as_deref(), Some("Story coffee"));
}

#[tokio::test]
async fn test_byline_order_and_photos() {
    let item = make_story("coffee", true, 1).with_component(Component::new(
        "byline",
        ComponentContent::ItemRelations(vec![make_author("ada"), make_author("grace")]),
    ));
    let catalogue = InMemoryCatalogue::with_items(vec![item]);
    let raw = fetch_story(&catalogue, "/stories/coffee", "en").await.unwrap();

    let sections = compose(&normalize(&raw), true);
    let Section::Hero { byline, .. } = &sections[0] else {
        panic!("first section must be the hero");
    };
    let names: Vec<_> = byline.iter().filter_map(|b| b.name.as_deref()).collect();
    assert_eq!(names, vec!["ada", "grace"]);
    assert_eq!(byline[0].photo.as_ref().and_then(|p| p.url.as_deref()), Some("ada.jpg"));
    assert_eq!(byline[0].photo_sizes, "50px");
}

#[tokio::test]
async fn test_gated_story_has_single_body_section() {
    let catalogue = InMemoryCatalogue::with_items(vec![with_products(make_story("coffee", true, 6))]);
    let raw = fetch_story(&catalogue, "/stories/coffee", "en").await.unwrap();

    let sections = compose(&normalize(&raw), false);
    assert_eq!(kinds(&sections), vec!["hero", "members_only", "products_end"]);
    assert_eq!(sections.iter().filter(|s| s.is_body()).count(), 1);
}

#[tokio::test]
async fn test_four_paragraphs_inject_before_index_two() {
    let catalogue = InMemoryCatalogue::with_items(vec![with_products(make_story("coffee", true, 4))]);
    let raw = fetch_story(&catalogue, "/stories/coffee", "en").await.unwrap();

    let sections = compose(&normalize(&raw), true);
    assert_eq!(
        kinds(&sections),
        vec!["hero", "paragraph", "paragraph", "products_mid", "paragraph", "paragraph", "products_end"]
    );
    let Section::Paragraph { index, .. } = &sections[4] else {
        panic!("expected paragraph after the products block");
    };
    assert_eq!(*index, 2);
}

#[tokio::test]
async fn test_single_paragraph_gets_only_closing_products() {
    let catalogue = InMemoryCatalogue::with_items(vec![with_products(make_story("coffee", true, 1))]);
    let raw = fetch_story(&catalogue, "/stories/coffee", "en").await.unwrap();

    let sections = compose(&normalize(&raw), true);
    assert_eq!(kinds(&sections), vec!["hero", "paragraph", "products_end"]);
}

#[tokio::test]
async fn test_unauthored_media_lists_arrive_null_and_keep_paragraphs() {
    let catalogue = InMemoryCatalogue::with_items(vec![with_products(make_story("coffee", true, 3))]);
    let raw = fetch_story(&catalogue, "/stories/coffee", "en").await.unwrap();

    let paragraphs = &raw.as_value()["data"]["story"]["story"]["content"]["paragraphs"];
    assert!(paragraphs[0]["images"].is_null());
    assert!(paragraphs[0]["videos"].is_null());
    let product = &raw.as_value()["data"]["story"]["featuredProducts"]["content"]["items"][0];
    assert!(product["defaultVariant"]["images"].is_null());

    let view = normalize(&raw);
    assert_eq!(view.paragraphs.len(), 3);
    assert_eq!(view.featured_products[0].price, Some(49.0));
    assert_eq!(compose(&view, true).iter().filter(|s| s.is_body()).count(), 3);
}

#[tokio::test]
async fn test_composition_is_idempotent() {
    let catalogue = InMemoryCatalogue::with_items(vec![with_products(make_story("coffee", true, 5))]);
    let first = fetch_story(&catalogue, "/stories/coffee", "en").await.unwrap();
    let second = fetch_story(&catalogue, "/stories/coffee", "en").await.unwrap();

    assert_eq!(compose(&normalize(&first), true), compose(&normalize(&second), true));
    assert_eq!(compose(&normalize(&first), false), compose(&normalize(&second), false));
}

#[test]
fn test_marker_grants_access_regardless_of_flag() {
    let request = StoryRequest::parse("/stories/foo-_-_-exclusive");
    assert_eq!(request.catalogue_path, "/stories/foo");
    assert!(request.exclusive_requested);

    assert!(decide_access("/stories/foo-_-_-exclusive", false));
    assert!(decide_access("/stories/foo-_-_-exclusive", true));
    assert!(!decide_access("/stories/foo", true));
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderer and Cache
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_render_flow_miss_hit() {
    let (catalogue, renderer) = make_renderer(vec![make_story("coffee", true, 3)], Duration::from_secs(60));

    let first = renderer.render("coffee-_-_-exclusive").await.unwrap();
    assert_eq!(first.cache, CacheStatus::Miss);
    assert!(first.page.exclusive);
    assert_eq!(first.page.meta.title.as_deref(), Some("Story coffee"));

    let second = renderer.render("coffee-_-_-exclusive").await.unwrap();
    assert_eq!(second.cache, CacheStatus::Hit);
    assert_eq!(first.page.fingerprint, second.page.fingerprint);
    assert_eq!(catalogue.query_count(), 1);
}

#[tokio::test]
async fn test_render_unknown_story_is_not_found() {
    let (_, renderer) = make_renderer(vec![make_story("coffee", true, 3)], Duration::from_secs(60));
    let result = renderer.render("tea").await;
    assert!(matches!(result, Err(RenderError::NotFound(_))));
}

#[tokio::test]
async fn test_prebuild_caches_every_enumerated_path() {
    let (catalogue, renderer) = make_renderer(
        vec![make_story("coffee", true, 2), make_story("tea", false, 2)],
        Duration::from_secs(60),
    );

    let report = renderer.prebuild().await;
    assert_eq!(report.enumerated, 3);
    assert_eq!(report.generated, 3);
    assert!(report.failures.is_empty());
    assert_eq!(renderer.cache_stats().len, 3);

    let queries = catalogue.query_count();
    let page = renderer.render("tea").await.unwrap();
    assert_eq!(page.cache, CacheStatus::Hit);
    assert_eq!(catalogue.query_count(), queries);
}

#[tokio::test]
async fn test_stale_page_is_regenerated_in_background() {
    let (catalogue, renderer) = make_renderer(vec![make_story("coffee", true, 1)], Duration::ZERO);

    let first = renderer.render("coffee-_-_-exclusive").await.unwrap();
    catalogue.upsert(make_story("coffee", true, 3));

    let stale = renderer.render("coffee-_-_-exclusive").await.unwrap();
    assert_eq!(stale.cache, CacheStatus::Stale);
    assert_eq!(stale.page.fingerprint, first.page.fingerprint);

    for _ in 0..50 {
        if !renderer.cache().is_regenerating("/stories/coffee-_-_-exclusive") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let next = renderer.render("coffee-_-_-exclusive").await.unwrap();
    assert_ne!(next.page.fingerprint, first.page.fingerprint);
    let paragraphs = next.page.sections.iter().filter(|s| matches!(s, Section::Paragraph { .. })).count();
    assert_eq!(paragraphs, 3);
}
