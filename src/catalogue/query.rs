//! GraphQL documents sent to the catalogue.
//!
//! Component aliases here must stay in sync with
//! [`component_alias`](crate::types::catalogue::component_alias).

/// Story page query. Variables: `path`, `language`.
pub const STORY_QUERY: &str = r#"
query GET_STORY($path: String!, $language: String!) {
  story: catalogue(path: $path, language: $language) {
    name
    path
    publishedAt
    title: component(id: "title") {
      id
      content { ... on SingleLineContent { text } }
    }
    isExclusive: component(id: "is-exclusive") {
      content { ... on BooleanContent { value } }
    }
    hero_images: component(id: "hero") {
      content {
        ... on ImageContent {
          images { url altText variants { url width height } }
        }
      }
    }
    hero_videos: component(id: "hero-video") {
      content {
        ... on VideoContent {
          videos {
            playlists
            thumbnails { url altText variants { url width height } }
          }
        }
      }
    }
    intro: component(id: "intro") {
      id
      content { ... on RichTextContent { json plainText } }
    }
    featuredProducts: component(id: "featured-products") {
      id
      content {
        ... on ItemRelationsContent {
          items {
            id
            ... on Product {
              name
              path
              defaultVariant {
                price
                images { variants { width url } }
              }
            }
          }
        }
      }
    }
    story: component(id: "story") {
      id
      content {
        ... on ParagraphCollectionContent {
          paragraphs {
            title { text }
            body { json }
            images { url altText variants { url width height } }
            videos {
              playlists
              thumbnails { url altText variants { url width height } }
            }
          }
        }
      }
    }
    byline: component(id: "byline") {
      id
      content {
        ... on ItemRelationsContent {
          items {
            id
            name: component(id: "name") { content { ... on SingleLineContent { text } } }
            email: component(id: "email") { content { ... on SingleLineContent { text } } }
            role: component(id: "role") { content { ... on SingleLineContent { text } } }
            picture: component(id: "picture") {
              content {
                ... on ImageContent {
                  images { url altText variants { url width height } }
                }
              }
            }
          }
        }
      }
    }
  }
}"#;

/// Children of the stories folder with their exclusivity flag.
/// Variables: `path`, `language`.
pub const CHILDREN_QUERY: &str = r#"
query GET_STORY_PATHS($path: String!, $language: String!) {
  catalogue(path: $path, language: $language) {
    children {
      path
      isExclusive: component(id: "is-exclusive") {
        content { ... on BooleanContent { value } }
      }
    }
  }
}"#;
