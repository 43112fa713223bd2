//! Document composer.
//!
//! ## Layout
//!
//! ```text
//! exclusive:     Hero, P0, P1, [Products], P2, P3, [Products]
//! not exclusive: Hero, MembersOnly, [Products]
//! ```
//!
//! The mid-narrative products block sits before the paragraph at index
//! `round(N / 2)` with halves rounding up, so it only exists when that
//! paragraph does. The closing products block is independent of it.

use crate::types::{
    BylineEntry, ProductPlacement, Section, StoryView, AUTHOR_PHOTO_SIZES,
};

/// Index of the paragraph the mid-narrative products block precedes, for a
/// narrative of `paragraph_count` paragraphs.
pub fn product_injection_index(paragraph_count: usize) -> Option<usize> {
    let index = (paragraph_count + 1) / 2;
    (index < paragraph_count).then_some(index)
}

/// Compose the ordered section list of a story page. Pure.
pub fn compose(view: &StoryView, exclusive: bool) -> Vec<Section> {
    let mut sections = Vec::with_capacity(view.paragraphs.len() + 3);
    sections.push(hero(view));

    if exclusive {
        let injection = view
            .has_featured_products()
            .then(|| product_injection_index(view.paragraphs.len()))
            .flatten();

        for (index, paragraph) in view.paragraphs.iter().enumerate() {
            if injection == Some(index) {
                sections.push(featured_products(view, ProductPlacement::MidNarrative));
            }
            sections.push(Section::Paragraph {
                index,
                title: paragraph.title.clone(),
                body: paragraph.body.clone(),
                images: paragraph.images.clone(),
                videos: paragraph.videos.clone(),
                mirror: index % 2 == 1,
            });
        }
    } else {
        sections.push(Section::members_only());
    }

    if view.has_featured_products() {
        sections.push(featured_products(view, ProductPlacement::EndOfDocument));
    }

    sections
}

fn hero(view: &StoryView) -> Section {
    Section::Hero {
        title: view.name.clone(),
        intro: view.intro_structured.clone(),
        images: view.hero_images.clone(),
        videos: view.hero_videos.clone(),
        byline: view
            .byline
            .iter()
            .map(|author| BylineEntry {
                name: author.name.clone(),
                role: author.role.clone(),
                photo: author.photo.clone(),
                photo_sizes: AUTHOR_PHOTO_SIZES.to_string(),
            })
            .collect(),
    }
}

fn featured_products(view: &StoryView, placement: ProductPlacement) -> Section {
    Section::FeaturedProducts {
        placement,
        products: view.featured_products.clone(),
    }
}
