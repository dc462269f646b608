//! Blog post migration.

use std::collections::HashSet;

use tracing::{info, instrument, warn};

use wpmigrate_shared::{BlogPostDocument, Document, ImageRef, Reference, Seo, Slug};
use wpmigrate_source::SourcePost;
use wpmigrate_store::ContentStore;
use wpmigrate_transform::{strip_markup, to_blocks};

use crate::assets::AssetImporter;
use crate::categories::CategoryMap;
use crate::pipeline::{ItemKind, ProgressReporter, Tally};

/// Build the destination document for one source post.
///
/// Category ids without a mapping are dropped, and a repeated id is kept once
/// so every reference `_key` is unique. The featured image, if any,
/// has already been imported by the caller.
pub fn build_post_document(
    post: &SourcePost,
    categories: &CategoryMap,
    featured_image: Option<ImageRef>,
    unknown_author: &str,
) -> BlogPostDocument {
    let title = strip_markup(&post.title.rendered);
    let excerpt = strip_markup(&post.excerpt.rendered);

    let mut seen = HashSet::new();
    let category_refs = post
        .categories
        .iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| {
            categories
                .get(*id)
                .map(|doc_id| Reference::keyed(format!("cat-{id}"), doc_id.clone()))
        })
        .collect();

    BlogPostDocument {
        seo: Seo {
            meta_title: title.clone(),
            meta_description: Some(excerpt.clone()),
        },
        title,
        slug: Slug::new(&post.slug),
        author: post.author_name().unwrap_or(unknown_author).to_string(),
        published_at: post.published_at(),
        excerpt,
        featured_image,
        categories: category_refs,
        content: to_blocks(&post.content.rendered),
    }
}

/// Migrate every post in order. A failed post is logged and counted; the
/// loop always continues with the next one.
#[instrument(skip_all, fields(posts = posts.len()))]
pub async fn migrate_posts(
    store: &dyn ContentStore,
    assets: &AssetImporter<'_>,
    posts: &[SourcePost],
    categories: &CategoryMap,
    unknown_author: &str,
    progress: &dyn ProgressReporter,
) -> Tally {
    let total = posts.len();
    let mut tally = Tally::default();

    info!(count = total, "migrating posts");

    for (i, post) in posts.iter().enumerate() {
        let featured_image = match post.featured_media() {
            Some(media) => match media.source_url.as_deref() {
                Some(url) => assets
                    .import_image(url)
                    .await
                    .map(|image| image.with_alt(media.alt_text.clone())),
                None => None,
            },
            None => None,
        };

        let document = Document::BlogPost(build_post_document(
            post,
            categories,
            featured_image,
            unknown_author,
        ));

        let outcome = store.create(&document).await;
        match &outcome {
            Ok(id) => info!(slug = %post.slug, %id, "created post"),
            Err(e) => warn!(slug = %post.slug, source_id = post.id, error = %e, "failed to create post"),
        }
        tally.record(&outcome);
        progress.item_finished(ItemKind::Post, &post.slug, i + 1, total, outcome.is_ok());
    }

    tally
}
