//! Page migration.

use tracing::{info, instrument, warn};

use wpmigrate_shared::{Document, PageDocument, Seo, Slug};
use wpmigrate_source::SourcePage;
use wpmigrate_store::ContentStore;
use wpmigrate_transform::{strip_markup, to_blocks};

use crate::pipeline::{ItemKind, ProgressReporter, Tally};

/// Build the destination document for one source page. Every page gets the
/// same `page_type`.
pub fn build_page_document(page: &SourcePage, page_type: &str) -> PageDocument {
    let title = strip_markup(&page.title.rendered);

    PageDocument {
        seo: Seo {
            meta_title: title.clone(),
            meta_description: None,
        },
        title,
        slug: Slug::new(&page.slug),
        page_type: page_type.to_string(),
        content: to_blocks(&page.content.rendered),
    }
}

#[instrument(skip_all, fields(pages = pages.len()))]
pub async fn migrate_pages(
    store: &dyn ContentStore,
    pages: &[SourcePage],
    page_type: &str,
    progress: &dyn ProgressReporter,
) -> Tally {
    let total = pages.len();
    let mut tally = Tally::default();

    info!(count = total, "migrating pages");

    for (i, page) in pages.iter().enumerate() {
        let document = Document::Page(build_page_document(page, page_type));

        let outcome = store.create(&document).await;
        match &outcome {
            Ok(id) => info!(slug = %page.slug, %id, "created page"),
            Err(e) => warn!(slug = %page.slug, source_id = page.id, error = %e, "failed to create page"),
        }
        tally.record(&outcome);
        progress.item_finished(ItemKind::Page, &page.slug, i + 1, total, outcome.is_ok());
    }

    tally
}
