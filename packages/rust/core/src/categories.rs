//! Category mapping: source category id → destination category document.

use std::collections::{HashMap, HashSet};

use tracing::{info, instrument, warn};

use wpmigrate_shared::{CategoryDocument, Document, DocumentId, Slug};
use wpmigrate_source::SourcePost;
use wpmigrate_store::ContentStore;

use crate::pipeline::{ItemKind, ProgressReporter, Tally};

/// A distinct source category discovered in embedded term data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCategory {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

/// Lookup from source category id to the created destination document.
///
/// Categories whose creation failed are absent; posts referencing them lose
/// that link.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    ids: HashMap<u64, DocumentId>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source_id: u64, document_id: DocumentId) {
        self.ids.insert(source_id, document_id);
    }

    pub fn get(&self, source_id: u64) -> Option<&DocumentId> {
        self.ids.get(&source_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Scan every post's embedded terms once and collect distinct categories in
/// order of first appearance. The first occurrence of an id wins.
pub fn collect_categories(posts: &[SourcePost]) -> Vec<SourceCategory> {
    let mut seen = HashSet::new();
    let mut categories = Vec::new();

    for term in posts.iter().flat_map(|p| p.category_terms()) {
        if seen.insert(term.id) {
            categories.push(SourceCategory {
                id: term.id,
                name: term.name.clone(),
                slug: term.slug.clone(),
            });
        }
    }

    categories
}

/// Create one destination category per distinct source category.
///
/// Failures are logged and counted; they never stop the remaining categories.
#[instrument(skip_all, fields(posts = posts.len()))]
pub async fn migrate_categories(
    store: &dyn ContentStore,
    posts: &[SourcePost],
    progress: &dyn ProgressReporter,
) -> (CategoryMap, Tally) {
    let categories = collect_categories(posts);
    let total = categories.len();
    let mut map = CategoryMap::new();
    let mut tally = Tally::default();

    info!(count = total, "migrating categories");

    for (i, category) in categories.iter().enumerate() {
        let document = Document::Category(CategoryDocument {
            title: category.name.clone(),
            slug: Slug::new(&category.slug),
        });

        let outcome = store.create(&document).await;
        match &outcome {
            Ok(id) => {
                info!(name = %category.name, %id, "created category");
                map.insert(category.id, id.clone());
            }
            Err(e) => {
                warn!(name = %category.name, source_id = category.id, error = %e, "failed to create category");
            }
        }
        tally.record(&outcome);
        progress.item_finished(ItemKind::Category, &category.name, i + 1, total, outcome.is_ok());
    }

    (map, tally)
}
