//! End-to-end migration: fetch → categories → posts → pages.

use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{info, instrument, warn};

use wpmigrate_shared::{MigrationSettings, Result};
use wpmigrate_source::WordPressSource;
use wpmigrate_store::ContentStore;

use crate::assets::AssetImporter;
use crate::categories::migrate_categories;
use crate::pages::migrate_pages;
use crate::posts::migrate_posts;

/// Success/failure counts for one kind of item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub succeeded: usize,
    pub failed: usize,
}

impl Tally {
    pub fn record<T>(&mut self, outcome: &Result<T>) {
        if outcome.is_ok() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} created, {} failed", self.succeeded, self.failed)
    }
}

/// Kind of item a progress event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Category,
    Post,
    Page,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Category => "category",
            Self::Post => "post",
            Self::Page => "page",
        })
    }
}

/// Per-run document options.
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    /// `pageType` written on every page.
    pub page_type: String,
    /// Author name used when a post has no embedded author.
    pub unknown_author: String,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            page_type: "company".into(),
            unknown_author: "Unknown".into(),
        }
    }
}

impl From<&MigrationSettings> for MigrationOptions {
    fn from(settings: &MigrationSettings) -> Self {
        Self {
            page_type: settings.page_type.clone(),
            unknown_author: settings.unknown_author.clone(),
        }
    }
}

/// Outcome of a migration run.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub posts_fetched: usize,
    pub pages_fetched: usize,
    /// Listing page at which post fetching stopped early, if it did.
    pub posts_failed_page: Option<u32>,
    /// Listing page at which page fetching stopped early, if it did.
    pub pages_failed_page: Option<u32>,
    /// Source posts dropped because they could not be decoded.
    pub posts_skipped: usize,
    /// Source pages dropped because they could not be decoded.
    pub pages_skipped: usize,
    pub categories: Tally,
    pub posts: Tally,
    pub pages: Tally,
    pub elapsed: Duration,
}

impl MigrationReport {
    /// Total number of item writes that failed.
    pub fn failures(&self) -> usize {
        self.categories.failed + self.posts.failed + self.pages.failed
    }

    /// Whether either source listing stopped before its last page.
    pub fn is_truncated(&self) -> bool {
        self.posts_failed_page.is_some() || self.pages_failed_page.is_some()
    }
}

/// Progress callback for reporting migration status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each item write, successful or not.
    fn item_finished(&self, kind: ItemKind, label: &str, current: usize, total: usize, ok: bool);
    /// Called when the run completes.
    fn done(&self, report: &MigrationReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn item_finished(&self, _kind: ItemKind, _label: &str, _current: usize, _total: usize, _ok: bool) {}
    fn done(&self, _report: &MigrationReport) {}
}

/// Run the full migration.
///
/// 1. Fetch all posts, then all pages
/// 2. Create one category per distinct source category
/// 3. Create posts, importing featured images along the way
/// 4. Create pages
///
/// Item failures are logged and tallied and never stop the run. Only a fetch
/// error under the abort policy returns `Err`. Every run creates new
/// documents; nothing is deduplicated against earlier runs.
#[instrument(skip_all)]
pub async fn run_migration(
    source: &WordPressSource,
    store: &dyn ContentStore,
    http: Client,
    options: &MigrationOptions,
    progress: &dyn ProgressReporter,
) -> Result<MigrationReport> {
    let start = Instant::now();
    info!("starting migration");

    progress.phase("Fetching posts");
    let posts = source.fetch_posts().await?;

    progress.phase("Fetching pages");
    let pages = source.fetch_pages().await?;

    info!(posts = posts.items.len(), pages = pages.items.len(), "fetched source content");

    progress.phase("Migrating categories");
    let (category_map, categories) = migrate_categories(store, &posts.items, progress).await;

    progress.phase("Migrating posts");
    let assets = AssetImporter::new(http, store);
    let post_tally = migrate_posts(
        store,
        &assets,
        &posts.items,
        &category_map,
        &options.unknown_author,
        progress,
    )
    .await;

    progress.phase("Migrating pages");
    let page_tally = migrate_pages(store, &pages.items, &options.page_type, progress).await;

    let report = MigrationReport {
        posts_fetched: posts.items.len(),
        pages_fetched: pages.items.len(),
        posts_failed_page: posts.failed_page,
        pages_failed_page: pages.failed_page,
        posts_skipped: posts.skipped_items,
        pages_skipped: pages.skipped_items,
        categories,
        posts: post_tally,
        pages: page_tally,
        elapsed: start.elapsed(),
    };

    if report.is_truncated() {
        warn!(
            posts_failed_page = ?report.posts_failed_page,
            pages_failed_page = ?report.pages_failed_page,
            "migration ran on a truncated source listing"
        );
    }

    info!(
        categories = %report.categories,
        posts = %report.posts,
        pages = %report.pages,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "migration complete"
    );

    progress.done(&report);
    Ok(report)
}
