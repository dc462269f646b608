//! Source content API client.
//!
//! Reads whole collections (posts, pages) from a WordPress REST API, one page
//! at a time. The total page count comes from the `X-WP-TotalPages` response
//! header; posts are requested with `_embed` so author, featured media and
//! terms arrive inline.

mod model;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use wpmigrate_shared::{FetchErrorPolicy, MigrateError, Result, SourceSettings};

pub use model::{
    Embedded, EmbeddedAuthor, EmbeddedMedia, EmbeddedTerm, Rendered, SourcePage, SourcePost,
};

/// User-Agent string for source and asset requests.
const USER_AGENT: &str = concat!("wpmigrate/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Header carrying the collection's total page count.
const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

/// Build an HTTP client with the shared user agent, redirect and timeout settings.
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(timeout)
        .build()
        .map_err(|e| MigrateError::Network(format!("failed to build HTTP client: {e}")))
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// A paginated source collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Posts,
    Pages,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Pages => "pages",
        }
    }

    /// Whether related entities are embedded in the same request.
    fn embeds(&self) -> bool {
        matches!(self, Self::Posts)
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Fetched
// ---------------------------------------------------------------------------

/// Items gathered from a collection plus how the pagination ended.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    /// Items in the order the API returned them.
    pub items: Vec<T>,
    /// Pages loaded successfully.
    pub pages_loaded: u32,
    /// Total page count last reported by the API.
    pub total_pages: u32,
    /// Page whose request failed, when the collection was truncated.
    pub failed_page: Option<u32>,
    /// Items dropped because they did not match the expected shape.
    pub skipped_items: usize,
}

impl<T> Fetched<T> {
    /// Whether pages were skipped after a failed request.
    pub fn is_truncated(&self) -> bool {
        self.failed_page.is_some()
    }
}

// ---------------------------------------------------------------------------
// WordPressSource
// ---------------------------------------------------------------------------

/// Client for the source content API.
pub struct WordPressSource {
    client: Client,
    api_root: String,
    per_page: u32,
    on_error: FetchErrorPolicy,
}

impl WordPressSource {
    /// Create a source client for `settings.base_url`.
    pub fn new(settings: &SourceSettings, on_error: FetchErrorPolicy) -> Result<Self> {
        let api_root = format!(
            "{}/wp-json/wp/v2",
            settings.base_url.as_str().trim_end_matches('/')
        );

        Ok(Self {
            client: http_client(settings.timeout)?,
            api_root,
            per_page: settings.per_page,
            on_error,
        })
    }

    /// Fetch every post, with embeds.
    pub async fn fetch_posts(&self) -> Result<Fetched<SourcePost>> {
        self.fetch_all(Collection::Posts).await
    }

    /// Fetch every page.
    pub async fn fetch_pages(&self) -> Result<Fetched<SourcePage>> {
        self.fetch_all(Collection::Pages).await
    }

    /// Fetch all pages of `collection` sequentially.
    ///
    /// On a failed page the configured [`FetchErrorPolicy`] applies: `Abort`
    /// returns the error, `Truncate` keeps what was already loaded and stops.
    #[instrument(skip_all, fields(collection = %collection))]
    pub async fn fetch_all<T: DeserializeOwned>(&self, collection: Collection) -> Result<Fetched<T>> {
        let mut fetched = Fetched {
            items: Vec::new(),
            pages_loaded: 0,
            total_pages: 1,
            failed_page: None,
            skipped_items: 0,
        };
        let mut page = 1;

        loop {
            match self.fetch_page::<T>(collection, page).await {
                Ok(batch) => {
                    info!(
                        count = batch.items.len(),
                        skipped = batch.skipped,
                        page,
                        total_pages = batch.total_pages,
                        "fetched {collection} page"
                    );
                    fetched.items.extend(batch.items);
                    fetched.skipped_items += batch.skipped;
                    fetched.pages_loaded += 1;
                    fetched.total_pages = batch.total_pages;
                }
                Err(e) => match self.on_error {
                    FetchErrorPolicy::Abort => return Err(e),
                    FetchErrorPolicy::Truncate => {
                        warn!(
                            page,
                            total_pages = fetched.total_pages,
                            kept = fetched.items.len(),
                            error = %e,
                            "fetch failed, remaining {collection} pages skipped"
                        );
                        fetched.failed_page = Some(page);
                        break;
                    }
                },
            }

            if page >= fetched.total_pages {
                break;
            }
            page += 1;
        }

        Ok(fetched)
    }

    /// Fetch one page.
    ///
    /// The body must be a JSON array; each element is decoded on its own so a
    /// malformed item is skipped without losing the rest of the page.
    async fn fetch_page<T: DeserializeOwned>(
        &self,
        collection: Collection,
        page: u32,
    ) -> Result<PageBatch<T>> {
        let url = format!("{}/{}", self.api_root, collection.as_str());
        let mut query = vec![
            ("page", page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if collection.embeds() {
            query.push(("_embed", "true".to_string()));
        }

        debug!(%url, page, "requesting collection page");

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| MigrateError::Network(format!("{url} page {page}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MigrateError::Network(format!(
                "{url} page {page}: HTTP {status}"
            )));
        }

        let total_pages = total_pages(response.headers());

        let body = response
            .text()
            .await
            .map_err(|e| MigrateError::Network(format!("{url} page {page}: body read failed: {e}")))?;

        let raw: Vec<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| MigrateError::parse(format!("{url} page {page}: {e}")))?;

        let mut batch = PageBatch {
            items: Vec::with_capacity(raw.len()),
            skipped: 0,
            total_pages,
        };
        for (index, value) in raw.into_iter().enumerate() {
            let source_id = value.get("id").cloned();
            match serde_json::from_value::<T>(value) {
                Ok(item) => batch.items.push(item),
                Err(e) => {
                    warn!(page, index, id = ?source_id, error = %e, "skipping malformed {collection} item");
                    batch.skipped += 1;
                }
            }
        }

        Ok(batch)
    }
}

/// Decoded items of one listing page.
struct PageBatch<T> {
    items: Vec<T>,
    skipped: usize,
    total_pages: u32,
}

/// Read the total page count header, defaulting to 1.
fn total_pages(headers: &reqwest::header::HeaderMap) -> u32 {
    headers
        .get(TOTAL_PAGES_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(1)
}
