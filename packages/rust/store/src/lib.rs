//! Destination content store access.
//!
//! The [`ContentStore`] trait is the write seam used by the migration
//! pipeline. Two implementations exist:
//! - [`SanityClient`]: the hosted content store's HTTP API (mutations,
//!   asset uploads, GROQ queries)
//! - [`MemoryStore`]: an in-process store used for dry runs and tests
//!
//! [`queries`] holds the read-side GROQ queries with typed projections, and
//! [`image_url`] builds CDN URLs for uploaded image assets.

pub mod image_url;
mod memory;
pub mod queries;
mod sanity;

use async_trait::async_trait;

use wpmigrate_shared::{Document, DocumentId, Result};

pub use image_url::{ImageSize, image_url};
pub use memory::{MemoryStore, StoredAsset, StoredDocument};
pub use sanity::SanityClient;

/// Write operations against the destination content store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Create a new document and return its generated identifier.
    ///
    /// Always creates; documents with the same slug are never merged.
    async fn create(&self, document: &Document) -> Result<DocumentId>;

    /// Upload an image binary under `filename` and return the asset identifier.
    async fn upload_image(&self, data: Vec<u8>, filename: &str) -> Result<DocumentId>;
}
