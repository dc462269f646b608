//! Test doubles for the content store.

use async_trait::async_trait;

use wpmigrate_shared::{Document, DocumentId, MigrateError, Result};
use wpmigrate_store::{ContentStore, MemoryStore};

/// A [`MemoryStore`] that rejects selected writes.
#[derive(Default)]
pub(crate) struct RejectingStore {
    pub inner: MemoryStore,
    reject_slugs: Vec<String>,
    reject_uploads: bool,
}

impl RejectingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject creation of any document with this slug.
    pub fn reject_slug(mut self, slug: &str) -> Self {
        self.reject_slugs.push(slug.to_string());
        self
    }

    /// Reject every asset upload.
    pub fn reject_uploads(mut self) -> Self {
        self.reject_uploads = true;
        self
    }
}

#[async_trait]
impl ContentStore for RejectingStore {
    async fn create(&self, document: &Document) -> Result<DocumentId> {
        if self.reject_slugs.iter().any(|s| s == document.slug()) {
            return Err(MigrateError::store(format!(
                "create: HTTP 409 Conflict: rejected {}",
                document.slug()
            )));
        }
        self.inner.create(document).await
    }

    async fn upload_image(&self, data: Vec<u8>, filename: &str) -> Result<DocumentId> {
        if self.reject_uploads {
            return Err(MigrateError::store("upload: HTTP 413 Payload Too Large"));
        }
        self.inner.upload_image(data, filename).await
    }
}
