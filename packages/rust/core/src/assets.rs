//! Featured image import: download from the source, upload to the store.

use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::Url;

use wpmigrate_shared::{ImageRef, MigrateError, Result};
use wpmigrate_store::ContentStore;

/// Filename used when the URL has no usable last path segment.
const DEFAULT_FILENAME: &str = "image.jpg";

/// Re-hosts source images in the destination asset store.
pub struct AssetImporter<'a> {
    http: Client,
    store: &'a dyn ContentStore,
}

impl<'a> AssetImporter<'a> {
    pub fn new(http: Client, store: &'a dyn ContentStore) -> Self {
        Self { http, store }
    }

    /// Import an image, logging and returning `None` on any failure.
    ///
    /// A missing result means "no image"; it never fails the caller's item.
    pub async fn import_image(&self, url: &str) -> Option<ImageRef> {
        match self.try_import_image(url).await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(%url, error = %e, "image import failed, continuing without image");
                None
            }
        }
    }

    /// Import an image, surfacing download or upload errors.
    #[instrument(skip(self))]
    pub async fn try_import_image(&self, url: &str) -> Result<ImageRef> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| MigrateError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MigrateError::Network(format!("{url}: HTTP {status}")));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| MigrateError::Network(format!("{url}: body read failed: {e}")))?;

        let filename = filename_from_url(url);
        debug!(%filename, bytes = data.len(), "downloaded image");

        let asset_id = self.store.upload_image(data.to_vec(), &filename).await?;
        Ok(ImageRef::new(asset_id))
    }
}

/// Last path segment of `url`, or a generic name when there is none.
pub fn filename_from_url(url: &str) -> String {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
    };

    segment
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}
