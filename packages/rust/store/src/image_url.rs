//! CDN URLs for uploaded image assets.
//!
//! Asset ids look like `image-<hash>-<width>x<height>-<ext>`; the CDN serves
//! them at `https://cdn.sanity.io/images/<project>/<dataset>/<hash>-<width>x<height>.<ext>`.

use url::Url;

use wpmigrate_shared::{MigrateError, Result};

const CDN_BASE: &str = "https://cdn.sanity.io/images";

/// Optional resize parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageSize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Build the CDN URL for an image asset id.
pub fn image_url(project_id: &str, dataset: &str, asset_id: &str, size: ImageSize) -> Result<Url> {
    let invalid = || MigrateError::validation(format!("not an image asset id: '{asset_id}'"));

    let rest = asset_id.strip_prefix("image-").ok_or_else(invalid)?;
    let mut parts = rest.rsplitn(3, '-');
    let ext = parts.next().filter(|e| !e.is_empty()).ok_or_else(invalid)?;
    let dims = parts.next().ok_or_else(invalid)?;
    let hash = parts.next().filter(|h| !h.is_empty()).ok_or_else(invalid)?;

    let (w, h) = dims.split_once('x').ok_or_else(invalid)?;
    if w.parse::<u32>().is_err() || h.parse::<u32>().is_err() {
        return Err(invalid());
    }

    let mut url = Url::parse(&format!(
        "{CDN_BASE}/{project_id}/{dataset}/{hash}-{dims}.{ext}"
    ))
    .map_err(|e| MigrateError::validation(format!("invalid image URL: {e}")))?;

    if size.width.is_some() || size.height.is_some() {
        let mut pairs = url.query_pairs_mut();
        if let Some(w) = size.width {
            pairs.append_pair("w", &w.to_string());
        }
        if let Some(h) = size.height {
            pairs.append_pair("h", &h.to_string());
        }
    }

    Ok(url)
}
