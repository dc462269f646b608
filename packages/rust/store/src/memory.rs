//! In-process content store.
//!
//! Records every created document and uploaded asset. Used by
//! `migrate --dry-run` and by pipeline tests.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use wpmigrate_shared::{Document, DocumentId, MigrateError, Result};

use crate::ContentStore;

/// A document as the store received it.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub type_name: String,
    /// Serialized document body, including `_type`.
    pub body: serde_json::Value,
}

/// An uploaded asset.
#[derive(Debug, Clone)]
pub struct StoredAsset {
    pub id: DocumentId,
    pub filename: String,
    pub size: usize,
}

#[derive(Debug, Default)]
struct State {
    documents: Vec<StoredDocument>,
    assets: Vec<StoredAsset>,
}

/// Content store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All documents in creation order.
    pub fn documents(&self) -> Vec<StoredDocument> {
        self.lock().documents.clone()
    }

    /// Documents whose `_type` equals `type_name`, in creation order.
    pub fn documents_of_type(&self, type_name: &str) -> Vec<StoredDocument> {
        self.lock()
            .documents
            .iter()
            .filter(|d| d.type_name == type_name)
            .cloned()
            .collect()
    }

    /// All uploaded assets in upload order.
    pub fn assets(&self) -> Vec<StoredAsset> {
        self.lock().assets.clone()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn create(&self, document: &Document) -> Result<DocumentId> {
        let body = serde_json::to_value(document)
            .map_err(|e| MigrateError::store(format!("serialize {}: {e}", document.type_name())))?;

        let id = DocumentId(Uuid::now_v7().to_string());
        self.lock().documents.push(StoredDocument {
            id: id.clone(),
            type_name: document.type_name().to_string(),
            body,
        });
        Ok(id)
    }

    async fn upload_image(&self, data: Vec<u8>, filename: &str) -> Result<DocumentId> {
        let digest = format!("{:x}", Sha256::digest(&data));
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".into());

        // Dimensions are unknown without decoding the image; 0x0 keeps the id
        // in the hosted store's `image-<hash>-<w>x<h>-<ext>` form.
        let id = DocumentId(format!("image-{}-0x0-{ext}", &digest[..40]));
        self.lock().assets.push(StoredAsset {
            id: id.clone(),
            filename: filename.to_string(),
            size: data.len(),
        });
        Ok(id)
    }
}
