//! HTTP client for the hosted content store API.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use wpmigrate_shared::{DestinationSettings, Document, DocumentId, MigrateError, Result};

use crate::ContentStore;

/// User-Agent string for store requests.
const USER_AGENT: &str = concat!("wpmigrate/", env!("CARGO_PKG_VERSION"));

/// Longest error body echoed back in a [`MigrateError::Store`].
const MAX_ERROR_BODY: usize = 300;

/// Client for one project/dataset, constructed explicitly and passed to
/// whichever component needs it.
pub struct SanityClient {
    client: Client,
    project_id: String,
    dataset: String,
    /// Base for mutations and uploads (never the CDN).
    write_base: String,
    /// Base for queries (CDN when enabled).
    read_base: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MutateResponse {
    #[serde(default)]
    results: Vec<MutateResult>,
}

#[derive(Debug, Deserialize)]
struct MutateResult {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AssetResponse {
    document: AssetDocument,
}

#[derive(Debug, Deserialize)]
struct AssetDocument {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

impl SanityClient {
    /// Build a client from resolved destination settings.
    pub fn new(settings: &DestinationSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| MigrateError::Network(format!("failed to build HTTP client: {e}")))?;

        let version = settings.api_version.trim_start_matches('v');
        let (write_base, read_base) = match &settings.api_host {
            Some(host) => {
                let base = format!("{}/v{version}", host.trim_end_matches('/'));
                (base.clone(), base)
            }
            None => {
                let api = format!("https://{}.api.sanity.io/v{version}", settings.project_id);
                let read = if settings.use_cdn {
                    format!("https://{}.apicdn.sanity.io/v{version}", settings.project_id)
                } else {
                    api.clone()
                };
                (api, read)
            }
        };

        Ok(Self {
            client,
            project_id: settings.project_id.clone(),
            dataset: settings.dataset.clone(),
            write_base,
            read_base,
            token: settings.token.clone(),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    fn write_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| MigrateError::store("a write token is required for this operation"))
    }

    /// Run a GROQ query. `params` values are passed as JSON strings bound to
    /// `$name` placeholders.
    #[instrument(skip_all, fields(dataset = %self.dataset))]
    pub async fn query<T: DeserializeOwned>(&self, groq: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/data/query/{}", self.read_base, self.dataset);

        let mut pairs: Vec<(String, String)> = vec![("query".into(), groq.to_string())];
        for (name, value) in params {
            let encoded = serde_json::to_string(value)
                .map_err(|e| MigrateError::parse(format!("query param {name}: {e}")))?;
            pairs.push((format!("${name}"), encoded));
        }

        let mut request = self.client.get(&url).query(&pairs);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MigrateError::Network(format!("{url}: {e}")))?;
        let body = success_body(response, "query").await?;

        let parsed: QueryResponse<T> = serde_json::from_str(&body)
            .map_err(|e| MigrateError::parse(format!("query response: {e}")))?;
        Ok(parsed.result)
    }
}

#[async_trait]
impl ContentStore for SanityClient {
    #[instrument(skip_all, fields(doc_type = document.type_name(), slug = document.slug()))]
    async fn create(&self, document: &Document) -> Result<DocumentId> {
        let token = self.write_token()?;
        let url = format!("{}/data/mutate/{}", self.write_base, self.dataset);
        let payload = serde_json::json!({ "mutations": [{ "create": document }] });

        let response = self
            .client
            .post(&url)
            .query(&[("returnIds", "true")])
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MigrateError::Network(format!("{url}: {e}")))?;
        let body = success_body(response, "create").await?;

        let parsed: MutateResponse = serde_json::from_str(&body)
            .map_err(|e| MigrateError::parse(format!("mutate response: {e}")))?;
        let id = parsed
            .results
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| MigrateError::store("mutate response contained no document id"))?;

        debug!(%id, "document created");
        Ok(DocumentId(id))
    }

    #[instrument(skip(self, data), fields(bytes = data.len()))]
    async fn upload_image(&self, data: Vec<u8>, filename: &str) -> Result<DocumentId> {
        let token = self.write_token()?;
        let url = format!("{}/assets/images/{}", self.write_base, self.dataset);

        let response = self
            .client
            .post(&url)
            .query(&[("filename", filename)])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type_for(filename))
            .body(data)
            .send()
            .await
            .map_err(|e| MigrateError::Network(format!("{url}: {e}")))?;
        let body = success_body(response, "upload").await?;

        let parsed: AssetResponse = serde_json::from_str(&body)
            .map_err(|e| MigrateError::parse(format!("asset response: {e}")))?;

        debug!(id = %parsed.document.id, "asset uploaded");
        Ok(DocumentId(parsed.document.id))
    }
}

/// Read the body of a successful response, or turn a failure into a store error.
async fn success_body(response: Response, operation: &str) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| MigrateError::Network(format!("{operation}: body read failed: {e}")))?;

    if !status.is_success() {
        let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
        return Err(MigrateError::store(format!(
            "{operation}: HTTP {status}: {snippet}"
        )));
    }

    Ok(body)
}

/// Guess an image MIME type from the file extension.
fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}
