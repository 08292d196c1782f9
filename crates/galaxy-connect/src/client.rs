//! GalaxyClient: GalaxyApi implementation over the Galaxy REST API

use async_trait::async_trait;
use galaxy_interface::{document, Document, GalaxyApi, GalaxyError, Result};
use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::ConnectError;

/// Datasets requested per listing page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Per-request timeout unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const API_KEY_HEADER: &str = "x-api-key";

/// Builder for [`GalaxyClient`].
pub struct GalaxyClientBuilder {
    base_url: String,
    api_key: String,
    page_size: usize,
    timeout: Duration,
}

impl GalaxyClientBuilder {
    /// Number of datasets requested per `list_datasets_page` call.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> std::result::Result<GalaxyClient, ConnectError> {
        let base = normalize_base(&self.base_url)?;
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;

        Ok(GalaxyClient {
            http,
            base,
            api_key: self.api_key,
            page_size: self.page_size,
        })
    }
}

/// A Galaxy server reached over HTTP.
///
/// This struct is cheaply cloneable (reqwest's client is reference counted).
#[derive(Clone)]
pub struct GalaxyClient {
    http: reqwest::Client,
    /// Server root; every endpoint lives under `{base}/api/`
    base: Url,
    api_key: String,
    page_size: usize,
}

impl fmt::Debug for GalaxyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GalaxyClient")
            .field("base", &self.base.as_str())
            .field("api_key", &"<redacted>")
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl GalaxyClient {
    pub fn builder(base_url: impl Into<String>, api_key: impl Into<String>) -> GalaxyClientBuilder {
        GalaxyClientBuilder {
            base_url: base_url.into(),
            api_key: api_key.into(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Client with the default page size and timeout.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> std::result::Result<Self, ConnectError> {
        Self::builder(base_url, api_key).build()
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build `{base}/api/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, ConnectError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ConnectError::NotABase(self.base.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    async fn get_json(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> std::result::Result<Value, ConnectError> {
        let url = self.endpoint(segments)?;
        debug!("GET {}", url);

        let response = self
            .http
            .get(url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ConnectError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(ConnectError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Strip trailing slashes and a trailing `/api` so both `https://host/` and
/// `https://host/api` address the same server root.
fn normalize_base(raw: &str) -> std::result::Result<Url, ConnectError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let root = trimmed.strip_suffix("/api").unwrap_or(trimmed);
    let url = Url::parse(root)?;
    if url.cannot_be_a_base() {
        return Err(ConnectError::NotABase(raw.to_string()));
    }
    Ok(url)
}

fn documents(value: Value) -> Result<Vec<Document>> {
    match value {
        Value::Array(items) => items.into_iter().map(document).collect(),
        other => Err(GalaxyError::Decode(format!(
            "expected a JSON array, got {}",
            other
        ))),
    }
}

#[async_trait]
impl GalaxyApi for GalaxyClient {
    async fn list_histories(&self) -> Result<Vec<Document>> {
        documents(self.get_json(&["histories"], &[]).await?)
    }

    async fn show_history(&self, id: &str) -> Result<Document> {
        document(self.get_json(&["histories", id], &[]).await?)
    }

    async fn list_matching_datasets(&self, history_id: &str) -> Result<Vec<Document>> {
        let query = [("types", "dataset".to_string())];
        documents(
            self.get_json(&["histories", history_id, "contents"], &query)
                .await?,
        )
    }

    async fn list_datasets_page(&self, offset: usize) -> Result<Vec<Document>> {
        let query = [
            ("offset", offset.to_string()),
            ("limit", self.page_size.to_string()),
        ];
        documents(self.get_json(&["datasets"], &query).await?)
    }

    async fn show_dataset(&self, id: &str) -> Result<Option<Document>> {
        match self.get_json(&["datasets", id], &[]).await {
            Ok(value) => document(value).map(Some),
            Err(ConnectError::NotFound(url)) => {
                debug!("No dataset at {}", url);
                Ok(None)
            }
            // Galaxy rejects ids it cannot decode with 400 rather than 404
            Err(ConnectError::Status { status: 400, url }) => {
                debug!("Undecodable dataset id at {}", url);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
