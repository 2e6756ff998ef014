use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::cache::ResourceKey;

/// Failure fetching or mutating a remote collection.
///
/// `Unauthorized` is the one fatal kind: it means the session is dead and is
/// escalated to the caller rather than recorded on a cache entry for retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("backend rejected credentials (HTTP {status})")]
    Unauthorized { status: u16 },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("backend returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    pub fn is_auth(&self) -> bool {
        matches!(self, FetchError::Unauthorized { .. })
    }
}

/// The seam between the cache and the network. Implemented by [`ApiClient`]
/// for the real backend and by stub sources in tests.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// GET the full collection behind `key`. A non-array body is treated as
    /// an empty collection, never an error.
    async fn fetch_collection(&self, key: ResourceKey) -> Result<Vec<Value>, FetchError>;

    /// POST a new record into the collection behind `key`.
    async fn create_record(&self, key: ResourceKey, body: Value) -> Result<Value, FetchError>;

    /// PATCH one record by id.
    async fn update_record(
        &self,
        key: ResourceKey,
        id: &str,
        patch: Value,
    ) -> Result<Value, FetchError>;
}

/// HTTP client for the studio backend's collection endpoints.
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn collection_url(&self, key: ResourceKey) -> String {
        format!("{}/{}", self.base_url, key.endpoint())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Map the response status, separating auth failures from everything
    /// else before the body is touched.
    fn check_status(response: &Response, url: &str) -> Result<(), FetchError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(())
    }

    async fn decode_body(response: Response, url: &str) -> Result<Value, FetchError> {
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Value, FetchError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Self::check_status(&response, url)?;
        Self::decode_body(response, url).await
    }
}

#[async_trait]
impl CollectionSource for ApiClient {
    async fn fetch_collection(&self, key: ResourceKey) -> Result<Vec<Value>, FetchError> {
        let url = self.collection_url(key);
        debug!(key = key.as_str(), %url, "GET collection");

        let body = self.send(self.client.get(&url), &url).await?;
        match body {
            Value::Array(records) => Ok(records),
            other => {
                warn!(
                    key = key.as_str(),
                    got = other_shape(&other),
                    "expected an array, treating response as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn create_record(&self, key: ResourceKey, body: Value) -> Result<Value, FetchError> {
        let url = self.collection_url(key);
        debug!(key = key.as_str(), %url, "POST record");
        self.send(self.client.post(&url).json(&body), &url).await
    }

    async fn update_record(
        &self,
        key: ResourceKey,
        id: &str,
        patch: Value,
    ) -> Result<Value, FetchError> {
        let url = format!("{}/{}", self.collection_url(key), id);
        debug!(key = key.as_str(), %url, "PATCH record");
        self.send(self.client.patch(&url).json(&patch), &url).await
    }
}

fn other_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
