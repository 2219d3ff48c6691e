//! REST seam: the `ResourceApi` trait and its reqwest implementation.

use crate::error::ClientError;
use crate::query::ListQuery;
use crate::response::error_message;
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{Map, Value};

/// One REST collection per path segment: `GET/POST /{path}`, `GET/PATCH/DELETE /{path}/{id}`.
/// Every call takes the bearer token explicitly.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    async fn list(&self, path: &str, query: &ListQuery, token: Option<&str>) -> Result<Value, ClientError>;

    async fn read(&self, path: &str, id: i64, token: Option<&str>) -> Result<Value, ClientError>;

    async fn create(&self, path: &str, body: &Map<String, Value>, token: Option<&str>) -> Result<Value, ClientError>;

    async fn update(
        &self,
        path: &str,
        id: i64,
        body: &Map<String, Value>,
        token: Option<&str>,
    ) -> Result<Value, ClientError>;

    async fn delete(&self, path: &str, id: i64, token: Option<&str>) -> Result<(), ClientError>;
}

/// HTTP client for the back-office API. Timeouts are the reqwest defaults.
#[derive(Clone)]
pub struct HttpApi {
    base_url: String,
    pub(crate) upload_path: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        HttpApi {
            base_url: base_url.trim_end_matches('/').to_string(),
            upload_path: "upload".to_string(),
            client,
        }
    }

    /// Path of the multipart upload endpoint, "upload" by default.
    pub fn upload_path(mut self, path: &str) -> Self {
        self.upload_path = path.trim_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub(crate) fn authorize(rb: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(t) => rb.bearer_auth(t),
            None => rb,
        }
    }

    /// Send and decode. An empty 2xx body decodes as JSON null.
    pub(crate) async fn send(&self, rb: RequestBuilder) -> Result<Value, ClientError> {
        let resp = rb.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(status_error(status, &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ClientError::Network(format!("invalid JSON response: {}", e)))
    }
}

/// 400 and 422 are validation failures; everything else is a network error.
pub(crate) fn status_error(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(error_message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::validation(message),
        _ => ClientError::Network(format!("{}: {}", status.as_u16(), message)),
    }
}

#[async_trait]
impl ResourceApi for HttpApi {
    async fn list(&self, path: &str, query: &ListQuery, token: Option<&str>) -> Result<Value, ClientError> {
        tracing::debug!(method = "GET", path = %path, query = %query.to_query_string(), "request");
        let rb = self.client.get(self.url(path)).query(&query.params);
        self.send(Self::authorize(rb, token)).await
    }

    async fn read(&self, path: &str, id: i64, token: Option<&str>) -> Result<Value, ClientError> {
        tracing::debug!(method = "GET", path = %path, id, "request");
        let rb = self.client.get(self.url(&format!("{}/{}", path, id)));
        self.send(Self::authorize(rb, token)).await
    }

    async fn create(&self, path: &str, body: &Map<String, Value>, token: Option<&str>) -> Result<Value, ClientError> {
        tracing::debug!(method = "POST", path = %path, body = ?body, "request");
        let rb = self.client.post(self.url(path)).json(body);
        self.send(Self::authorize(rb, token)).await
    }

    async fn update(
        &self,
        path: &str,
        id: i64,
        body: &Map<String, Value>,
        token: Option<&str>,
    ) -> Result<Value, ClientError> {
        tracing::debug!(method = "PATCH", path = %path, id, body = ?body, "request");
        let rb = self.client.patch(self.url(&format!("{}/{}", path, id))).json(body);
        self.send(Self::authorize(rb, token)).await
    }

    async fn delete(&self, path: &str, id: i64, token: Option<&str>) -> Result<(), ClientError> {
        tracing::debug!(method = "DELETE", path = %path, id, "request");
        let rb = self.client.delete(self.url(&format!("{}/{}", path, id)));
        self.send(Self::authorize(rb, token)).await.map(|_| ())
    }
}
