//! HTTP client for the Technoid backend.
//!
//! Every call is bounded by a timeout; when it elapses the in-flight request
//! is dropped and the call fails with [`ClientError::RequestAborted`].
//! Failures are logged before they are returned. Nothing is retried.

pub mod error;

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use technoid_types::api::{ContactRequest, ContactResponse, HealthResponse};
use technoid_types::models::Message;

pub use crate::error::ClientError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Per-call settings. Headers given here replace the default
/// `Content-Type: application/json` header of the same name.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post_json<B: Serialize>(body: &B) -> Result<Self, ClientError> {
        Ok(Self {
            method: Method::POST,
            body: Some(serde_json::to_string(body)?),
            ..Self::default()
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a request against `base_url + path` and decode the JSON reply.
    ///
    /// Returns `Ok(None)` for `204 No Content`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<T>, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let timeout = options.timeout;

        // Dropping the future on timeout cancels the underlying connection.
        let result = match tokio::time::timeout(timeout, self.execute(&url, options)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::RequestAborted { timeout }),
        };

        if let Err(err) = &result {
            error!(url = %url, "API error: {}", err);
        }
        result
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<Option<T>, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(options.headers);

        let mut req = self.http.request(options.method, url).headers(headers);
        if !options.query.is_empty() {
            req = req.query(&options.query);
        }
        if let Some(body) = options.body {
            req = req.body(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        debug!(url = %url, status = status.as_u16(), "API response");

        if !status.is_success() {
            let body = resp.bytes().await.unwrap_or_default();
            return Err(ClientError::RequestFailed {
                status: status.as_u16(),
                message: failure_message(status, &body),
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = resp.bytes().await?;
        Ok(Some(serde_json::from_slice(&body)?))
    }

    // -- Typed endpoints --

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let resp = self.request("/api/health", RequestOptions::get()).await?;
        require_body(resp)
    }

    pub async fn submit_contact(&self, contact: &ContactRequest) -> Result<ContactResponse, ClientError> {
        let options = RequestOptions::post_json(contact).inspect_err(|e| error!("API error: {}", e))?;
        let resp = self.request("/api/contact", options).await?;
        require_body(resp)
    }

    pub async fn list_contacts(&self, key: &str) -> Result<Vec<Message>, ClientError> {
        let options = RequestOptions::get().with_query("key", key);
        let resp = self.request("/api/contacts", options).await?;
        require_body(resp)
    }
}

fn require_body<T>(resp: Option<T>) -> Result<T, ClientError> {
    resp.ok_or_else(|| {
        let err = ClientError::NoContent;
        error!("API error: {}", err);
        err
    })
}

/// The server's `error` field when the body carries one, else a message
/// naming the status code.
fn failure_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.as_str().map(str::to_string))
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}
