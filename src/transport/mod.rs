// Transport pipeline
// Executes HTTP requests and normalizes success/failure into one envelope shape

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::BoxFuture;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Asynchronous hook run before each dispatch. May rewrite the whole
/// request config; the composition root uses it to trigger token refresh
/// and attach the bearer header.
pub type BeforeRequestHook =
    Arc<dyn Fn(RequestConfig) -> BoxFuture<'static, Result<RequestConfig>> + Send + Sync>;

/// One outgoing request, as seen by the pipeline and its hook.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Suppress credential injection for this request (login, static probe).
    pub no_auth: bool,
}

impl RequestConfig {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            headers: Vec::new(),
            body: None,
            no_auth: false,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.params.extend(options.params);
        self.headers.extend(options.headers);
        self.no_auth = self.no_auth || options.no_auth;
        self
    }

    /// Whether an Authorization header has already been set explicitly.
    pub fn has_authorization(&self) -> bool {
        self.headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("authorization"))
    }
}

/// Per-call options supplied by resource handlers.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub no_auth: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn no_auth(mut self) -> Self {
        self.no_auth = true;
        self
    }
}

/// Result metadata reported alongside `data` (`?meta=` queries).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_count: Option<u64>,
}

/// One completed HTTP call, normalized.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    /// Decoded raw body. A non-JSON body is kept as a JSON string.
    pub raw: Value,
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    /// The `data` payload, when the body carried one.
    pub data: Option<Value>,
    pub meta: Option<ResponseMeta>,
}

impl ResponseEnvelope {
    /// Decodes the `data` payload into `T`. A missing payload decodes from
    /// JSON null, so `Option<T>` targets tolerate data-less responses.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(self.data.unwrap_or(Value::Null)).map_err(Error::from)
    }
}

/// A list result together with its optional counts.
#[derive(Debug, Clone)]
pub struct ManyItems<T> {
    pub data: Vec<T>,
    pub meta: Option<ResponseMeta>,
}

/// The request pipeline contract.
///
/// Implementations execute exactly one HTTP attempt per call and normalize
/// the outcome: a completed call whose body carries an `errors` array fails
/// the same way a non-2xx status does.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The base URL requests are issued against.
    fn url(&self) -> &str;

    /// Executes one request, buffering and decoding the JSON body.
    async fn request(&self, config: RequestConfig) -> Result<ResponseEnvelope>;

    /// Executes one request, returning the raw body bytes (asset downloads).
    async fn request_bytes(&self, config: RequestConfig) -> Result<Bytes>;

    async fn get(&self, path: &str, options: RequestOptions) -> Result<ResponseEnvelope> {
        self.request(RequestConfig::new(Method::GET, path).with_options(options))
            .await
    }

    async fn post(
        &self,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope> {
        let mut config = RequestConfig::new(Method::POST, path).with_options(options);
        config.body = body;
        self.request(config).await
    }

    async fn patch(
        &self,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope> {
        let mut config = RequestConfig::new(Method::PATCH, path).with_options(options);
        config.body = body;
        self.request(config).await
    }

    async fn put(
        &self,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope> {
        let mut config = RequestConfig::new(Method::PUT, path).with_options(options);
        config.body = body;
        self.request(config).await
    }

    async fn delete(
        &self,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope> {
        let mut config = RequestConfig::new(Method::DELETE, path).with_options(options);
        config.body = body;
        self.request(config).await
    }

    async fn head(&self, path: &str, options: RequestOptions) -> Result<ResponseEnvelope> {
        self.request(RequestConfig::new(Method::HEAD, path).with_options(options))
            .await
    }
}
