// HTTP transport over reqwest

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{ApiErrorDetail, ApiFailure, Error, Result};

use super::{BeforeRequestHook, RequestConfig, ResponseEnvelope, ResponseMeta, Transport};

/// Transport implementation over a pooled `reqwest` client.
///
/// Single-attempt semantics: no retry, no backoff. The cookie store is
/// enabled so deployments using an implicit credential channel work without
/// the SDK touching token bodies.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
    before_request: Option<BeforeRequestHook>,
}

impl HttpTransport {
    /// Create a transport for `url`.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self::with_client(url, client))
    }

    /// Create a transport with a caller-supplied client (custom TLS, timeouts).
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        let mut base_url: String = url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client,
            before_request: None,
        }
    }

    /// Install the pre-request hook. Identity when absent.
    pub fn with_before_request(mut self, hook: BeforeRequestHook) -> Self {
        self.before_request = Some(hook);
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn prepare(&self, config: RequestConfig) -> Result<RequestConfig> {
        match &self.before_request {
            Some(hook) => hook(config).await,
            None => Ok(config),
        }
    }

    async fn dispatch(&self, config: &RequestConfig) -> Result<reqwest::Response> {
        tracing::debug!(
            method = %config.method,
            path = %config.path,
            "Sending HTTP request"
        );

        let mut request = self
            .client
            .request(config.method.clone(), self.endpoint(&config.path));

        if !config.params.is_empty() {
            request = request.query(&config.params);
        }
        for (name, value) in &config.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &config.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        tracing::debug!(status = %response.status(), path = %config.path, "Received HTTP response");
        Ok(response)
    }

    fn decode_raw(body: &[u8]) -> Value {
        serde_json::from_slice(body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
    }

    fn decode_errors(raw: &Value) -> Vec<ApiErrorDetail> {
        raw.get("errors")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    fn failure(status: StatusCode, headers: HeaderMap, raw: Value) -> Error {
        let errors = Self::decode_errors(&raw);
        tracing::warn!(
            status = status.as_u16(),
            errors = errors.len(),
            "API request failed"
        );
        Error::Api(ApiFailure {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            raw,
            errors,
        })
    }

    /// Builds the normalized envelope, treating body-level `errors` on a
    /// 2xx exactly like a non-2xx status.
    fn normalize(
        status: StatusCode,
        headers: HeaderMap,
        body: &[u8],
    ) -> Result<ResponseEnvelope> {
        let raw = Self::decode_raw(body);

        if !status.is_success() || !Self::decode_errors(&raw).is_empty() {
            return Err(Self::failure(status, headers, raw));
        }

        let data = raw
            .get("data")
            .cloned()
            .filter(|value| !value.is_null());
        let meta = raw
            .get("meta")
            .cloned()
            .and_then(|value| serde_json::from_value::<ResponseMeta>(value).ok());

        Ok(ResponseEnvelope {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            data,
            meta,
            raw,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, config: RequestConfig) -> Result<ResponseEnvelope> {
        let config = self.prepare(config).await?;
        let response = self.dispatch(&config).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Self::normalize(status, headers, &body)
    }

    async fn request_bytes(&self, config: RequestConfig) -> Result<Bytes> {
        let config = self.prepare(config).await?;
        let response = self.dispatch(&config).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(Self::failure(status, headers, Self::decode_raw(&body)));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_joining() {
        let transport = HttpTransport::with_client("http://example.com/", reqwest::Client::new());
        assert_eq!(
            transport.endpoint("/items/articles"),
            "http://example.com/items/articles"
        );
        assert_eq!(transport.endpoint("server/ping"), "http://example.com/server/ping");
    }

    #[test]
    fn test_normalize_success_envelope() {
        let body = json!({
            "data": [{"id": 1}],
            "meta": {"total_count": 5, "filter_count": 2}
        })
        .to_string();

        let envelope =
            HttpTransport::normalize(StatusCode::OK, HeaderMap::new(), body.as_bytes()).unwrap();
        assert_eq!(envelope.status, 200);
        assert_eq!(envelope.data, Some(json!([{"id": 1}])));
        assert_eq!(
            envelope.meta,
            Some(ResponseMeta {
                total_count: Some(5),
                filter_count: Some(2),
            })
        );
    }

    #[test]
    fn test_normalize_errors_on_success_status() {
        let body = json!({"errors": [{"message": "Forbidden"}]}).to_string();
        let err =
            HttpTransport::normalize(StatusCode::OK, HeaderMap::new(), body.as_bytes()).unwrap_err();
        match err {
            Error::Api(failure) => {
                assert_eq!(failure.status, 200);
                assert_eq!(failure.errors[0].message, "Forbidden");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_error_status_matches_body_errors() {
        let body = json!({"errors": [{"message": "Forbidden"}]}).to_string();
        let from_status =
            HttpTransport::normalize(StatusCode::FORBIDDEN, HeaderMap::new(), body.as_bytes())
                .unwrap_err();
        let from_body =
            HttpTransport::normalize(StatusCode::OK, HeaderMap::new(), body.as_bytes()).unwrap_err();
        assert_eq!(from_status.to_string(), from_body.to_string());
        assert_eq!(from_status.api_errors(), from_body.api_errors());
    }

    #[test]
    fn test_normalize_non_json_body() {
        let envelope =
            HttpTransport::normalize(StatusCode::OK, HeaderMap::new(), b"pong").unwrap();
        assert_eq!(envelope.raw, json!("pong"));
        assert_eq!(envelope.data, None);
    }

    #[test]
    fn test_normalize_error_without_error_list() {
        let err = HttpTransport::normalize(
            StatusCode::INTERNAL_SERVER_ERROR,
            HeaderMap::new(),
            b"upstream exploded",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "request failed with status 500 Internal Server Error"
        );
    }
}
