// Error handling module
// Normalizes network, protocol and validation failures into one type

use std::sync::Arc;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A single error object reported by the API inside the response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,

    /// Machine-readable error metadata (code, field, ...), passed through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

/// Normalized payload of a protocol-level failure.
///
/// Built from whatever the server sent back: a non-2xx status, or a 2xx
/// response whose body carries an `errors` array. Both shapes end up here.
#[derive(Debug, Clone)]
pub struct ApiFailure {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    /// Raw decoded body. A non-JSON body is kept as a JSON string.
    pub raw: Value,
    pub errors: Vec<ApiErrorDetail>,
}

impl ApiFailure {
    /// Human-readable reason: the first API-reported message, or a
    /// status-derived fallback when the error list is empty.
    pub fn message(&self) -> String {
        match self.errors.first() {
            Some(detail) => detail.message.clone(),
            None => format!("request failed with status {} {}", self.status, self.status_text),
        }
    }
}

/// Errors produced by the SDK.
///
/// `Clone` is required: a failed token refresh is delivered to every caller
/// awaiting the shared refresh handle, so the error sources are held in `Arc`.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// An identifier argument was an empty string. Raised before any network call.
    #[error("{0} cannot be an empty string")]
    EmptyParam(&'static str),

    /// The HTTP call completed, but the API reported failure
    /// (non-success status or an `errors` array in the body).
    #[error("{}", .0.message())]
    Api(ApiFailure),

    /// The HTTP call did not complete; no response is available.
    #[error("network failure: {0}")]
    Network(#[source] Arc<reqwest::Error>),

    /// The response `data` payload could not be decoded into the requested type.
    #[error("failed to decode response payload: {0}")]
    Decode(#[source] Arc<serde_json::Error>),

    /// A collection has no primary key field, so a keyed lookup is impossible.
    #[error("collection {0} has no primary key field")]
    MissingPrimaryKey(String),
}

impl Error {
    /// The API-reported error list, if this is a protocol failure.
    pub fn api_errors(&self) -> &[ApiErrorDetail] {
        match self {
            Error::Api(failure) => &failure.errors,
            _ => &[],
        }
    }

    /// The HTTP status of a protocol failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(failure) => Some(failure.status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(Arc::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(Arc::new(err))
    }
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failure(status: u16, errors: Vec<ApiErrorDetail>) -> ApiFailure {
        ApiFailure {
            status,
            status_text: "Forbidden".to_string(),
            headers: HeaderMap::new(),
            raw: json!({}),
            errors,
        }
    }

    #[test]
    fn test_empty_param_message() {
        let err = Error::EmptyParam("collection");
        assert_eq!(err.to_string(), "collection cannot be an empty string");
    }

    #[test]
    fn test_api_error_message_from_first_error() {
        let err = Error::Api(failure(
            403,
            vec![
                ApiErrorDetail {
                    message: "You don't have permission to access this.".to_string(),
                    extensions: None,
                },
                ApiErrorDetail {
                    message: "Second error".to_string(),
                    extensions: None,
                },
            ],
        ));
        assert_eq!(err.to_string(), "You don't have permission to access this.");
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.api_errors().len(), 2);
    }

    #[test]
    fn test_api_error_fallback_message() {
        let err = Error::Api(failure(403, vec![]));
        assert_eq!(err.to_string(), "request failed with status 403 Forbidden");
    }

    #[test]
    fn test_api_errors_empty_for_other_kinds() {
        let err = Error::EmptyParam("id");
        assert!(err.api_errors().is_empty());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_error_is_cloneable() {
        let err = Error::Api(failure(
            401,
            vec![ApiErrorDetail {
                message: "Invalid credentials".to_string(),
                extensions: Some(json!({"code": "INVALID_CREDENTIALS"})),
            }],
        ));
        let cloned = err.clone();
        assert_eq!(cloned.to_string(), err.to_string());
    }
}
