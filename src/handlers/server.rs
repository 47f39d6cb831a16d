// Server handler

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::transport::{RequestOptions, Transport};

/// Server introspection endpoints.
pub struct ServerHandler {
    transport: Arc<dyn Transport>,
}

impl ServerHandler {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Health check. Returns the raw body (plain `pong`, no envelope).
    pub async fn ping(&self) -> Result<String> {
        let response = self
            .transport
            .get("/server/ping", RequestOptions::new())
            .await?;
        Ok(match response.raw {
            Value::String(body) => body,
            other => other.to_string(),
        })
    }

    pub async fn info(&self) -> Result<Value> {
        let response = self
            .transport
            .get("/server/info", RequestOptions::new())
            .await?;
        response.decode()
    }

    /// The OpenAPI specification, returned unwrapped.
    pub async fn oas(&self) -> Result<Value> {
        let response = self
            .transport
            .get("/server/specs/oas", RequestOptions::new())
            .await?;
        Ok(response.raw)
    }
}
