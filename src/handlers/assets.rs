// Assets handler

use std::sync::Arc;

use bytes::Bytes;
use reqwest::Method;

use crate::error::Result;
use crate::transport::{RequestConfig, Transport};

use super::ensure_param;

/// Raw file contents, bypassing the JSON envelope.
pub struct AssetsHandler {
    transport: Arc<dyn Transport>,
}

impl AssetsHandler {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Downloads the asset body for a file id.
    pub async fn read_one(&self, id: &str) -> Result<Bytes> {
        ensure_param(id, "id")?;
        self.transport
            .request_bytes(RequestConfig::new(Method::GET, format!("/assets/{id}")))
            .await
    }
}
