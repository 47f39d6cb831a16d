// Utils handler

use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::Result;
use crate::transport::{RequestOptions, Transport};

use super::ensure_param;

/// Server-side utility endpoints.
pub struct UtilsHandler {
    transport: Arc<dyn Transport>,
}

impl UtilsHandler {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// A server-generated random string, 32 characters unless specified.
    pub async fn random_string(&self, length: Option<u32>) -> Result<String> {
        let response = self
            .transport
            .get(
                "/utils/random/string",
                RequestOptions::new().param("length", length.unwrap_or(32).to_string()),
            )
            .await?;
        response.decode()
    }

    pub async fn hash_generate(&self, string: &str) -> Result<String> {
        let response = self
            .transport
            .post(
                "/utils/hash/generate",
                Some(json!({ "string": string })),
                RequestOptions::new(),
            )
            .await?;
        response.decode()
    }

    pub async fn hash_verify(&self, string: &str, hash: &str) -> Result<bool> {
        let response = self
            .transport
            .post(
                "/utils/hash/verify",
                Some(json!({ "string": string, "hash": hash })),
                RequestOptions::new(),
            )
            .await?;
        response.decode()
    }

    /// Moves an item within a manually sorted collection.
    pub async fn sort(&self, collection: &str, item: &Value, to: &Value) -> Result<()> {
        ensure_param(collection, "collection")?;
        self.transport
            .post(
                &format!("/utils/sort/{collection}"),
                Some(json!({ "item": item, "to": to })),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    /// Reverts an item to a previous revision.
    pub async fn revert(&self, revision: &str) -> Result<()> {
        ensure_param(revision, "revision")?;
        self.transport
            .post(
                &format!("/utils/revert/{revision}"),
                None,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }
}
