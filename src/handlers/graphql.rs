// GraphQL handler

use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::Result;
use crate::transport::{RequestOptions, ResponseEnvelope, Transport};

/// GraphQL access to items and system collections.
///
/// GraphQL errors arrive in the body's `errors` array, so the transport's
/// normalization surfaces them as protocol failures automatically.
pub struct GraphqlHandler {
    transport: Arc<dyn Transport>,
}

impl GraphqlHandler {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn request(
        &self,
        base: &str,
        query: &str,
        variables: Option<Value>,
    ) -> Result<ResponseEnvelope> {
        let body = json!({
            "query": query,
            "variables": variables.unwrap_or_else(|| json!({})),
        });
        self.transport
            .post(base, Some(body), RequestOptions::new())
            .await
    }

    /// Queries the items graph.
    pub async fn items(&self, query: &str, variables: Option<Value>) -> Result<ResponseEnvelope> {
        self.request("/graphql", query, variables).await
    }

    /// Queries the system graph.
    pub async fn system(&self, query: &str, variables: Option<Value>) -> Result<ResponseEnvelope> {
        self.request("/graphql/system", query, variables).await
    }
}
