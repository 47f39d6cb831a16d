// Files handler

use std::ops::Deref;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::transport::{RequestOptions, Transport};

use super::ItemsHandler;

/// File library: item operations over `strata_files` plus URL imports.
pub struct FilesHandler {
    items: ItemsHandler,
    transport: Arc<dyn Transport>,
}

impl FilesHandler {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            items: ItemsHandler::new("strata_files", Arc::clone(&transport)),
            transport,
        }
    }

    /// Imports a file from a URL (`{url, data?}` body), returning the
    /// created file item.
    pub async fn import<I>(&self, body: &I) -> Result<Value>
    where
        I: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let response = self
            .transport
            .post("/files/import", Some(body), RequestOptions::new())
            .await?;
        response.decode()
    }
}

impl Deref for FilesHandler {
    type Target = ItemsHandler;

    fn deref(&self) -> &ItemsHandler {
        &self.items
    }
}
