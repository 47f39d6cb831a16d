// Singleton collection operations

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::query::Query;
use crate::transport::{RequestOptions, Transport};

use super::items::endpoint_for;

/// Read/update over a collection holding exactly one item (e.g. settings).
pub struct SingletonHandler<T = Value> {
    endpoint: String,
    transport: Arc<dyn Transport>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> SingletonHandler<T> {
    pub fn new(collection: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: endpoint_for(&collection.into()),
            transport,
            _marker: PhantomData,
        }
    }

    pub async fn read(&self, query: Option<&Query>) -> Result<T> {
        let options = match query {
            Some(query) => RequestOptions::new().params(query.to_params()),
            None => RequestOptions::new(),
        };
        let response = self.transport.get(&self.endpoint, options).await?;
        response.decode()
    }

    pub async fn update<I>(&self, data: &I) -> Result<T>
    where
        I: Serialize + ?Sized,
    {
        let body = serde_json::to_value(data)?;
        let response = self
            .transport
            .patch(&self.endpoint, Some(body), RequestOptions::new())
            .await?;
        response.decode()
    }
}
