// Collections handler

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::query::Query;
use crate::transport::{ManyItems, RequestOptions, ResponseEnvelope, Transport};

use super::ensure_param;

/// Management of the collections themselves (the data model).
pub struct CollectionsHandler<T = Value> {
    transport: Arc<dyn Transport>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> CollectionsHandler<T> {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            _marker: PhantomData,
        }
    }

    fn decode_many(response: ResponseEnvelope) -> Result<ManyItems<T>> {
        let meta = response.meta.clone();
        let data =
            serde_json::from_value(response.data.unwrap_or_else(|| Value::Array(Vec::new())))?;
        Ok(ManyItems { data, meta })
    }

    pub async fn read_one(&self, collection: &str) -> Result<T> {
        ensure_param(collection, "collection")?;
        let response = self
            .transport
            .get(&format!("/collections/{collection}"), RequestOptions::new())
            .await?;
        response.decode()
    }

    pub async fn read_all(&self) -> Result<ManyItems<T>> {
        let response = self
            .transport
            .get("/collections", RequestOptions::new())
            .await?;
        Self::decode_many(response)
    }

    pub async fn create_one<I>(&self, collection: &I) -> Result<T>
    where
        I: Serialize + ?Sized,
    {
        let body = serde_json::to_value(collection)?;
        let response = self
            .transport
            .post("/collections", Some(body), RequestOptions::new())
            .await?;
        response.decode()
    }

    pub async fn create_many<I>(&self, collections: &[I]) -> Result<ManyItems<T>>
    where
        I: Serialize,
    {
        let body = serde_json::to_value(collections)?;
        let response = self
            .transport
            .post("/collections", Some(body), RequestOptions::new())
            .await?;
        Self::decode_many(response)
    }

    pub async fn update_one<I>(
        &self,
        collection: &str,
        item: &I,
        query: Option<&Query>,
    ) -> Result<T>
    where
        I: Serialize + ?Sized,
    {
        ensure_param(collection, "collection")?;
        let options = match query {
            Some(query) => RequestOptions::new().params(query.to_params()),
            None => RequestOptions::new(),
        };
        let body = serde_json::to_value(item)?;
        let response = self
            .transport
            .patch(&format!("/collections/{collection}"), Some(body), options)
            .await?;
        response.decode()
    }

    pub async fn delete_one(&self, collection: &str) -> Result<()> {
        ensure_param(collection, "collection")?;
        self.transport
            .delete(
                &format!("/collections/{collection}"),
                None,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }
}
