// Fields handler

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::transport::{ManyItems, RequestOptions, Transport};

use super::ensure_param;

/// Management of the fields that make up each collection.
pub struct FieldsHandler<T = Value> {
    transport: Arc<dyn Transport>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> FieldsHandler<T> {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            _marker: PhantomData,
        }
    }

    pub async fn read_one(&self, collection: &str, field: &str) -> Result<T> {
        ensure_param(collection, "collection")?;
        ensure_param(field, "field")?;
        let response = self
            .transport
            .get(
                &format!("/fields/{collection}/{field}"),
                RequestOptions::new(),
            )
            .await?;
        response.decode()
    }

    pub async fn read_many(&self, collection: &str) -> Result<ManyItems<T>> {
        ensure_param(collection, "collection")?;
        let response = self
            .transport
            .get(&format!("/fields/{collection}"), RequestOptions::new())
            .await?;
        let data =
            serde_json::from_value(response.data.unwrap_or_else(|| Value::Array(Vec::new())))?;
        Ok(ManyItems { data, meta: None })
    }

    pub async fn read_all(&self) -> Result<ManyItems<T>> {
        let response = self.transport.get("/fields", RequestOptions::new()).await?;
        let data =
            serde_json::from_value(response.data.unwrap_or_else(|| Value::Array(Vec::new())))?;
        Ok(ManyItems { data, meta: None })
    }

    pub async fn create_one<I>(&self, collection: &str, item: &I) -> Result<T>
    where
        I: Serialize + ?Sized,
    {
        ensure_param(collection, "collection")?;
        let body = serde_json::to_value(item)?;
        let response = self
            .transport
            .post(
                &format!("/fields/{collection}"),
                Some(body),
                RequestOptions::new(),
            )
            .await?;
        response.decode()
    }

    pub async fn update_one<I>(&self, collection: &str, field: &str, item: &I) -> Result<T>
    where
        I: Serialize + ?Sized,
    {
        ensure_param(collection, "collection")?;
        ensure_param(field, "field")?;
        let body = serde_json::to_value(item)?;
        let response = self
            .transport
            .patch(
                &format!("/fields/{collection}/{field}"),
                Some(body),
                RequestOptions::new(),
            )
            .await?;
        response.decode()
    }

    pub async fn delete_one(&self, collection: &str, field: &str) -> Result<()> {
        ensure_param(collection, "collection")?;
        ensure_param(field, "field")?;
        self.transport
            .delete(
                &format!("/fields/{collection}/{field}"),
                None,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }
}
