// Relations handler

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::transport::{RequestOptions, Transport};

use super::ensure_param;

/// Management of the relations between collections.
pub struct RelationsHandler<T = Value> {
    transport: Arc<dyn Transport>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> RelationsHandler<T> {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            _marker: PhantomData,
        }
    }

    pub async fn read_one(&self, collection: &str, id: &str) -> Result<T> {
        ensure_param(collection, "collection")?;
        ensure_param(id, "id")?;
        let response = self
            .transport
            .get(
                &format!("/relations/{collection}/{id}"),
                RequestOptions::new(),
            )
            .await?;
        response.decode()
    }

    pub async fn read_many(&self, collection: &str) -> Result<Vec<T>> {
        ensure_param(collection, "collection")?;
        let response = self
            .transport
            .get(&format!("/relations/{collection}"), RequestOptions::new())
            .await?;
        response.decode()
    }

    pub async fn read_all(&self) -> Result<Vec<T>> {
        let response = self
            .transport
            .get("/relations", RequestOptions::new())
            .await?;
        response.decode()
    }

    pub async fn create_one<I>(&self, item: &I) -> Result<T>
    where
        I: Serialize + ?Sized,
    {
        let body = serde_json::to_value(item)?;
        let response = self
            .transport
            .post("/relations", Some(body), RequestOptions::new())
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
                &format!("/relations/{collection}/{field}"),
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
                &format!("/relations/{collection}/{field}"),
                None,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }
}
