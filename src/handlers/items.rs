// Generic item operations over a collection endpoint

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::query::Query;
use crate::transport::{ManyItems, RequestOptions, ResponseEnvelope, Transport};

use super::ensure_param;

/// Collections with this prefix are system collections and live at their
/// own top-level endpoints; everything else is under `/items/`.
pub(crate) const SYSTEM_PREFIX: &str = "strata_";

pub(crate) fn endpoint_for(collection: &str) -> String {
    match collection.strip_prefix(SYSTEM_PREFIX) {
        Some(system) => format!("/{system}"),
        None => format!("/items/{collection}"),
    }
}

/// CRUD operations over one collection, decoding results into `T`.
pub struct ItemsHandler<T = Value> {
    collection: String,
    endpoint: String,
    transport: Arc<dyn Transport>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> ItemsHandler<T> {
    pub fn new(collection: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let collection = collection.into();
        let endpoint = endpoint_for(&collection);
        Self {
            collection,
            endpoint,
            transport,
            _marker: PhantomData,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn options(query: Option<&Query>) -> RequestOptions {
        match query {
            Some(query) => RequestOptions::new().params(query.to_params()),
            None => RequestOptions::new(),
        }
    }

    fn decode_many(response: ResponseEnvelope) -> Result<ManyItems<T>> {
        let meta = response.meta.clone();
        let data =
            serde_json::from_value(response.data.unwrap_or_else(|| Value::Array(Vec::new())))?;
        Ok(ManyItems { data, meta })
    }

    pub async fn read_one(&self, id: &str, query: Option<&Query>) -> Result<T> {
        ensure_param(id, "id")?;
        let response = self
            .transport
            .get(&format!("{}/{}", self.endpoint, id), Self::options(query))
            .await?;
        response.decode()
    }

    /// Reads the given ids by filtering on the collection's primary key,
    /// which is discovered through the fields endpoint.
    pub async fn read_many(&self, ids: &[&str], query: Option<&Query>) -> Result<ManyItems<T>> {
        let fields = self
            .transport
            .get(&format!("/fields/{}", self.collection), RequestOptions::new())
            .await?;
        let primary_key = fields
            .data
            .as_ref()
            .and_then(Value::as_array)
            .and_then(|fields| {
                fields
                    .iter()
                    .find(|field| field["schema"]["is_primary_key"] == json!(true))
            })
            .and_then(|field| field["field"].as_str())
            .map(str::to_string)
            .ok_or_else(|| Error::MissingPrimaryKey(self.collection.clone()))?;

        let mut filter = Map::new();
        filter.insert(primary_key.clone(), json!({ "_in": ids }));
        // A caller-supplied filter wins on key conflicts
        if let Some(Value::Object(extra)) = query.and_then(|q| q.filter.as_ref()) {
            for (key, value) in extra {
                filter.insert(key.clone(), value.clone());
            }
        }

        let mut effective = query.cloned().unwrap_or_default();
        effective.filter = Some(Value::Object(filter));
        if effective.sort.is_none() {
            effective.sort = Some(vec![primary_key]);
        }

        let response = self
            .transport
            .get(&self.endpoint, Self::options(Some(&effective)))
            .await?;
        Self::decode_many(response)
    }

    pub async fn read_by_query(&self, query: &Query) -> Result<ManyItems<T>> {
        let response = self
            .transport
            .get(&self.endpoint, Self::options(Some(query)))
            .await?;
        Self::decode_many(response)
    }

    pub async fn create_one<I>(&self, item: &I, query: Option<&Query>) -> Result<T>
    where
        I: Serialize + ?Sized,
    {
        let body = serde_json::to_value(item)?;
        let response = self
            .transport
            .post(&self.endpoint, Some(body), Self::options(query))
            .await?;
        response.decode()
    }

    pub async fn create_many<I>(&self, items: &[I], query: Option<&Query>) -> Result<ManyItems<T>>
    where
        I: Serialize,
    {
        let body = serde_json::to_value(items)?;
        let response = self
            .transport
            .post(&self.endpoint, Some(body), Self::options(query))
            .await?;
        Self::decode_many(response)
    }

    pub async fn update_one<I>(&self, id: &str, item: &I, query: Option<&Query>) -> Result<T>
    where
        I: Serialize + ?Sized,
    {
        ensure_param(id, "id")?;
        let body = serde_json::to_value(item)?;
        let response = self
            .transport
            .patch(
                &format!("{}/{}", self.endpoint, id),
                Some(body),
                Self::options(query),
            )
            .await?;
        response.decode()
    }

    /// Applies the same partial update to every id in `ids`.
    pub async fn update_many<I>(
        &self,
        ids: &[&str],
        data: &I,
        query: Option<&Query>,
    ) -> Result<ManyItems<T>>
    where
        I: Serialize + ?Sized,
    {
        let body = json!({ "keys": ids, "data": serde_json::to_value(data)? });
        let response = self
            .transport
            .patch(&self.endpoint, Some(body), Self::options(query))
            .await?;
        Self::decode_many(response)
    }

    /// Updates a batch of items, each carrying its own primary key.
    pub async fn update_batch<I>(&self, items: &[I], query: Option<&Query>) -> Result<ManyItems<T>>
    where
        I: Serialize,
    {
        let body = serde_json::to_value(items)?;
        let response = self
            .transport
            .patch(&self.endpoint, Some(body), Self::options(query))
            .await?;
        Self::decode_many(response)
    }

    /// Applies `data` to every item matched by `update_query`.
    pub async fn update_by_query<I>(
        &self,
        update_query: Value,
        data: &I,
        query: Option<&Query>,
    ) -> Result<ManyItems<T>>
    where
        I: Serialize + ?Sized,
    {
        let body = json!({ "query": update_query, "data": serde_json::to_value(data)? });
        let response = self
            .transport
            .patch(&self.endpoint, Some(body), Self::options(query))
            .await?;
        Self::decode_many(response)
    }

    pub async fn delete_one(&self, id: &str) -> Result<()> {
        ensure_param(id, "id")?;
        self.transport
            .delete(
                &format!("{}/{}", self.endpoint, id),
                None,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_many(&self, ids: &[&str]) -> Result<()> {
        self.transport
            .delete(&self.endpoint, Some(json!(ids)), RequestOptions::new())
            .await?;
        Ok(())
    }
}
