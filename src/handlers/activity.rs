// Activity handler

use std::ops::Deref;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::transport::{RequestOptions, Transport};

use super::{ensure_param, ItemsHandler};

/// The activity log: item operations over `strata_activity` plus comments.
pub struct ActivityHandler {
    items: ItemsHandler,
    comments: CommentsHandler,
}

impl ActivityHandler {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            items: ItemsHandler::new("strata_activity", Arc::clone(&transport)),
            comments: CommentsHandler { transport },
        }
    }

    pub fn comments(&self) -> &CommentsHandler {
        &self.comments
    }
}

impl Deref for ActivityHandler {
    type Target = ItemsHandler;

    fn deref(&self) -> &ItemsHandler {
        &self.items
    }
}

/// Comments attached to activity entries.
pub struct CommentsHandler {
    transport: Arc<dyn Transport>,
}

impl CommentsHandler {
    pub async fn create<I>(&self, comment: &I) -> Result<Value>
    where
        I: Serialize + ?Sized,
    {
        let body = serde_json::to_value(comment)?;
        let response = self
            .transport
            .post("/activity/comment", Some(body), RequestOptions::new())
            .await?;
        response.decode()
    }

    pub async fn update(&self, comment_activity_id: &str, comment: &str) -> Result<Value> {
        ensure_param(comment_activity_id, "comment_activity_id")?;
        let response = self
            .transport
            .patch(
                &format!("/activity/comment/{comment_activity_id}"),
                Some(json!({ "comment": comment })),
                RequestOptions::new(),
            )
            .await?;
        response.decode()
    }

    pub async fn delete(&self, comment_activity_id: &str) -> Result<()> {
        ensure_param(comment_activity_id, "comment_activity_id")?;
        self.transport
            .delete(
                &format!("/activity/comment/{comment_activity_id}"),
                None,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }
}
