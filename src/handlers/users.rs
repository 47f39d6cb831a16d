// Users handler

use std::ops::Deref;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::query::Query;
use crate::transport::{RequestOptions, Transport};

use super::ItemsHandler;

/// User management: item operations over `strata_users` plus invites and
/// the current-user surface.
pub struct UsersHandler {
    items: ItemsHandler,
    invites: InvitesHandler,
    me: MeHandler,
}

impl UsersHandler {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            items: ItemsHandler::new("strata_users", Arc::clone(&transport)),
            invites: InvitesHandler {
                transport: Arc::clone(&transport),
            },
            me: MeHandler::new(transport),
        }
    }

    pub fn invites(&self) -> &InvitesHandler {
        &self.invites
    }

    pub fn me(&self) -> &MeHandler {
        &self.me
    }
}

impl Deref for UsersHandler {
    type Target = ItemsHandler;

    fn deref(&self) -> &ItemsHandler {
        &self.items
    }
}

/// User invitations.
pub struct InvitesHandler {
    transport: Arc<dyn Transport>,
}

impl InvitesHandler {
    pub async fn send(&self, email: &str, role: &str, invite_url: Option<&str>) -> Result<()> {
        let mut body = json!({ "email": email, "role": role });
        if let Some(url) = invite_url {
            body["invite_url"] = json!(url);
        }
        self.transport
            .post("/users/invite", Some(body), RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn accept(&self, token: &str, password: &str) -> Result<()> {
        let body = json!({ "token": token, "password": password });
        self.transport
            .post("/users/invite/accept", Some(body), RequestOptions::new())
            .await?;
        Ok(())
    }
}

/// The currently authenticated user.
pub struct MeHandler {
    transport: Arc<dyn Transport>,
    tfa: TfaHandler,
}

impl MeHandler {
    fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            tfa: TfaHandler {
                transport: Arc::clone(&transport),
            },
            transport,
        }
    }

    pub fn tfa(&self) -> &TfaHandler {
        &self.tfa
    }

    pub async fn read(&self, query: Option<&Query>) -> Result<Value> {
        let options = match query {
            Some(query) => RequestOptions::new().params(query.to_params()),
            None => RequestOptions::new(),
        };
        let response = self.transport.get("/users/me", options).await?;
        response.decode()
    }

    pub async fn update<I>(&self, data: &I, query: Option<&Query>) -> Result<Value>
    where
        I: Serialize + ?Sized,
    {
        let options = match query {
            Some(query) => RequestOptions::new().params(query.to_params()),
            None => RequestOptions::new(),
        };
        let body = serde_json::to_value(data)?;
        let response = self.transport.patch("/users/me", Some(body), options).await?;
        response.decode()
    }
}

/// Two-factor auth for the current user.
pub struct TfaHandler {
    transport: Arc<dyn Transport>,
}

impl TfaHandler {
    /// Generates a TFA secret; requires the account password.
    pub async fn generate(&self, password: &str) -> Result<Value> {
        let response = self
            .transport
            .post(
                "/users/me/tfa/generate",
                Some(json!({ "password": password })),
                RequestOptions::new(),
            )
            .await?;
        response.decode()
    }

    pub async fn enable(&self, secret: &str, otp: &str) -> Result<()> {
        self.transport
            .post(
                "/users/me/tfa/enable",
                Some(json!({ "secret": secret, "otp": otp })),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    pub async fn disable(&self, otp: &str) -> Result<()> {
        self.transport
            .post(
                "/users/me/tfa/disable",
                Some(json!({ "otp": otp })),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }
}
