// Password recovery endpoints

use std::sync::Arc;

use serde_json::json;

use crate::error::Result;
use crate::transport::{RequestOptions, Transport};

/// Password-recovery flow: request a reset email, then redeem the token.
pub struct PasswordsHandler {
    transport: Arc<dyn Transport>,
}

impl PasswordsHandler {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Asks the server to send a password-reset email to `email`.
    /// `reset_url` overrides the link embedded in that email.
    pub async fn request(&self, email: &str, reset_url: Option<&str>) -> Result<()> {
        let mut body = json!({ "email": email });
        if let Some(url) = reset_url {
            body["reset_url"] = json!(url);
        }
        self.transport
            .post("/auth/password/request", Some(body), RequestOptions::new())
            .await?;
        Ok(())
    }

    /// Redeems a reset token for a new password.
    pub async fn reset(&self, token: &str, password: &str) -> Result<()> {
        let body = json!({ "token": token, "password": password });
        self.transport
            .post("/auth/password/reset", Some(body), RequestOptions::new())
            .await?;
        Ok(())
    }
}
