// Token lifecycle manager
// Owns the stored credential and guarantees at most one in-flight refresh

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};

use crate::config::AuthConfig;
use crate::error::Result;
use crate::storage::CredentialStorage;
use crate::transport::{RequestOptions, Transport};

use super::types::{AuthMode, AuthResult, LoginRequest, LogoutRequest, RefreshRequest};
use super::{Authenticator, LoginCredentials, PasswordsHandler};

/// Handle to the single in-flight refresh. Every concurrent caller clones
/// and awaits the same future, so one network call settles them all.
type SharedRefresh = Shared<BoxFuture<'static, Result<AuthResult>>>;

/// Token lifecycle manager.
///
/// The stored credential is mutated only inside the single in-flight
/// login/refresh/logout call; the pending-handle slot is the sole
/// concurrency-control mechanism and its lock is never held across an await.
pub struct AuthManager {
    transport: Arc<dyn Transport>,
    storage: Arc<dyn CredentialStorage>,
    mode: AuthMode,
    auto_refresh: bool,
    ms_refresh_before_expires: i64,
    /// Once set, the refresh path is disabled for the instance lifetime.
    static_mode: AtomicBool,
    pending: Arc<Mutex<Option<SharedRefresh>>>,
}

impl AuthManager {
    pub fn new(
        transport: Arc<dyn Transport>,
        storage: Arc<dyn CredentialStorage>,
        config: AuthConfig,
    ) -> Self {
        let static_mode = config.static_token.is_some();
        if let Some(token) = &config.static_token {
            commit_static(storage.as_ref(), token);
        }

        Self {
            transport,
            storage,
            mode: config.mode,
            auto_refresh: config.auto_refresh,
            ms_refresh_before_expires: config.ms_refresh_before_expires,
            static_mode: AtomicBool::new(static_mode),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// The credential-transport mode this manager was built with.
    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Password-recovery endpoints.
    pub fn password(&self) -> PasswordsHandler {
        PasswordsHandler::new(Arc::clone(&self.transport))
    }

    fn now_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// Clones the pending refresh handle, if a refresh is in flight.
    fn pending_refresh(&self) -> Option<SharedRefresh> {
        self.pending.lock().unwrap().clone()
    }

    /// Returns the in-flight refresh handle, starting a new attempt only
    /// when none is pending.
    fn refresh_handle(&self) -> SharedRefresh {
        let mut pending = self.pending.lock().unwrap();
        if let Some(handle) = pending.as_ref() {
            return handle.clone();
        }

        let transport = Arc::clone(&self.transport);
        let storage = Arc::clone(&self.storage);
        let mode = self.mode;
        let slot = Arc::clone(&self.pending);

        let handle = async move {
            let result = run_refresh(transport, storage, mode).await;
            // Settled: free the slot so the next refresh starts a fresh attempt
            *slot.lock().unwrap() = None;
            result
        }
        .boxed()
        .shared();

        *pending = Some(handle.clone());
        handle
    }
}

/// The refresh procedure. Captures the refresh token, clears the store,
/// calls the refresh endpoint, commits on success. On failure the store
/// stays cleared.
async fn run_refresh(
    transport: Arc<dyn Transport>,
    storage: Arc<dyn CredentialStorage>,
    mode: AuthMode,
) -> Result<AuthResult> {
    tracing::debug!("Refreshing access token");

    let refresh_token = storage.auth_refresh_token();
    reset_credentials(storage.as_ref());

    let body = RefreshRequest {
        refresh_token: match mode {
            AuthMode::Json => refresh_token,
            AuthMode::Cookie => None,
        },
    };

    let response = match transport
        .post(
            "/auth/refresh",
            Some(serde_json::to_value(&body)?),
            RequestOptions::new(),
        )
        .await
    {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, "Token refresh failed");
            return Err(err);
        }
    };

    let result: AuthResult = response.decode()?;
    commit_credentials(storage.as_ref(), &result);
    tracing::info!("Access token refreshed");
    Ok(result)
}

/// Clears all four credential fields. Runs before every credential write
/// so a failed attempt never leaves stale expiry data behind.
fn reset_credentials(storage: &dyn CredentialStorage) {
    storage.set_auth_token(None);
    storage.set_auth_refresh_token(None);
    storage.set_auth_expires(None);
    storage.set_auth_expires_at(None);
}

/// Commits a login/refresh result: `expires_at = now + expires` (zero when
/// the server declared no lifetime).
fn commit_credentials(storage: &dyn CredentialStorage, result: &AuthResult) {
    storage.set_auth_token(Some(&result.access_token));
    storage.set_auth_refresh_token(result.refresh_token.as_deref());
    storage.set_auth_expires(result.expires);
    storage.set_auth_expires_at(Some(
        AuthManager::now_ms() + result.expires.unwrap_or(0),
    ));
}

/// Commits a static token: no refresh token, no expiry fields. The guard
/// treats a token without recorded expiry as never expiring.
fn commit_static(storage: &dyn CredentialStorage, token: &str) {
    storage.set_auth_token(Some(token));
    storage.set_auth_refresh_token(None);
    storage.set_auth_expires(None);
    storage.set_auth_expires_at(None);
}

#[async_trait]
impl Authenticator for AuthManager {
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthResult> {
        reset_credentials(self.storage.as_ref());

        let body = LoginRequest {
            mode: self.mode,
            credentials,
        };
        let response = self
            .transport
            .post(
                "/auth/login",
                Some(serde_json::to_value(&body)?),
                RequestOptions::new().no_auth(),
            )
            .await?;

        let result: AuthResult = response.decode()?;
        commit_credentials(self.storage.as_ref(), &result);
        tracing::info!("Logged in");
        Ok(result)
    }

    async fn refresh(&self) -> Result<AuthResult> {
        self.refresh_handle().await
    }

    async fn refresh_if_expired(&self) -> Result<()> {
        if self.static_mode.load(Ordering::Relaxed) || !self.auto_refresh {
            return Ok(());
        }

        let Some(expires_at) = self.storage.auth_expires_at() else {
            // No expiry recorded: a refresh already cleared the store.
            // Join it rather than racing it with a second attempt.
            if let Some(handle) = self.pending_refresh() {
                handle.await?;
            }
            return Ok(());
        };

        if expires_at < Self::now_ms() + self.ms_refresh_before_expires {
            self.refresh().await?;
        }
        Ok(())
    }

    async fn token(&self) -> Result<Option<String>> {
        // Readers never observe a token mid-rotation
        if let Some(handle) = self.pending_refresh() {
            handle.await?;
        }
        Ok(self.storage.auth_token())
    }

    async fn use_static_token(&self, token: &str) -> Result<()> {
        // Disable the refresh path before the probe so the guard cannot fire
        self.static_mode.store(true, Ordering::Relaxed);

        self.transport
            .get(
                "/users/me",
                RequestOptions::new()
                    .param("access_token", token)
                    .no_auth(),
            )
            .await?;

        commit_static(self.storage.as_ref(), token);
        tracing::info!("Static token activated");
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        let body = LogoutRequest {
            refresh_token: match self.mode {
                AuthMode::Json => self.storage.auth_refresh_token(),
                AuthMode::Cookie => None,
            },
        };

        self.transport
            .post(
                "/auth/logout",
                Some(serde_json::to_value(&body)?),
                RequestOptions::new(),
            )
            .await?;

        // Local state clears only once the server acknowledged the logout
        reset_credentials(self.storage.as_ref());
        tracing::info!("Logged out");
        Ok(())
    }
}
