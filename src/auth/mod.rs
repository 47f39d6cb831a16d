// Authentication module
// Token lifecycle, single-flight refresh coordination, password recovery

mod manager;
mod passwords;
mod types;

pub use manager::AuthManager;
pub use passwords::PasswordsHandler;
pub use types::{AuthMode, AuthResult, LoginCredentials};

use async_trait::async_trait;

use crate::error::Result;

/// The token lifecycle contract.
///
/// Implementations own the stored credential and coordinate refreshes so
/// that at most one refresh network call is in flight per instance.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchanges credentials for a token pair and commits it to storage.
    /// Stored credentials are cleared first; a rejected login leaves the
    /// store cleared.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthResult>;

    /// Mints a new access token from the stored refresh token. Concurrent
    /// callers share one in-flight attempt and settle together.
    async fn refresh(&self) -> Result<AuthResult>;

    /// Refreshes only when the stored token is within its expiry lead
    /// window; joins an already-pending refresh instead of starting another.
    async fn refresh_if_expired(&self) -> Result<()>;

    /// The current access token. Waits for any pending refresh first, so
    /// callers never observe a token mid-rotation.
    async fn token(&self) -> Result<Option<String>>;

    /// Verifies `token` against the API and commits it as a non-expiring
    /// credential, permanently disabling automatic refresh.
    async fn use_static_token(&self, token: &str) -> Result<()>;

    /// Invalidates the session server-side, then clears stored credentials.
    async fn logout(&self) -> Result<()>;
}
