// Authentication configuration

use crate::auth::AuthMode;

/// Settings consumed by the token lifecycle manager.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Refresh the access token proactively before it expires.
    pub auto_refresh: bool,

    /// How credentials travel: explicitly in request bodies (`Json`) or via
    /// an implicit channel such as same-origin cookies (`Cookie`).
    pub mode: AuthMode,

    /// Lead time in milliseconds: a refresh is triggered once
    /// `now + lead >= expires_at`.
    pub ms_refresh_before_expires: i64,

    /// A long-lived token that never refreshes. Activates static mode at
    /// construction; the token is committed to storage without expiry.
    pub static_token: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            mode: AuthMode::Json,
            ms_refresh_before_expires: 30_000,
            static_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert!(config.auto_refresh);
        assert_eq!(config.mode, AuthMode::Json);
        assert_eq!(config.ms_refresh_before_expires, 30_000);
        assert!(config.static_token.is_none());
    }
}
