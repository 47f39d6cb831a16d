// Authentication wire types

use serde::{Deserialize, Serialize};

/// How credentials travel between client and server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Refresh and access tokens travel explicitly in request bodies.
    /// The default for non-browser callers.
    #[default]
    Json,

    /// Tokens travel via an implicit credential channel (same-origin
    /// cookies); request bodies never carry them.
    Cookie,
}

/// User credentials for `/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            otp: None,
        }
    }

    /// One-time password for accounts with two-factor auth enabled.
    pub fn otp(mut self, otp: impl Into<String>) -> Self {
        self.otp = Some(otp.into());
        self
    }
}

/// Token pair returned by `/auth/login` and `/auth/refresh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResult {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Access token lifetime in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
}

/// Body of `/auth/login`: the mode discriminant plus the credentials.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest {
    pub mode: AuthMode,
    #[serde(flatten)]
    pub credentials: LoginCredentials,
}

/// Body of `/auth/refresh`. The token field is omitted in cookie mode.
#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Body of `/auth/logout`. The token field is omitted in cookie mode.
#[derive(Debug, Serialize)]
pub(crate) struct LogoutRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_request_shape() {
        let body = LoginRequest {
            mode: AuthMode::Json,
            credentials: LoginCredentials::new("admin@example.com", "password"),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "mode": "json",
                "email": "admin@example.com",
                "password": "password"
            })
        );
    }

    #[test]
    fn test_login_request_includes_otp() {
        let body = LoginRequest {
            mode: AuthMode::Cookie,
            credentials: LoginCredentials::new("admin@example.com", "password").otp("123456"),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["mode"], "cookie");
        assert_eq!(value["otp"], "123456");
    }

    #[test]
    fn test_refresh_request_omits_missing_token() {
        let body = RefreshRequest { refresh_token: None };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({}));

        let body = RefreshRequest {
            refresh_token: Some("R1".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"refresh_token": "R1"})
        );
    }

    #[test]
    fn test_auth_result_tolerates_missing_fields() {
        let result: AuthResult =
            serde_json::from_value(json!({"access_token": "T1"})).unwrap();
        assert_eq!(result.access_token, "T1");
        assert_eq!(result.refresh_token, None);
        assert_eq!(result.expires, None);
    }
}
