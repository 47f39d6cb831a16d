// Integration tests for the authentication lifecycle
//
// These run against a mock HTTP server and verify the token state machine:
// login, proactive single-flight refresh, static tokens, logout, and the
// normalization of API failures.

use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tokio_test::assert_ok;

use strata_sdk::{
    AuthMode, CredentialStorage, Error, LoginCredentials, MemoryStorage, StrataClient,
};

// ==================================================================================================
// Test Helpers
// ==================================================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Client in json mode over the mock server, sharing `storage`.
fn client_for(server: &ServerGuard, storage: Arc<MemoryStorage>) -> StrataClient {
    StrataClient::builder(server.url())
        .mode(AuthMode::Json)
        .storage(storage)
        .build()
        .unwrap()
}

fn login_body(access_token: &str, refresh_token: &str, expires: i64) -> String {
    json!({
        "data": {
            "access_token": access_token,
            "refresh_token": refresh_token,
            "expires": expires,
        }
    })
    .to_string()
}

async fn login(client: &StrataClient) {
    client
        .auth()
        .login(LoginCredentials::new("admin@example.com", "password"))
        .await
        .unwrap();
}

// ==================================================================================================
// Login
// ==================================================================================================

#[tokio::test]
async fn test_login_commits_credentials() {
    init_tracing();
    let mut server = Server::new_async().await;
    let storage = Arc::new(MemoryStorage::new());

    let mock = server
        .mock("POST", "/auth/login")
        .match_body(Matcher::PartialJson(json!({
            "mode": "json",
            "email": "admin@example.com",
            "password": "password",
        })))
        .with_body(login_body("T1", "R1", 5000))
        .create_async()
        .await;

    let client = client_for(&server, storage.clone());
    let before = chrono::Utc::now().timestamp_millis();
    let result = client
        .auth()
        .login(LoginCredentials::new("admin@example.com", "password"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.access_token, "T1");
    assert_eq!(result.refresh_token.as_deref(), Some("R1"));
    assert_eq!(storage.auth_token(), Some("T1".to_string()));
    assert_eq!(storage.auth_refresh_token(), Some("R1".to_string()));
    assert_eq!(storage.auth_expires(), Some(5000));

    let expires_at = storage.auth_expires_at().unwrap();
    assert!(expires_at >= before + 5000);
    assert!(expires_at <= chrono::Utc::now().timestamp_millis() + 5000);
}

#[tokio::test]
async fn test_rejected_login_leaves_store_cleared() {
    let mut server = Server::new_async().await;
    let storage = Arc::new(MemoryStorage::new());

    let _mock = server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_body(json!({"errors": [{"message": "Invalid user credentials."}]}).to_string())
        .create_async()
        .await;

    let client = client_for(&server, storage.clone());
    // Pre-existing credentials must not survive a failed login
    storage.set_auth_token(Some("stale"));
    storage.set_auth_expires_at(Some(1));

    let err = client
        .auth()
        .login(LoginCredentials::new("admin@example.com", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Invalid user credentials.");
    assert_eq!(storage.auth_token(), None);
    assert_eq!(storage.auth_refresh_token(), None);
    assert_eq!(storage.auth_expires(), None);
    assert_eq!(storage.auth_expires_at(), None);
}

// ==================================================================================================
// Bearer injection
// ==================================================================================================

#[tokio::test]
async fn test_bearer_round_trip_after_login() {
    let mut server = Server::new_async().await;
    let storage = Arc::new(MemoryStorage::new());

    let _login = server
        .mock("POST", "/auth/login")
        // A long lifetime keeps the refresh guard quiet
        .with_body(login_body("abc", "R1", 3_600_000))
        .create_async()
        .await;
    let me = server
        .mock("GET", "/users/me")
        .match_header("authorization", "Bearer abc")
        .with_body(json!({"data": {"id": "u1"}}).to_string())
        .create_async()
        .await;

    let client = client_for(&server, storage);
    login(&client).await;
    client.users().me().read(None).await.unwrap();
    me.assert_async().await;

    assert_eq!(
        client.auth().token().await.unwrap(),
        Some("abc".to_string())
    );
}

#[tokio::test]
async fn test_pre_prefixed_token_is_not_double_prefixed() {
    let mut server = Server::new_async().await;
    let storage = Arc::new(MemoryStorage::new());
    storage.set_auth_token(Some("Bearer xyz"));
    storage.set_auth_expires_at(Some(chrono::Utc::now().timestamp_millis() + 3_600_000));

    let info = server
        .mock("GET", "/server/info")
        .match_header("authorization", "Bearer xyz")
        .with_body(json!({"data": {"project": {}}}).to_string())
        .create_async()
        .await;

    let client = client_for(&server, storage);
    client.server().info().await.unwrap();
    info.assert_async().await;
}

// ==================================================================================================
// Refresh
// ==================================================================================================

#[tokio::test]
async fn test_concurrent_requests_share_one_refresh() {
    init_tracing();
    let mut server = Server::new_async().await;
    let storage = Arc::new(MemoryStorage::new());

    let _login = server
        .mock("POST", "/auth/login")
        // Expires inside the 30s lead window, so the next request refreshes
        .with_body(login_body("T1", "R1", 5000))
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .match_body(Matcher::PartialJson(json!({"refresh_token": "R1"})))
        .with_body(login_body("T2", "R2", 5000))
        .expect(1)
        .create_async()
        .await;
    let me = server
        .mock("GET", "/users/me")
        .match_header("authorization", "Bearer T2")
        .with_body(json!({"data": {"id": "u1"}}).to_string())
        .expect(3)
        .create_async()
        .await;

    let client = client_for(&server, storage.clone());
    login(&client).await;

    let (a, b, c) = tokio::join!(
        client.users().me().read(None),
        client.users().me().read(None),
        client.users().me().read(None),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    refresh.assert_async().await;
    me.assert_async().await;
    assert_eq!(storage.auth_token(), Some("T2".to_string()));
    assert_eq!(storage.auth_refresh_token(), Some("R2".to_string()));
}

#[tokio::test]
async fn test_no_premature_refresh() {
    let mut server = Server::new_async().await;
    let storage = Arc::new(MemoryStorage::new());

    let _login = server
        .mock("POST", "/auth/login")
        .with_body(login_body("T1", "R1", 60_000))
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .expect(0)
        .create_async()
        .await;
    let me = server
        .mock("GET", "/users/me")
        .match_header("authorization", "Bearer T1")
        .with_body(json!({"data": {"id": "u1"}}).to_string())
        .create_async()
        .await;

    let client = StrataClient::builder(server.url())
        .mode(AuthMode::Json)
        .storage(storage)
        // Zero lead: only an actually-expired token would refresh
        .ms_refresh_before_expires(0)
        .build()
        .unwrap();
    login(&client).await;
    client.users().me().read(None).await.unwrap();

    refresh.assert_async().await;
    me.assert_async().await;
}

#[tokio::test]
async fn test_failed_refresh_clears_store_and_fails_all_waiters() {
    let mut server = Server::new_async().await;
    let storage = Arc::new(MemoryStorage::new());

    let _login = server
        .mock("POST", "/auth/login")
        .with_body(login_body("T1", "R1", 5000))
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .with_status(401)
        .with_body(json!({"errors": [{"message": "Invalid token"}]}).to_string())
        .expect(1)
        .create_async()
        .await;
    let me = server
        .mock("GET", "/users/me")
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server, storage.clone());
    login(&client).await;

    let (a, b, c) = tokio::join!(
        client.users().me().read(None),
        client.users().me().read(None),
        client.users().me().read(None),
    );
    for result in [a, b, c] {
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Invalid token");
        assert!(matches!(err, Error::Api(_)));
    }

    refresh.assert_async().await;
    me.assert_async().await;
    // Reset-before-write: a failed refresh leaves no partial record behind
    assert_eq!(storage.auth_token(), None);
    assert_eq!(storage.auth_refresh_token(), None);
    assert_eq!(storage.auth_expires(), None);
    assert_eq!(storage.auth_expires_at(), None);
}

#[tokio::test]
async fn test_refresh_settles_then_next_refresh_is_fresh() {
    let mut server = Server::new_async().await;
    let storage = Arc::new(MemoryStorage::new());

    let _login = server
        .mock("POST", "/auth/login")
        .with_body(login_body("T1", "R1", 5000))
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .with_body(login_body("T2", "R2", 5000))
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server, storage);
    login(&client).await;

    // Two sequential explicit refreshes issue two network calls
    assert_ok!(client.auth().refresh().await);
    assert_ok!(client.auth().refresh().await);
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_cookie_mode_refresh_omits_token_from_body() {
    let mut server = Server::new_async().await;

    let _login = server
        .mock("POST", "/auth/login")
        .match_body(Matcher::PartialJson(json!({"mode": "cookie"})))
        .with_body(login_body("T1", "R1", 5000))
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .match_body(Matcher::Json(json!({})))
        .with_body(login_body("T2", "R2", 5000))
        .create_async()
        .await;

    let client = StrataClient::builder(server.url())
        .mode(AuthMode::Cookie)
        .build()
        .unwrap();
    login(&client).await;
    client.auth().refresh().await.unwrap();
    refresh.assert_async().await;
}

// ==================================================================================================
// Static tokens
// ==================================================================================================

#[tokio::test]
async fn test_static_token_probe_and_commit() {
    let mut server = Server::new_async().await;
    let storage = Arc::new(MemoryStorage::new());

    let probe = server
        .mock("GET", "/users/me")
        .match_query(Matcher::UrlEncoded(
            "access_token".into(),
            "stat-tok".into(),
        ))
        .with_body(json!({"data": {"id": "u1"}}).to_string())
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .expect(0)
        .create_async()
        .await;
    let articles = server
        .mock("GET", "/items/articles")
        .match_header("authorization", "Bearer stat-tok")
        .with_body(json!({"data": []}).to_string())
        .create_async()
        .await;

    let client = client_for(&server, storage.clone());
    client.auth().use_static_token("stat-tok").await.unwrap();
    probe.assert_async().await;

    // Committed without expiry: the refresh path stays quiet forever
    assert_eq!(storage.auth_token(), Some("stat-tok".to_string()));
    assert_eq!(storage.auth_expires_at(), None);

    client
        .items("articles")
        .read_by_query(&strata_sdk::Query::new())
        .await
        .unwrap();
    articles.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_rejected_static_token_commits_nothing() {
    let mut server = Server::new_async().await;
    let storage = Arc::new(MemoryStorage::new());

    let _probe = server
        .mock("GET", "/users/me")
        .with_status(401)
        .with_body(json!({"errors": [{"message": "Invalid token"}]}).to_string())
        .create_async()
        .await;

    let client = client_for(&server, storage.clone());
    let err = client
        .auth()
        .use_static_token("bad-tok")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid token");
    assert_eq!(storage.auth_token(), None);
}

#[tokio::test]
async fn test_static_token_at_construction() {
    let mut server = Server::new_async().await;
    let storage = Arc::new(MemoryStorage::new());

    let articles = server
        .mock("GET", "/items/articles")
        .match_header("authorization", "Bearer stat-tok")
        .with_body(json!({"data": []}).to_string())
        .create_async()
        .await;

    let client = StrataClient::builder(server.url())
        .mode(AuthMode::Json)
        .storage(storage.clone())
        .static_token("stat-tok")
        .build()
        .unwrap();

    assert_eq!(storage.auth_token(), Some("stat-tok".to_string()));
    assert_eq!(storage.auth_expires_at(), None);

    client
        .items("articles")
        .read_by_query(&strata_sdk::Query::new())
        .await
        .unwrap();
    articles.assert_async().await;
}

// ==================================================================================================
// Logout
// ==================================================================================================

#[tokio::test]
async fn test_logout_sends_refresh_token_and_clears_store() {
    let mut server = Server::new_async().await;
    let storage = Arc::new(MemoryStorage::new());

    let _login = server
        .mock("POST", "/auth/login")
        .with_body(login_body("T1", "R1", 3_600_000))
        .create_async()
        .await;
    let logout = server
        .mock("POST", "/auth/logout")
        .match_body(Matcher::PartialJson(json!({"refresh_token": "R1"})))
        .with_body(json!({}).to_string())
        .create_async()
        .await;

    let client = client_for(&server, storage.clone());
    login(&client).await;
    client.auth().logout().await.unwrap();

    logout.assert_async().await;
    assert_eq!(storage.auth_token(), None);
    assert_eq!(storage.auth_refresh_token(), None);
    assert_eq!(storage.auth_expires(), None);
    assert_eq!(storage.auth_expires_at(), None);
}

#[tokio::test]
async fn test_failed_logout_keeps_local_credentials() {
    let mut server = Server::new_async().await;
    let storage = Arc::new(MemoryStorage::new());

    let _login = server
        .mock("POST", "/auth/login")
        .with_body(login_body("T1", "R1", 3_600_000))
        .create_async()
        .await;
    let _logout = server
        .mock("POST", "/auth/logout")
        .with_status(500)
        .with_body(json!({"errors": [{"message": "Service unavailable"}]}).to_string())
        .create_async()
        .await;

    let client = client_for(&server, storage.clone());
    login(&client).await;
    let err = client.auth().logout().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    // Clearing is gated on server acknowledgement
    assert_eq!(storage.auth_token(), Some("T1".to_string()));
}

// ==================================================================================================
// Error normalization
// ==================================================================================================

#[tokio::test]
async fn test_body_errors_normalize_like_error_statuses() {
    let mut server = Server::new_async().await;
    let body = json!({"errors": [{"message": "Forbidden"}]}).to_string();

    let _ok_status = server
        .mock("GET", "/items/sneaky")
        .with_status(200)
        .with_body(body.as_str())
        .create_async()
        .await;
    let _forbidden = server
        .mock("GET", "/items/locked")
        .with_status(403)
        .with_body(body.as_str())
        .create_async()
        .await;

    let client = client_for(&server, Arc::new(MemoryStorage::new()));
    let from_body = client
        .items("sneaky")
        .read_by_query(&strata_sdk::Query::new())
        .await
        .unwrap_err();
    let from_status = client
        .items("locked")
        .read_by_query(&strata_sdk::Query::new())
        .await
        .unwrap_err();

    assert_eq!(from_body.to_string(), "Forbidden");
    assert_eq!(from_status.to_string(), "Forbidden");
    assert_eq!(from_body.api_errors(), from_status.api_errors());
    assert_eq!(from_body.status(), Some(200));
    assert_eq!(from_status.status(), Some(403));
}

#[tokio::test]
async fn test_unreachable_host_is_a_network_failure() {
    // Nothing listens on this port
    let client = StrataClient::builder("http://127.0.0.1:1")
        .build()
        .unwrap();
    let err = client.server().ping().await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert_eq!(err.status(), None);
}

// ==================================================================================================
// Password recovery
// ==================================================================================================

#[tokio::test]
async fn test_password_request_and_reset() {
    let mut server = Server::new_async().await;

    let request = server
        .mock("POST", "/auth/password/request")
        .match_body(Matcher::Json(json!({
            "email": "admin@example.com",
            "reset_url": "https://app.example.com/reset",
        })))
        .with_body(json!({}).to_string())
        .create_async()
        .await;
    let reset = server
        .mock("POST", "/auth/password/reset")
        .match_body(Matcher::Json(json!({
            "token": "reset-token",
            "password": "new-password",
        })))
        .with_body(json!({}).to_string())
        .create_async()
        .await;

    let client = client_for(&server, Arc::new(MemoryStorage::new()));
    client
        .passwords()
        .request("admin@example.com", Some("https://app.example.com/reset"))
        .await
        .unwrap();
    client
        .passwords()
        .reset("reset-token", "new-password")
        .await
        .unwrap();

    request.assert_async().await;
    reset.assert_async().await;
}
