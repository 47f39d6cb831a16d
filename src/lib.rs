//! # strata-sdk
//!
//! Rust client SDK for the Strata headless CMS REST API.
//!
//! Wraps the REST endpoints (items, collections, fields, files, users, ...)
//! in typed handlers and transparently manages authentication state:
//! tokens are stored in a pluggable credential store, refreshed proactively
//! before they expire, and attached to every outgoing request. Concurrent
//! requests against an expiring token share a single refresh call.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use strata_sdk::{LoginCredentials, Query, StrataClient};
//!
//! #[tokio::main]
//! async fn main() -> strata_sdk::Result<()> {
//!     let client = StrataClient::builder("https://cms.example.com").build()?;
//!
//!     client
//!         .auth()
//!         .login(LoginCredentials::new("admin@example.com", "password"))
//!         .await?;
//!
//!     let articles = client
//!         .items("articles")
//!         .read_by_query(&Query::new().limit(10))
//!         .await?;
//!     println!("fetched {} articles", articles.data.len());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod query;
pub mod storage;
pub mod transport;

// Re-exports for ergonomic usage
pub use auth::{AuthManager, AuthMode, AuthResult, Authenticator, LoginCredentials};
pub use client::{StrataClient, StrataClientBuilder};
pub use config::AuthConfig;
pub use error::{ApiErrorDetail, ApiFailure, Error, Result};
pub use query::{MetaField, Query};
pub use storage::{CredentialStorage, FileStorage, MemoryStorage};
pub use transport::{
    HttpTransport, ManyItems, RequestConfig, RequestOptions, ResponseEnvelope, ResponseMeta,
    Transport,
};
