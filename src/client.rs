// Client facade and composition root
// Wires storage + transport + auth and injects the request-signing hook

use std::sync::Arc;

use futures::FutureExt;
use once_cell::sync::OnceCell;
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::auth::{AuthManager, AuthMode, Authenticator, PasswordsHandler};
use crate::config::AuthConfig;
use crate::error::Result;
use crate::handlers::{
    ActivityHandler, AssetsHandler, CollectionsHandler, FieldsHandler, FilesHandler,
    FoldersHandler, GraphqlHandler, ItemsHandler, PermissionsHandler, PresetsHandler,
    RelationsHandler, RevisionsHandler, RolesHandler, ServerHandler, SettingsHandler,
    SingletonHandler, UsersHandler, UtilsHandler,
};
use crate::storage::{CredentialStorage, MemoryStorage};
use crate::transport::{BeforeRequestHook, HttpTransport, Transport};

/// Client for a Strata API instance.
///
/// Construct through [`StrataClient::builder`]. Every resource handler
/// shares one transport, and every authenticated request flows through the
/// signing hook installed by the builder.
pub struct StrataClient {
    url: String,
    storage: Arc<dyn CredentialStorage>,
    transport: Arc<dyn Transport>,
    auth: Arc<dyn Authenticator>,
    activity: ActivityHandler,
    assets: AssetsHandler,
    collections: CollectionsHandler,
    fields: FieldsHandler,
    files: FilesHandler,
    folders: FoldersHandler,
    graphql: GraphqlHandler,
    passwords: PasswordsHandler,
    permissions: PermissionsHandler,
    presets: PresetsHandler,
    relations: RelationsHandler,
    revisions: RevisionsHandler,
    roles: RolesHandler,
    server: ServerHandler,
    settings: SettingsHandler,
    users: UsersHandler,
    utils: UtilsHandler,
}

impl StrataClient {
    /// Starts building a client for `url`.
    pub fn builder(url: impl Into<String>) -> StrataClientBuilder {
        StrataClientBuilder::new(url)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn auth(&self) -> &Arc<dyn Authenticator> {
        &self.auth
    }

    pub fn storage(&self) -> &Arc<dyn CredentialStorage> {
        &self.storage
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Item operations over a collection, decoding into JSON values.
    pub fn items(&self, collection: impl Into<String>) -> ItemsHandler {
        ItemsHandler::new(collection, Arc::clone(&self.transport))
    }

    /// Item operations over a collection, decoding into `T`.
    pub fn items_as<T: DeserializeOwned>(&self, collection: &str) -> ItemsHandler<T> {
        ItemsHandler::new(collection, Arc::clone(&self.transport))
    }

    /// Singleton operations over a collection holding one item.
    pub fn singleton(&self, collection: impl Into<String>) -> SingletonHandler {
        SingletonHandler::new(collection, Arc::clone(&self.transport))
    }

    pub fn singleton_as<T: DeserializeOwned>(&self, collection: &str) -> SingletonHandler<T> {
        SingletonHandler::new(collection, Arc::clone(&self.transport))
    }

    pub fn activity(&self) -> &ActivityHandler {
        &self.activity
    }

    pub fn assets(&self) -> &AssetsHandler {
        &self.assets
    }

    pub fn collections(&self) -> &CollectionsHandler {
        &self.collections
    }

    pub fn fields(&self) -> &FieldsHandler {
        &self.fields
    }

    pub fn files(&self) -> &FilesHandler {
        &self.files
    }

    pub fn folders(&self) -> &FoldersHandler {
        &self.folders
    }

    pub fn graphql(&self) -> &GraphqlHandler {
        &self.graphql
    }

    /// Password-recovery endpoints.
    pub fn passwords(&self) -> &PasswordsHandler {
        &self.passwords
    }

    pub fn permissions(&self) -> &PermissionsHandler {
        &self.permissions
    }

    pub fn presets(&self) -> &PresetsHandler {
        &self.presets
    }

    pub fn relations(&self) -> &RelationsHandler {
        &self.relations
    }

    pub fn revisions(&self) -> &RevisionsHandler {
        &self.revisions
    }

    pub fn roles(&self) -> &RolesHandler {
        &self.roles
    }

    pub fn server(&self) -> &ServerHandler {
        &self.server
    }

    pub fn settings(&self) -> &SettingsHandler {
        &self.settings
    }

    pub fn users(&self) -> &UsersHandler {
        &self.users
    }

    pub fn utils(&self) -> &UtilsHandler {
        &self.utils
    }
}

/// Builder for [`StrataClient`].
///
/// Any of the three core components can be substituted with a custom
/// implementation of its contract; the stock wiring fills in the rest.
pub struct StrataClientBuilder {
    url: String,
    auth_config: AuthConfig,
    storage: Option<Arc<dyn CredentialStorage>>,
    transport: Option<Arc<dyn Transport>>,
    authenticator: Option<Arc<dyn Authenticator>>,
    http_client: Option<reqwest::Client>,
}

impl StrataClientBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_config: AuthConfig::default(),
            storage: None,
            transport: None,
            authenticator: None,
            http_client: None,
        }
    }

    /// Substitute the credential store (defaults to [`MemoryStorage`]).
    pub fn storage(mut self, storage: Arc<dyn CredentialStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Substitute the transport. A custom transport is used as-is: the
    /// signing hook is not installed over it.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Substitute the token lifecycle manager.
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Use a caller-configured `reqwest` client (custom TLS, timeouts).
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn auto_refresh(mut self, auto_refresh: bool) -> Self {
        self.auth_config.auto_refresh = auto_refresh;
        self
    }

    pub fn mode(mut self, mode: AuthMode) -> Self {
        self.auth_config.mode = mode;
        self
    }

    pub fn ms_refresh_before_expires(mut self, lead_ms: i64) -> Self {
        self.auth_config.ms_refresh_before_expires = lead_ms;
        self
    }

    /// Activate static-token mode at construction.
    pub fn static_token(mut self, token: impl Into<String>) -> Self {
        self.auth_config.static_token = Some(token.into());
        self
    }

    pub fn build(self) -> Result<StrataClient> {
        let storage: Arc<dyn CredentialStorage> = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));

        // The hook needs the authenticator, the authenticator needs the
        // transport: late-bind the authenticator through a cell.
        let auth_cell: Arc<OnceCell<Arc<dyn Authenticator>>> = Arc::new(OnceCell::new());

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let hook = signing_hook(Arc::clone(&auth_cell), Arc::clone(&storage));
                let http = match self.http_client {
                    Some(client) => HttpTransport::with_client(&self.url, client),
                    None => HttpTransport::new(&self.url)?,
                };
                Arc::new(http.with_before_request(hook))
            }
        };

        let auth: Arc<dyn Authenticator> = match self.authenticator {
            Some(authenticator) => authenticator,
            None => Arc::new(AuthManager::new(
                Arc::clone(&transport),
                Arc::clone(&storage),
                self.auth_config,
            )),
        };
        let _ = auth_cell.set(Arc::clone(&auth));

        Ok(StrataClient {
            activity: ActivityHandler::new(Arc::clone(&transport)),
            assets: AssetsHandler::new(Arc::clone(&transport)),
            collections: CollectionsHandler::new(Arc::clone(&transport)),
            fields: FieldsHandler::new(Arc::clone(&transport)),
            files: FilesHandler::new(Arc::clone(&transport)),
            folders: FoldersHandler::new("strata_folders", Arc::clone(&transport)),
            graphql: GraphqlHandler::new(Arc::clone(&transport)),
            passwords: PasswordsHandler::new(Arc::clone(&transport)),
            permissions: PermissionsHandler::new("strata_permissions", Arc::clone(&transport)),
            presets: PresetsHandler::new("strata_presets", Arc::clone(&transport)),
            relations: RelationsHandler::new(Arc::clone(&transport)),
            revisions: RevisionsHandler::new("strata_revisions", Arc::clone(&transport)),
            roles: RolesHandler::new("strata_roles", Arc::clone(&transport)),
            server: ServerHandler::new(Arc::clone(&transport)),
            settings: SettingsHandler::new("strata_settings", Arc::clone(&transport)),
            users: UsersHandler::new(Arc::clone(&transport)),
            utils: UtilsHandler::new(Arc::clone(&transport)),
            url: self.url,
            storage,
            transport,
            auth,
        })
    }
}

/// The request-signing hook: trigger the refresh guard for non-lifecycle
/// requests, then attach the stored bearer token.
fn signing_hook(
    auth: Arc<OnceCell<Arc<dyn Authenticator>>>,
    storage: Arc<dyn CredentialStorage>,
) -> BeforeRequestHook {
    Arc::new(move |mut config| {
        let auth = Arc::clone(&auth);
        let storage = Arc::clone(&storage);
        async move {
            if !config.no_auth {
                // Lifecycle endpoints are all POSTs and must not re-enter
                // the guard; everything else joins any pending refresh.
                if config.method != Method::POST && !config.path.contains("/auth/refresh") {
                    if let Some(auth) = auth.get() {
                        auth.refresh_if_expired().await?;
                    }
                }

                if !config.has_authorization() {
                    if let Some(token) = storage.auth_token() {
                        let bearer = if token.starts_with("Bearer ") {
                            token
                        } else {
                            format!("Bearer {token}")
                        };
                        config.headers.push(("Authorization".to_string(), bearer));
                    }
                }
            }
            Ok(config)
        }
        .boxed()
    })
}
