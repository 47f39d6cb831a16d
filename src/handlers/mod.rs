// Resource handlers
// Mechanical parameter-to-URL mapping over the transport pipeline

mod activity;
mod assets;
mod collections;
mod fields;
mod files;
mod graphql;
mod items;
mod relations;
mod server;
mod singleton;
mod users;
mod utils;

pub use activity::{ActivityHandler, CommentsHandler};
pub use assets::AssetsHandler;
pub use collections::CollectionsHandler;
pub use fields::FieldsHandler;
pub use files::FilesHandler;
pub use graphql::GraphqlHandler;
pub use items::ItemsHandler;
pub use relations::RelationsHandler;
pub use server::ServerHandler;
pub use singleton::SingletonHandler;
pub use users::{InvitesHandler, MeHandler, TfaHandler, UsersHandler};
pub use utils::UtilsHandler;

/// Handlers over fixed system collections with no extra surface.
pub type FoldersHandler = ItemsHandler;
pub type PermissionsHandler = ItemsHandler;
pub type PresetsHandler = ItemsHandler;
pub type RevisionsHandler = ItemsHandler;
pub type RolesHandler = ItemsHandler;
pub type SettingsHandler = SingletonHandler;

use crate::error::{Error, Result};

/// Rejects empty identifier arguments before any network call.
pub(crate) fn ensure_param(value: &str, name: &'static str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::EmptyParam(name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_param() {
        assert!(ensure_param("articles", "collection").is_ok());
        let err = ensure_param("", "collection").unwrap_err();
        assert!(matches!(err, Error::EmptyParam("collection")));
    }
}
