// Credential storage
// Key/value persistence for the four auth fields, namespaced by prefix

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Logical storage keys. Backends prepend their configured prefix.
pub mod keys {
    pub const AUTH_TOKEN: &str = "auth_token";
    pub const AUTH_REFRESH_TOKEN: &str = "auth_refresh_token";
    pub const AUTH_EXPIRES: &str = "auth_expires";
    pub const AUTH_EXPIRES_AT: &str = "auth_expires_at";
}

/// Key/value persistence for credentials.
///
/// A missing key is `None`, never an error. Implementations namespace keys
/// with an optional prefix so multiple SDK instances can share one backing
/// store without collision. The typed accessors layer the four auth fields
/// on top of the raw string contract; expiry values that fail to parse are
/// treated as missing.
pub trait CredentialStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key` and returns the stored value.
    fn set(&self, key: &str, value: &str) -> String;

    /// Removes `key`, returning the previous value if any.
    fn delete(&self, key: &str) -> Option<String>;

    fn auth_token(&self) -> Option<String> {
        self.get(keys::AUTH_TOKEN)
    }

    fn set_auth_token(&self, value: Option<&str>) {
        match value {
            Some(token) => {
                self.set(keys::AUTH_TOKEN, token);
            }
            None => {
                self.delete(keys::AUTH_TOKEN);
            }
        }
    }

    fn auth_refresh_token(&self) -> Option<String> {
        self.get(keys::AUTH_REFRESH_TOKEN)
    }

    fn set_auth_refresh_token(&self, value: Option<&str>) {
        match value {
            Some(token) => {
                self.set(keys::AUTH_REFRESH_TOKEN, token);
            }
            None => {
                self.delete(keys::AUTH_REFRESH_TOKEN);
            }
        }
    }

    /// Server-declared token lifetime in milliseconds, relative.
    fn auth_expires(&self) -> Option<i64> {
        self.get(keys::AUTH_EXPIRES).and_then(|v| v.parse().ok())
    }

    fn set_auth_expires(&self, value: Option<i64>) {
        match value {
            Some(ms) => {
                self.set(keys::AUTH_EXPIRES, &ms.to_string());
            }
            None => {
                self.delete(keys::AUTH_EXPIRES);
            }
        }
    }

    /// Absolute wall-clock expiry timestamp in milliseconds.
    fn auth_expires_at(&self) -> Option<i64> {
        self.get(keys::AUTH_EXPIRES_AT).and_then(|v| v.parse().ok())
    }

    fn set_auth_expires_at(&self, value: Option<i64>) {
        match value {
            Some(ms) => {
                self.set(keys::AUTH_EXPIRES_AT, &ms.to_string());
            }
            None => {
                self.delete(keys::AUTH_EXPIRES_AT);
            }
        }
    }
}

impl<T: CredentialStorage + ?Sized> CredentialStorage for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> String {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Option<String> {
        (**self).delete(key)
    }
}
