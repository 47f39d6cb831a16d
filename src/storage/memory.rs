// In-process credential storage

use std::collections::HashMap;
use std::sync::Mutex;

use super::CredentialStorage;

/// In-memory credential storage, the default on non-browser hosts.
///
/// Values live only as long as the process; nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    prefix: String,
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespaces all keys with `prefix`, allowing several SDK instances to
    /// share one store.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            values: Mutex::new(HashMap::new()),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }
}

impl CredentialStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(&self.key(key)).cloned()
    }

    fn set(&self, key: &str, value: &str) -> String {
        self.values
            .lock()
            .unwrap()
            .insert(self.key(key), value.to_string());
        value.to_string()
    }

    fn delete(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().remove(&self.key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::keys;
    use proptest::prelude::*;

    #[test]
    fn test_missing_key_is_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("nope"), None);
        assert_eq!(storage.delete("nope"), None);
    }

    #[test]
    fn test_set_get_delete() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.set("k", "v"), "v");
        assert_eq!(storage.get("k"), Some("v".to_string()));
        assert_eq!(storage.delete("k"), Some("v".to_string()));
        assert_eq!(storage.get("k"), None);
    }

    #[test]
    fn test_prefix_isolation() {
        let a = MemoryStorage::with_prefix("a_");
        let b = MemoryStorage::with_prefix("b_");
        a.set(keys::AUTH_TOKEN, "token-a");
        b.set(keys::AUTH_TOKEN, "token-b");
        assert_eq!(a.auth_token(), Some("token-a".to_string()));
        assert_eq!(b.auth_token(), Some("token-b".to_string()));
    }

    #[test]
    fn test_typed_expiry_accessors() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.auth_expires_at(), None);

        storage.set_auth_expires(Some(5000));
        storage.set_auth_expires_at(Some(1_700_000_005_000));
        assert_eq!(storage.auth_expires(), Some(5000));
        assert_eq!(storage.auth_expires_at(), Some(1_700_000_005_000));

        storage.set_auth_expires_at(None);
        assert_eq!(storage.auth_expires_at(), None);
    }

    #[test]
    fn test_unparseable_expiry_is_none() {
        let storage = MemoryStorage::new();
        storage.set(keys::AUTH_EXPIRES, "not-a-number");
        assert_eq!(storage.auth_expires(), None);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(key in "[a-z_]{1,16}", value in ".{0,64}") {
            let storage = MemoryStorage::with_prefix("p_");
            storage.set(&key, &value);
            prop_assert_eq!(storage.get(&key), Some(value.clone()));
            prop_assert_eq!(storage.delete(&key), Some(value));
            prop_assert_eq!(storage.get(&key), None);
        }
    }
}
