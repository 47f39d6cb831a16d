// File-backed credential storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use super::CredentialStorage;

/// Credential storage persisted as a JSON map on disk, the non-browser
/// counterpart of a browsing-context-scoped persistent store.
///
/// The storage contract has no error conditions: I/O or parse failures are
/// logged and degrade to "missing key" reads and dropped writes.
pub struct FileStorage {
    path: PathBuf,
    prefix: String,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_prefix(path, "")
    }

    pub fn with_prefix(path: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            prefix: prefix.into(),
            lock: Mutex::new(()),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    fn read_all(&self) -> HashMap<String, String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => HashMap::new(),
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Credential file is not valid JSON, treating as empty"
                );
                HashMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Failed to read credential file"
                );
                HashMap::new()
            }
        }
    }

    fn write_all(&self, values: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                tracing::warn!(
                    path = %parent.display(),
                    error = %err,
                    "Failed to create credential directory"
                );
                return;
            }
        }

        let content = match serde_json::to_string_pretty(values) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to serialize credentials");
                return;
            }
        };

        if let Err(err) = std::fs::write(&self.path, &content) {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "Failed to write credential file"
            );
            return;
        }

        // Credentials on disk stay private to the owner
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            if let Err(err) = std::fs::set_permissions(&self.path, perms) {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Failed to restrict credential file permissions"
                );
            }
        }
    }
}

impl CredentialStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap();
        self.read_all().get(&self.key(key)).cloned()
    }

    fn set(&self, key: &str, value: &str) -> String {
        let _guard = self.lock.lock().unwrap();
        let mut values = self.read_all();
        values.insert(self.key(key), value.to_string());
        self.write_all(&values);
        value.to_string()
    }

    fn delete(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap();
        let mut values = self.read_all();
        let previous = values.remove(&self.key(key));
        if previous.is_some() {
            self.write_all(&values);
        }
        previous
    }
}
