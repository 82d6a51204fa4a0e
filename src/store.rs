//! Durable credential storage backed by a `.env`-style key-value file.
//!
//! Credentials are written by the setup flow and read at client
//! construction time. Writes update keys in place and preserve any
//! unrelated lines already in the file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{TwitterError, TwitterResult};

/// Env-file key for the stored Twitter handle.
pub const KEY_USERNAME: &str = "TWITTER_USERNAME";
/// Env-file key for the numeric user id.
pub const KEY_USER_ID: &str = "TWITTER_USER_ID";
/// Env-file key for the OAuth consumer key.
pub const KEY_CONSUMER_KEY: &str = "TWITTER_CONSUMER_KEY";
/// Env-file key for the OAuth consumer secret.
pub const KEY_CONSUMER_SECRET: &str = "TWITTER_CONSUMER_SECRET";
/// Env-file key for the OAuth access token.
pub const KEY_ACCESS_TOKEN: &str = "TWITTER_ACCESS_TOKEN";
/// Env-file key for the OAuth access token secret.
pub const KEY_ACCESS_TOKEN_SECRET: &str = "TWITTER_ACCESS_TOKEN_SECRET";

/// Key-value credential store persisted to a dotenv file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all key-value pairs from the backing file.
    ///
    /// A missing file reads as an empty store.
    pub fn load(&self) -> TwitterResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let mut values = HashMap::new();
        for item in dotenvy::from_path_iter(&self.path).map_err(|e| {
            TwitterError::Config(format!("failed to read {}: {e}", self.path.display()))
        })? {
            let (key, value) = item.map_err(|e| {
                TwitterError::Config(format!("malformed entry in {}: {e}", self.path.display()))
            })?;
            values.insert(key, value);
        }
        Ok(values)
    }

    /// Read a single value, treating empty strings as absent.
    pub fn get(&self, key: &str) -> TwitterResult<Option<String>> {
        Ok(self.load()?.remove(key).filter(|v| !v.is_empty()))
    }

    /// Write the given pairs, replacing existing keys and appending new
    /// ones. Unrelated lines are kept as-is. Creates the file if absent.
    pub fn set_keys(&self, pairs: &[(&str, &str)]) -> TwitterResult<()> {
        let existing = if self.path.exists() {
            fs::read_to_string(&self.path)?
        } else {
            String::new()
        };

        let mut lines: Vec<String> = existing.lines().map(str::to_string).collect();

        for (key, value) in pairs {
            let prefix = format!("{key}=");
            match lines.iter_mut().find(|l| l.starts_with(&prefix)) {
                Some(line) => *line = format!("{key}={value}"),
                None => lines.push(format!("{key}={value}")),
            }
        }

        let mut contents = lines.join("\n");
        contents.push('\n');
        fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Write a single key.
    pub fn set_key(&self, key: &str, value: &str) -> TwitterResult<()> {
        self.set_keys(&[(key, value)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join(".env"));
        (dir, store)
    }

    #[test]
    fn missing_file_reads_empty() {
        let (_dir, store) = temp_store();
        assert!(!store.exists());
        assert!(store.load().unwrap().is_empty());
        assert_eq!(store.get(KEY_USERNAME).unwrap(), None);
    }

    #[test]
    fn keys_round_trip() {
        let (_dir, store) = temp_store();
        store
            .set_keys(&[(KEY_USERNAME, "alice"), (KEY_USER_ID, "12345")])
            .unwrap();

        assert_eq!(store.get(KEY_USERNAME).unwrap().as_deref(), Some("alice"));
        assert_eq!(store.get(KEY_USER_ID).unwrap().as_deref(), Some("12345"));
    }

    #[test]
    fn set_key_replaces_in_place() {
        let (_dir, store) = temp_store();
        store.set_key(KEY_USERNAME, "alice").unwrap();
        store.set_key(KEY_USERNAME, "bob").unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents.matches(KEY_USERNAME).count(), 1);
        assert_eq!(store.get(KEY_USERNAME).unwrap().as_deref(), Some("bob"));
    }

    #[test]
    fn unrelated_lines_are_preserved() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), "OTHER_KEY=keepme\n").unwrap();
        store.set_key(KEY_CONSUMER_KEY, "ck").unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert!(contents.contains("OTHER_KEY=keepme"));
        assert!(contents.contains("TWITTER_CONSUMER_KEY=ck"));
    }

    #[test]
    fn empty_value_reads_as_absent() {
        let (_dir, store) = temp_store();
        store.set_key(KEY_ACCESS_TOKEN, "").unwrap();
        assert_eq!(store.get(KEY_ACCESS_TOKEN).unwrap(), None);
    }
}
