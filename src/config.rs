//! Adapter configuration.

use std::time::Duration;

use crate::error::{TwitterError, TwitterResult};
use crate::store::{
    CredentialStore, KEY_ACCESS_TOKEN, KEY_ACCESS_TOKEN_SECRET, KEY_CONSUMER_KEY,
    KEY_CONSUMER_SECRET, KEY_USERNAME, KEY_USER_ID,
};

/// Configuration for the Twitter connection adapter.
#[derive(Debug, Clone)]
pub struct TwitterConfig {
    /// OAuth 1.0a Consumer Key (API Key)
    pub consumer_key: String,

    /// OAuth 1.0a Consumer Secret (API Secret)
    pub consumer_secret: String,

    /// OAuth 1.0a Access Token
    pub access_token: String,

    /// OAuth 1.0a Access Token Secret
    pub access_token_secret: String,

    /// Stored Twitter handle (without @)
    pub username: Option<String>,

    /// Stored numeric user id
    pub user_id: Option<String>,

    /// Base URL for the Twitter API v2
    pub api_url: String,

    /// Request timeout
    pub timeout: Duration,
}

fn default_api_url() -> String {
    "https://api.twitter.com".into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            consumer_key: String::new(),
            consumer_secret: String::new(),
            access_token: String::new(),
            access_token_secret: String::new(),
            username: None,
            user_id: None,
            api_url: default_api_url(),
            timeout: default_timeout(),
        }
    }
}

impl TwitterConfig {
    /// Build a config from persisted credentials.
    ///
    /// All four OAuth secrets must be present and non-empty; the
    /// username and user id are carried through as-is.
    pub fn from_store(store: &CredentialStore) -> TwitterResult<Self> {
        let values = store.load()?;

        let required = |key: &str| -> TwitterResult<String> {
            values
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| TwitterError::Config(format!("missing required credential {key}")))
        };

        let optional =
            |key: &str| -> Option<String> { values.get(key).filter(|v| !v.is_empty()).cloned() };

        Ok(Self {
            consumer_key: required(KEY_CONSUMER_KEY)?,
            consumer_secret: required(KEY_CONSUMER_SECRET)?,
            access_token: required(KEY_ACCESS_TOKEN)?,
            access_token_secret: required(KEY_ACCESS_TOKEN_SECRET)?,
            username: optional(KEY_USERNAME),
            user_id: optional(KEY_USER_ID),
            ..Self::default()
        })
    }

    /// Set a custom API base URL (for testing).
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Whether the five credential fields required for authenticated
    /// calls are present: the four OAuth secrets plus the user id.
    #[must_use]
    pub fn has_required_credentials(values: &std::collections::HashMap<String, String>) -> bool {
        [
            KEY_CONSUMER_KEY,
            KEY_CONSUMER_SECRET,
            KEY_ACCESS_TOKEN,
            KEY_ACCESS_TOKEN_SECRET,
            KEY_USER_ID,
        ]
        .iter()
        .all(|key| values.get(*key).is_some_and(|v| !v.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store(pairs: &[(&str, &str)]) -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join(".env"));
        store.set_keys(pairs).unwrap();
        (dir, store)
    }

    #[test]
    fn from_store_with_all_fields() {
        let (_dir, store) = seeded_store(&[
            (KEY_CONSUMER_KEY, "ck"),
            (KEY_CONSUMER_SECRET, "cs"),
            (KEY_ACCESS_TOKEN, "at"),
            (KEY_ACCESS_TOKEN_SECRET, "ats"),
            (KEY_USERNAME, "alice"),
            (KEY_USER_ID, "12345"),
        ]);

        let config = TwitterConfig::from_store(&store).unwrap();
        assert_eq!(config.consumer_key, "ck");
        assert_eq!(config.access_token_secret, "ats");
        assert_eq!(config.user_id.as_deref(), Some("12345"));
        assert_eq!(config.api_url, "https://api.twitter.com");
    }

    #[test]
    fn from_store_rejects_missing_secret() {
        let (_dir, store) = seeded_store(&[
            (KEY_CONSUMER_KEY, "ck"),
            (KEY_CONSUMER_SECRET, "cs"),
            (KEY_ACCESS_TOKEN, "at"),
        ]);

        let err = TwitterConfig::from_store(&store).unwrap_err();
        assert!(matches!(err, TwitterError::Config(_)));
        assert!(err.to_string().contains(KEY_ACCESS_TOKEN_SECRET));
    }

    #[test]
    fn user_id_is_optional_for_construction() {
        let (_dir, store) = seeded_store(&[
            (KEY_CONSUMER_KEY, "ck"),
            (KEY_CONSUMER_SECRET, "cs"),
            (KEY_ACCESS_TOKEN, "at"),
            (KEY_ACCESS_TOKEN_SECRET, "ats"),
        ]);

        let config = TwitterConfig::from_store(&store).unwrap();
        assert_eq!(config.user_id, None);
    }

    #[test]
    fn required_credentials_check_includes_user_id() {
        let mut values = std::collections::HashMap::new();
        for key in [
            KEY_CONSUMER_KEY,
            KEY_CONSUMER_SECRET,
            KEY_ACCESS_TOKEN,
            KEY_ACCESS_TOKEN_SECRET,
        ] {
            values.insert(key.to_string(), "x".to_string());
        }
        assert!(!TwitterConfig::has_required_credentials(&values));

        values.insert(KEY_USER_ID.to_string(), "12345".to_string());
        assert!(TwitterConfig::has_required_credentials(&values));
    }
}
