//! The connection adapter: action registry and the actions themselves.
//!
//! `TwitterConnection` owns the credential store and a lazily built API
//! client. Dispatch goes through a closed [`Action`] enum while keeping
//! the external string-keyed action names stable.

use std::sync::OnceLock;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{
    client::TwitterApiClient,
    config::TwitterConfig,
    error::{TwitterError, TwitterResult},
    store::{CredentialStore, KEY_USER_ID},
    types::{CreateTweetRequest, CreateTweetResponse, LikeTweetResponse, TimelineTweet, Tweet},
};

/// Maximum tweet length accepted by the create endpoint.
const TWEET_CHAR_LIMIT: usize = 280;

/// Default result count when an action is invoked without one.
const DEFAULT_COUNT: u32 = 10;

/// The closed set of actions the adapter exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Fetch a user's recent tweets with engagement metrics.
    GetLatestTweets,
    /// Publish a tweet.
    PostTweet,
    /// Read the authenticated user's home timeline.
    ReadTimeline,
    /// Like a tweet.
    LikeTweet,
}

impl Action {
    /// Parse an external action name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "get-latest-tweets" => Some(Self::GetLatestTweets),
            "post-tweet" => Some(Self::PostTweet),
            "read-timeline" => Some(Self::ReadTimeline),
            "like-tweet" => Some(Self::LikeTweet),
            _ => None,
        }
    }

    /// The external action name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetLatestTweets => "get-latest-tweets",
            Self::PostTweet => "post-tweet",
            Self::ReadTimeline => "read-timeline",
            Self::LikeTweet => "like-tweet",
        }
    }
}

/// Declared parameter schema for one action.
#[derive(Debug, Clone, Copy)]
pub struct ActionDescriptor {
    /// External action name
    pub name: &'static str,
    /// Parameter name/type pairs
    pub params: &'static [(&'static str, &'static str)],
}

/// The static action registry.
pub const ACTIONS: &[ActionDescriptor] = &[
    ActionDescriptor {
        name: "get-latest-tweets",
        params: &[("username", "string"), ("count", "integer")],
    },
    ActionDescriptor {
        name: "post-tweet",
        params: &[("message", "string")],
    },
    ActionDescriptor {
        name: "read-timeline",
        params: &[("count", "integer")],
    },
    ActionDescriptor {
        name: "like-tweet",
        params: &[("tweet_id", "string")],
    },
];

/// Connection adapter for the Twitter API.
pub struct TwitterConnection {
    store: CredentialStore,
    api_url: Option<String>,
    client: OnceLock<TwitterApiClient>,
}

impl TwitterConnection {
    /// Create an adapter over the given credential store.
    #[must_use]
    pub fn new(store: CredentialStore) -> Self {
        Self {
            store,
            api_url: None,
            client: OnceLock::new(),
        }
    }

    /// Set a custom API base URL (for testing).
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// The credential store backing this adapter.
    #[must_use]
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// The API base URL override, if one was set.
    #[must_use]
    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }

    /// The action registry: name and declared parameters per action.
    #[must_use]
    pub fn actions(&self) -> &'static [ActionDescriptor] {
        ACTIONS
    }

    fn config(&self) -> TwitterResult<TwitterConfig> {
        let mut config = TwitterConfig::from_store(&self.store)?;
        if let Some(url) = &self.api_url {
            config = config.with_api_url(url.clone());
        }
        Ok(config)
    }

    /// Get or build the API client. Built once from the four stored
    /// secrets; a later authentication failure is a request error, not a
    /// rebuild.
    fn client(&self) -> TwitterResult<&TwitterApiClient> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = TwitterApiClient::new(&self.config()?)?;
        Ok(self.client.get_or_init(|| client))
    }

    fn user_id(&self) -> TwitterResult<String> {
        self.store.get(KEY_USER_ID)?.ok_or_else(|| {
            TwitterError::Validation(format!("{KEY_USER_ID} not found in credential store"))
        })
    }

    /// Look up an action by name and invoke it with JSON arguments.
    ///
    /// Unregistered names fail with [`TwitterError::UnknownAction`]
    /// before any credential access or network I/O.
    #[instrument(skip(self, args))]
    pub async fn perform_action(&self, name: &str, args: &Value) -> TwitterResult<Value> {
        let action =
            Action::from_name(name).ok_or_else(|| TwitterError::UnknownAction(name.to_string()))?;

        debug!(action = action.name(), "Performing action");

        match action {
            Action::GetLatestTweets => {
                let username = required_str(args, "username")?;
                let count = count_arg(args, "count")?;
                let tweets = self.get_latest_tweets(&username, count).await?;
                Ok(serde_json::to_value(tweets)?)
            }
            Action::PostTweet => {
                let message = required_str(args, "message")?;
                let response = self.post_tweet(&message).await?;
                Ok(serde_json::to_value(response)?)
            }
            Action::ReadTimeline => {
                let count = count_arg(args, "count")?;
                let tweets = self.read_timeline(count).await?;
                Ok(serde_json::to_value(tweets)?)
            }
            Action::LikeTweet => {
                let tweet_id = required_str(args, "tweet_id")?;
                let response = self.like_tweet(&tweet_id).await?;
                Ok(serde_json::to_value(response)?)
            }
        }
    }

    /// Get the latest tweets for a user, excluding retweets and replies.
    ///
    /// The username is resolved to a numeric id first; resolution
    /// failures are wrapped with the offending username. The requested
    /// count is capped at the endpoint limit of 100.
    #[instrument(skip(self))]
    pub async fn get_latest_tweets(&self, username: &str, count: u32) -> TwitterResult<Vec<Tweet>> {
        let user_id = self.resolve_user_id(username).await?;

        let response = self.client()?.get_user_tweets(&user_id, count).await?;
        Ok(response.data.unwrap_or_default())
    }

    /// Resolve a username (without @) to its numeric user id.
    pub async fn resolve_user_id(&self, username: &str) -> TwitterResult<String> {
        let username = username.trim_start_matches('@');

        let response = self
            .client()?
            .get_user_by_username(username)
            .await
            .map_err(|e| TwitterError::lookup(username, e))?;

        let user = response.data.ok_or_else(|| {
            TwitterError::lookup(
                username,
                TwitterError::Validation(format!("no user found for username: {username}")),
            )
        })?;

        Ok(user.id)
    }

    /// Post a new tweet.
    ///
    /// Messages over 280 characters are rejected before any request is
    /// made.
    #[instrument(skip(self, message))]
    pub async fn post_tweet(&self, message: &str) -> TwitterResult<CreateTweetResponse> {
        if message.chars().count() > TWEET_CHAR_LIMIT {
            return Err(TwitterError::Validation(format!(
                "tweet exceeds {TWEET_CHAR_LIMIT} character limit"
            )));
        }

        let request = CreateTweetRequest {
            text: message.to_string(),
        };
        self.client()?.create_tweet(&request).await
    }

    /// Read the authenticated user's home timeline.
    ///
    /// Each tweet is joined with its author's display name and handle
    /// from the response's referenced-user list; authors missing from
    /// that list are reported as "Unknown".
    #[instrument(skip(self))]
    pub async fn read_timeline(&self, count: u32) -> TwitterResult<Vec<TimelineTweet>> {
        let user_id = self.user_id()?;

        let response = self.client()?.get_home_timeline(&user_id, count).await?;

        let users = response
            .includes
            .map(|includes| includes.users)
            .unwrap_or_default();

        let tweets = response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|tweet| {
                let author = tweet
                    .author_id
                    .as_deref()
                    .and_then(|id| users.iter().find(|u| u.id == id));

                TimelineTweet {
                    id: tweet.id,
                    text: tweet.text,
                    created_at: tweet.created_at,
                    author_id: tweet.author_id,
                    author_name: author.map_or_else(|| "Unknown".to_string(), |u| u.name.clone()),
                    author_username: author
                        .map_or_else(|| "Unknown".to_string(), |u| u.username.clone()),
                }
            })
            .collect();

        Ok(tweets)
    }

    /// Like a tweet on behalf of the stored user.
    #[instrument(skip(self))]
    pub async fn like_tweet(&self, tweet_id: &str) -> TwitterResult<LikeTweetResponse> {
        let user_id = self.user_id()?;
        self.client()?.like_tweet(&user_id, tweet_id).await
    }

    /// Whether all required credentials are present and valid.
    ///
    /// Checks that the five required fields are stored, then issues a
    /// live `users/me` call. Every failure reduces to `false`; with
    /// `verbose` the cause is printed.
    pub async fn is_configured(&self, verbose: bool) -> bool {
        match self.validate_credentials().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Credential validation failed");
                if verbose {
                    eprintln!("There was an error validating your Twitter credentials: {e}");
                }
                false
            }
        }
    }

    async fn validate_credentials(&self) -> TwitterResult<()> {
        let values = self.store.load()?;
        if !TwitterConfig::has_required_credentials(&values) {
            return Err(TwitterError::Config(
                "missing required Twitter credentials".into(),
            ));
        }

        self.client()?.get_me().await?;
        Ok(())
    }
}

fn required_str(args: &Value, key: &str) -> TwitterResult<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TwitterError::Validation(format!("missing '{key}' argument")))
}

fn count_arg(args: &Value, key: &str) -> TwitterResult<u32> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(DEFAULT_COUNT),
        Some(value) => value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| TwitterError::Validation(format!("'{key}' must be an integer"))),
    }
}
