//! Twitter API v2 wire types.

use serde::{Deserialize, Serialize};

/// Standard Twitter API v2 response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de>"
))]
pub struct TwitterResponse<T> {
    /// The primary data
    #[serde(default)]
    pub data: Option<T>,

    /// Included expansions (referenced users)
    #[serde(default)]
    pub includes: Option<Includes>,

    /// Metadata about the response
    #[serde(default)]
    pub meta: Option<ResponseMeta>,
}

impl<T> Default for TwitterResponse<T> {
    fn default() -> Self {
        Self {
            data: None,
            includes: None,
            meta: None,
        }
    }
}

/// Included expansions in Twitter API responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Includes {
    /// Expanded user objects
    #[serde(default)]
    pub users: Vec<User>,
}

/// Response metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Number of results
    #[serde(default)]
    pub result_count: Option<u32>,

    /// Token for next page
    #[serde(default)]
    pub next_token: Option<String>,

    /// Newest tweet ID in the response
    #[serde(default)]
    pub newest_id: Option<String>,

    /// Oldest tweet ID in the response
    #[serde(default)]
    pub oldest_id: Option<String>,
}

/// Twitter tweet object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    /// Tweet ID
    pub id: String,

    /// Tweet text content
    pub text: String,

    /// Author user ID
    #[serde(default)]
    pub author_id: Option<String>,

    /// Tweet creation timestamp (ISO 8601)
    #[serde(default)]
    pub created_at: Option<String>,

    /// Public engagement metrics
    #[serde(default)]
    pub public_metrics: Option<TweetPublicMetrics>,

    /// Attached media keys
    #[serde(default)]
    pub attachments: Option<Attachments>,
}

/// Tweet public metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetPublicMetrics {
    /// Retweet count
    pub retweet_count: u64,

    /// Reply count
    pub reply_count: u64,

    /// Like count
    pub like_count: u64,

    /// Quote count
    pub quote_count: u64,

    /// Impression count
    #[serde(default)]
    pub impression_count: Option<u64>,
}

/// Tweet attachments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachments {
    /// Media keys
    #[serde(default)]
    pub media_keys: Option<Vec<String>>,
}

/// Twitter user object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Username (handle without @)
    pub username: String,
}

/// Create tweet request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTweetRequest {
    /// Tweet text
    pub text: String,
}

/// Create tweet response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTweetResponse {
    /// Created tweet data
    pub data: CreatedTweet,
}

/// Created tweet data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedTweet {
    /// Tweet ID
    pub id: String,

    /// Tweet text
    pub text: String,

    /// Edit history tweet IDs
    #[serde(default)]
    pub edit_history_tweet_ids: Option<Vec<String>>,
}

/// Like tweet request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeTweetRequest {
    /// ID of the tweet to like
    pub tweet_id: String,
}

/// Like tweet response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeTweetResponse {
    /// Like result data
    pub data: Liked,
}

/// Like result data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Liked {
    /// Whether the tweet is now liked
    pub liked: bool,
}

/// A home-timeline tweet joined with its author's identity.
///
/// Authors absent from the response's referenced-user list are reported
/// as "Unknown".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineTweet {
    /// Tweet ID
    pub id: String,

    /// Tweet text content
    pub text: String,

    /// Tweet creation timestamp (ISO 8601)
    #[serde(default)]
    pub created_at: Option<String>,

    /// Author user ID
    #[serde(default)]
    pub author_id: Option<String>,

    /// Author display name
    pub author_name: String,

    /// Author handle
    pub author_username: String,
}
