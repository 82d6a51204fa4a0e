//! Twitter REST API client.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::{
    config::TwitterConfig,
    error::{TwitterError, TwitterResult},
    oauth::OAuthSigner,
    types::{
        CreateTweetRequest, CreateTweetResponse, LikeTweetRequest, LikeTweetResponse, Tweet,
        TwitterResponse, User,
    },
};

/// Maximum `max_results` accepted by the user-tweets endpoint.
const MAX_RESULTS_CAP: u32 = 100;

/// Twitter REST API client.
///
/// Built once from stored credentials and reused for the lifetime of the
/// process. Failures surface immediately; there is no retry or session
/// rebuild logic.
#[derive(Debug)]
pub struct TwitterApiClient {
    client: Client,
    base_url: String,
    oauth_signer: OAuthSigner,
}

impl TwitterApiClient {
    /// Create a new API client from configuration.
    pub fn new(config: &TwitterConfig) -> TwitterResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!(
                "twitter-connector/{}",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            oauth_signer: OAuthSigner::new(config),
        })
    }

    /// Make an authenticated GET request with query parameters.
    #[instrument(skip(self, params))]
    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> TwitterResult<T> {
        self.request("GET", endpoint, None::<&()>, params).await
    }

    /// Make an authenticated POST request with a JSON body.
    #[instrument(skip(self, body))]
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> TwitterResult<T> {
        self.request("POST", endpoint, Some(body), &[]).await
    }

    async fn request<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        method: &str,
        endpoint: &str,
        body: Option<&B>,
        params: &[(String, String)],
    ) -> TwitterResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!(method, endpoint, "Making Twitter API request");

        // Build the full URL with query params for the actual request;
        // the signature covers the bare URL plus the params.
        let full_url = if params.is_empty() {
            url.clone()
        } else {
            let query = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            format!("{}?{}", url, query)
        };

        let auth_header = self.oauth_signer.sign(method, &url, params)?;

        let mut req = match method {
            "POST" => self.client.post(&url),
            _ => self.client.get(&full_url),
        };

        req = req.header("Authorization", &auth_header);

        if let Some(b) = body {
            req = req.json(b);
        }

        let response = req.send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> TwitterResult<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            serde_json::from_slice(&bytes).map_err(TwitterError::from)
        } else {
            Err(TwitterError::Api {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            })
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // User endpoints
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the authenticated user.
    pub async fn get_me(&self) -> TwitterResult<TwitterResponse<User>> {
        self.get_with_params("/2/users/me", &[]).await
    }

    /// Get a user by username.
    pub async fn get_user_by_username(
        &self,
        username: &str,
    ) -> TwitterResult<TwitterResponse<User>> {
        self.get_with_params(&format!("/2/users/by/username/{}", username), &[])
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tweet endpoints
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a user's recent tweets, excluding retweets and replies.
    ///
    /// `max_results` is capped at the endpoint limit of 100.
    pub async fn get_user_tweets(
        &self,
        user_id: &str,
        max_results: u32,
    ) -> TwitterResult<TwitterResponse<Vec<Tweet>>> {
        let params = vec![
            (
                "tweet.fields".to_string(),
                "created_at,public_metrics,text".to_string(),
            ),
            (
                "max_results".to_string(),
                max_results.min(MAX_RESULTS_CAP).to_string(),
            ),
            ("exclude".to_string(), "retweets,replies".to_string()),
        ];

        self.get_with_params(&format!("/2/users/{}/tweets", user_id), &params)
            .await
    }

    /// Create a new tweet.
    pub async fn create_tweet(
        &self,
        request: &CreateTweetRequest,
    ) -> TwitterResult<CreateTweetResponse> {
        self.post("/2/tweets", request).await
    }

    /// Get the user's home timeline with author expansions.
    pub async fn get_home_timeline(
        &self,
        user_id: &str,
        max_results: u32,
    ) -> TwitterResult<TwitterResponse<Vec<Tweet>>> {
        let params = vec![
            (
                "tweet.fields".to_string(),
                "created_at,author_id,attachments".to_string(),
            ),
            ("expansions".to_string(), "author_id".to_string()),
            ("user.fields".to_string(), "name,username".to_string()),
            ("max_results".to_string(), max_results.to_string()),
        ];

        self.get_with_params(
            &format!("/2/users/{}/timelines/reverse_chronological", user_id),
            &params,
        )
        .await
    }

    /// Like a tweet on behalf of the given user.
    pub async fn like_tweet(
        &self,
        user_id: &str,
        tweet_id: &str,
    ) -> TwitterResult<LikeTweetResponse> {
        let request = LikeTweetRequest {
            tweet_id: tweet_id.to_string(),
        };
        self.post(&format!("/2/users/{}/likes", user_id), &request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header_exists, method, path, query_param},
    };

    /// Create a test config pointing to the mock server.
    fn test_config(mock_server: &MockServer) -> TwitterConfig {
        TwitterConfig {
            consumer_key: "test_consumer_key".into(),
            consumer_secret: "test_consumer_secret".into(),
            access_token: "test_access_token".into(),
            access_token_secret: "test_access_token_secret".into(),
            user_id: Some("123456789".into()),
            ..Default::default()
        }
        .with_api_url(mock_server.uri())
    }

    #[tokio::test]
    async fn test_get_me_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/2/users/me"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "id": "123456789",
                    "name": "Test User",
                    "username": "testuser"
                }
            })))
            .mount(&mock_server)
            .await;

        let config = test_config(&mock_server);
        let client = TwitterApiClient::new(&config).unwrap();

        let response = client.get_me().await.unwrap();
        let user = response.data.unwrap();
        assert_eq!(user.id, "123456789");
        assert_eq!(user.username, "testuser");
    }

    #[tokio::test]
    async fn test_get_user_by_username() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/2/users/by/username/testuser"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "id": "42",
                    "name": "Test User",
                    "username": "testuser"
                }
            })))
            .mount(&mock_server)
            .await;

        let config = test_config(&mock_server);
        let client = TwitterApiClient::new(&config).unwrap();

        let response = client.get_user_by_username("testuser").await.unwrap();
        assert_eq!(response.data.unwrap().id, "42");
    }

    #[tokio::test]
    async fn test_create_tweet_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": {
                    "id": "1234567890",
                    "text": "Hello, Twitter!"
                }
            })))
            .mount(&mock_server)
            .await;

        let config = test_config(&mock_server);
        let client = TwitterApiClient::new(&config).unwrap();

        let request = CreateTweetRequest {
            text: "Hello, Twitter!".into(),
        };

        let response = client.create_tweet(&request).await.unwrap();
        assert_eq!(response.data.id, "1234567890");
        assert_eq!(response.data.text, "Hello, Twitter!");
    }

    #[tokio::test]
    async fn test_user_tweets_caps_max_results() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/2/users/42/tweets"))
            .and(query_param("max_results", "100"))
            .and(query_param("exclude", "retweets,replies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    { "id": "1", "text": "first" }
                ],
                "meta": { "result_count": 1 }
            })))
            .mount(&mock_server)
            .await;

        let config = test_config(&mock_server);
        let client = TwitterApiClient::new(&config).unwrap();

        // Requesting 500 must be clamped to the endpoint limit.
        let response = client.get_user_tweets("42", 500).await.unwrap();
        assert_eq!(response.data.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_like_tweet_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/users/123456789/likes"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "liked": true }
            })))
            .mount(&mock_server)
            .await;

        let config = test_config(&mock_server);
        let client = TwitterApiClient::new(&config).unwrap();

        let response = client.like_tweet("123456789", "111").await.unwrap();
        assert!(response.data.liked);
    }

    #[tokio::test]
    async fn test_error_carries_status_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/2/users/me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "title": "Unauthorized",
                "detail": "Unauthorized",
                "type": "about:blank",
                "status": 401
            })))
            .mount(&mock_server)
            .await;

        let config = test_config(&mock_server);
        let client = TwitterApiClient::new(&config).unwrap();

        let result = client.get_me().await;
        assert!(result.is_err());
        let err = result.unwrap_err();
        match err {
            TwitterError::Api { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Unauthorized"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
