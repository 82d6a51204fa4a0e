//! OAuth 1.0a signing and the three-legged handshake.
//!
//! Twitter requires OAuth 1.0a signatures for user-context requests.
//! This module generates authorization headers for signed API calls and
//! implements the request-token / authorize / access-token exchange used
//! by the interactive setup flow.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use rand::RngCore;
use reqwest::Client;
use sha1::Sha1;

use crate::config::TwitterConfig;
use crate::error::{TwitterError, TwitterResult};

/// Characters that must be percent-encoded in OAuth signatures.
/// RFC 3986 unreserved characters: ALPHA / DIGIT / "-" / "." / "_" / "~"
const OAUTH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// OAuth 1.0a signer for Twitter API requests.
///
/// The resource-owner token is optional so the same signer covers both
/// authenticated API calls and the token-less request-token step of the
/// handshake.
#[derive(Debug, Clone)]
pub struct OAuthSigner {
    consumer_key: String,
    consumer_secret: String,
    token: Option<String>,
    token_secret: Option<String>,
}

impl OAuthSigner {
    /// Create a signer carrying the stored access token.
    #[must_use]
    pub fn new(config: &TwitterConfig) -> Self {
        Self {
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
            token: Some(config.access_token.clone()),
            token_secret: Some(config.access_token_secret.clone()),
        }
    }

    /// Create a signer with consumer credentials only (handshake step 1).
    #[must_use]
    pub fn for_handshake(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: None,
            token_secret: None,
        }
    }

    /// Attach a resource-owner token (handshake step 3 signs with the
    /// temporary request token).
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, token_secret: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self.token_secret = Some(token_secret.into());
        self
    }

    /// Generate the OAuth 1.0a Authorization header value.
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, etc.)
    /// * `url` - Full URL without query parameters
    /// * `params` - Query/body parameters plus any extra `oauth_*`
    ///   protocol parameters (callback, verifier); `oauth_*` entries are
    ///   emitted in the header as well as the signature
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
    ) -> TwitterResult<String> {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| TwitterError::OAuth(format!("failed to get timestamp: {e}")))?
            .as_secs()
            .to_string();

        let nonce = generate_nonce();

        let mut oauth_params = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce),
            (
                "oauth_signature_method".to_string(),
                "HMAC-SHA1".to_string(),
            ),
            ("oauth_timestamp".to_string(), timestamp),
            ("oauth_version".to_string(), "1.0".to_string()),
        ];
        if let Some(token) = &self.token {
            oauth_params.push(("oauth_token".to_string(), token.clone()));
        }
        for (k, v) in params {
            if k.starts_with("oauth_") {
                oauth_params.push((k.clone(), v.clone()));
            }
        }

        // Combine OAuth params with request params for signing
        let mut all_params = oauth_params.clone();
        all_params.extend(
            params
                .iter()
                .filter(|(k, _)| !k.starts_with("oauth_"))
                .cloned(),
        );

        all_params.sort_by(|a, b| {
            if a.0 == b.0 {
                a.1.cmp(&b.1)
            } else {
                a.0.cmp(&b.0)
            }
        });

        let param_string = all_params
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            percent_encode(url),
            percent_encode(&param_string)
        );

        let signing_key = format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(self.token_secret.as_deref().unwrap_or(""))
        );

        let signature = hmac_sha1(&signing_key, &base_string)?;
        oauth_params.push(("oauth_signature".to_string(), signature));

        let header = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {header}"))
    }
}

/// Temporary token from the request-token step.
#[derive(Debug, Clone)]
pub struct RequestToken {
    /// OAuth token.
    pub token: String,
    /// OAuth token secret.
    pub token_secret: String,
    /// Whether the callback was confirmed.
    pub callback_confirmed: bool,
}

/// Long-lived tokens from the access-token step.
#[derive(Debug, Clone)]
pub struct OAuth1Tokens {
    /// OAuth access token.
    pub token: String,
    /// OAuth access token secret.
    pub token_secret: String,
    /// Numeric user id (if the provider returned one).
    pub user_id: Option<String>,
    /// Screen name (if the provider returned one).
    pub screen_name: Option<String>,
}

/// Client for the OAuth 1.0a three-legged handshake.
#[derive(Debug, Clone)]
pub struct OAuth1Handshake {
    consumer_key: String,
    consumer_secret: String,
    base_url: String,
    http_client: Client,
}

impl OAuth1Handshake {
    /// Create a handshake client from consumer credentials.
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> TwitterResult<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            base_url: "https://api.twitter.com".into(),
            http_client,
        })
    }

    /// Set a custom base URL (for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Step 1: exchange consumer credentials for a temporary request
    /// token. Uses out-of-band (PIN) callback and requests write access.
    pub async fn request_token(&self) -> TwitterResult<RequestToken> {
        let url = format!("{}/oauth/request_token", self.base_url);
        let signer = OAuthSigner::for_handshake(&self.consumer_key, &self.consumer_secret);

        let params = vec![
            ("oauth_callback".to_string(), "oob".to_string()),
            ("x_auth_access_type".to_string(), "write".to_string()),
        ];
        let auth_header = signer.sign("POST", &url, &params)?;

        let response = self
            .http_client
            .post(&url)
            .query(&[("x_auth_access_type", "write")])
            .header("Authorization", auth_header)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TwitterError::OAuth(format!(
                "request token rejected: {} {body}",
                status.as_u16()
            )));
        }

        parse_request_token(&body)
    }

    /// Step 2: the URL the user must visit to authorize the application.
    #[must_use]
    pub fn authorization_url(&self, request_token: &RequestToken) -> String {
        format!(
            "{}/oauth/authorize?oauth_token={}",
            self.base_url, request_token.token
        )
    }

    /// Step 3: exchange the request token plus the user-entered verifier
    /// for a permanent access token.
    pub async fn access_token(
        &self,
        request_token: &RequestToken,
        verifier: &str,
    ) -> TwitterResult<OAuth1Tokens> {
        let url = format!("{}/oauth/access_token", self.base_url);
        let signer = OAuthSigner::for_handshake(&self.consumer_key, &self.consumer_secret)
            .with_token(&request_token.token, &request_token.token_secret);

        let params = vec![("oauth_verifier".to_string(), verifier.to_string())];
        let auth_header = signer.sign("POST", &url, &params)?;

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", auth_header)
            .form(&[("oauth_verifier", verifier)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TwitterError::OAuth(format!(
                "access token exchange failed: {} {body}",
                status.as_u16()
            )));
        }

        parse_access_token(&body)
    }
}

/// Parse a request-token response body (form-encoded).
fn parse_request_token(body: &str) -> TwitterResult<RequestToken> {
    let params: std::collections::HashMap<String, String> = serde_urlencoded::from_str(body)
        .map_err(|e| TwitterError::OAuth(format!("invalid token response: {e}")))?;

    let token = params
        .get("oauth_token")
        .ok_or_else(|| TwitterError::OAuth("missing oauth_token".into()))?
        .clone();
    let token_secret = params
        .get("oauth_token_secret")
        .ok_or_else(|| TwitterError::OAuth("missing oauth_token_secret".into()))?
        .clone();
    let callback_confirmed = params
        .get("oauth_callback_confirmed")
        .is_some_and(|v| v == "true");

    Ok(RequestToken {
        token,
        token_secret,
        callback_confirmed,
    })
}

/// Parse an access-token response body (form-encoded).
fn parse_access_token(body: &str) -> TwitterResult<OAuth1Tokens> {
    let params: std::collections::HashMap<String, String> = serde_urlencoded::from_str(body)
        .map_err(|e| TwitterError::OAuth(format!("invalid token response: {e}")))?;

    let token = params
        .get("oauth_token")
        .ok_or_else(|| TwitterError::OAuth("missing oauth_token".into()))?
        .clone();
    let token_secret = params
        .get("oauth_token_secret")
        .ok_or_else(|| TwitterError::OAuth("missing oauth_token_secret".into()))?
        .clone();

    Ok(OAuth1Tokens {
        token,
        token_secret,
        user_id: params.get("user_id").cloned(),
        screen_name: params.get("screen_name").cloned(),
    })
}

/// Percent-encode a string according to RFC 3986.
fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

/// Generate a random nonce for OAuth.
fn generate_nonce() -> String {
    let mut rng = rand::thread_rng();
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Compute HMAC-SHA1 and return base64-encoded result.
fn hmac_sha1(key: &str, data: &str) -> TwitterResult<String> {
    type HmacSha1 = Hmac<Sha1>;

    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| TwitterError::OAuth(e.to_string()))?;

    mac.update(data.as_bytes());
    let result = mac.finalize();
    Ok(BASE64.encode(result.into_bytes()))
}
