//! Interactive first-time authentication setup.
//!
//! Walks the user through the OAuth 1.0a three-legged handshake:
//! request token, out-of-band authorization with a PIN verifier, access
//! token exchange, user-id resolution, then a single persistence step.
//! Nothing is written to the credential store until the final step, so
//! an abort leaves no partial credentials behind.

use std::io::{self, BufRead, Write};

use tracing::{info, warn};

use crate::{
    client::TwitterApiClient,
    config::TwitterConfig,
    connection::TwitterConnection,
    error::{TwitterError, TwitterResult},
    oauth::OAuth1Handshake,
    store::{
        KEY_ACCESS_TOKEN, KEY_ACCESS_TOKEN_SECRET, KEY_CONSUMER_KEY, KEY_CONSUMER_SECRET,
        KEY_USERNAME, KEY_USER_ID,
    },
};

/// Run the interactive setup flow against the adapter's credential store.
///
/// Returns `Ok(())` both on success and on explicit user abort; any
/// failure during the handshake aborts the flow with the error.
pub async fn run_setup(connection: &TwitterConnection) -> TwitterResult<()> {
    println!("\nTWITTER AUTHENTICATION SETUP");

    if connection.is_configured(false).await {
        println!("\nTwitter API is already configured.");
        let answer = prompt("Do you want to reconfigure? (y/n): ")?;
        if !answer.eq_ignore_ascii_case("y") {
            return Ok(());
        }
    }

    println!("\nTo get your Twitter API credentials:");
    println!("1. Go to https://developer.twitter.com/en/portal/dashboard");
    println!("2. Create a new project and app if you haven't already");
    println!("3. In your app settings, enable OAuth 1.0a with read and write permissions");
    println!("4. Get your API Key (consumer key) and API Key Secret (consumer secret)");

    println!("\nPlease enter your Twitter API credentials:");
    let username = prompt("Enter your Twitter username (without @): ")?;
    let consumer_key = prompt("Enter your API Key (consumer key): ")?;
    let consumer_secret = prompt("Enter your API Key Secret (consumer secret): ")?;

    println!("\nStarting OAuth authentication process...");

    let mut handshake = OAuth1Handshake::new(&consumer_key, &consumer_secret)?;
    if let Some(url) = connection.api_url() {
        handshake = handshake.with_base_url(url);
    }

    let request_token = handshake.request_token().await?;
    info!(callback_confirmed = request_token.callback_confirmed, "Obtained request token");

    println!("\n1. Please visit this URL to authorize the application:");
    println!("{}", handshake.authorization_url(&request_token));
    println!("\n2. After authorizing, Twitter will give you a PIN code.");
    let verifier = prompt("3. Please enter the PIN code here: ")?;

    let tokens = handshake.access_token(&request_token, &verifier).await?;
    info!("Obtained access token");

    // Resolve the numeric user id with the new credentials. The raw
    // username is only a last resort: id-dependent actions will fail
    // against it, so the substitution is reported loudly.
    let config = TwitterConfig {
        consumer_key: consumer_key.clone(),
        consumer_secret: consumer_secret.clone(),
        access_token: tokens.token.clone(),
        access_token_secret: tokens.token_secret.clone(),
        ..Default::default()
    };
    let config = match connection.api_url() {
        Some(url) => config.with_api_url(url),
        None => config,
    };
    let client = TwitterApiClient::new(&config)?;

    let user_id = match resolve_user_id(&client, &username).await {
        Ok(id) => id,
        Err(e) => match &tokens.user_id {
            Some(id) => {
                warn!(error = %e, "User lookup failed; using id from access token response");
                id.clone()
            }
            None => {
                warn!(error = %e, "User lookup failed; storing the raw username as the user id");
                println!("\nWARNING: could not resolve the numeric user id ({e}).");
                println!(
                    "The username will be stored in its place; timeline and like actions \
                     may fail until you reconfigure."
                );
                username.clone()
            }
        },
    };

    connection.store().set_keys(&[
        (KEY_USERNAME, username.as_str()),
        (KEY_USER_ID, user_id.as_str()),
        (KEY_CONSUMER_KEY, consumer_key.as_str()),
        (KEY_CONSUMER_SECRET, consumer_secret.as_str()),
        (KEY_ACCESS_TOKEN, tokens.token.as_str()),
        (KEY_ACCESS_TOKEN_SECRET, tokens.token_secret.as_str()),
    ])?;

    println!("\nTwitter authentication successfully set up!");
    println!(
        "Your API keys, secrets, username, and user id have been stored in {}.",
        connection.store().path().display()
    );

    Ok(())
}

async fn resolve_user_id(client: &TwitterApiClient, username: &str) -> TwitterResult<String> {
    let response = client
        .get_user_by_username(username)
        .await
        .map_err(|e| TwitterError::lookup(username, e))?;

    response.data.map(|user| user.id).ok_or_else(|| {
        TwitterError::lookup(
            username,
            TwitterError::Validation(format!("no user found for username: {username}")),
        )
    })
}

fn prompt(label: &str) -> TwitterResult<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
