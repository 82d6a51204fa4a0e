//! Twitter/X Connection Adapter
//!
//! A thin client for the Twitter API v2 using OAuth 1.0a user-context
//! authentication.
//!
//! The adapter exposes a fixed set of named actions, each mapping to a
//! single REST call:
//!
//! - `get-latest-tweets` - Fetch a user's recent tweets with metrics
//! - `post-tweet` - Publish a tweet (280 character limit enforced locally)
//! - `read-timeline` - Read the home timeline with author info joined in
//! - `like-tweet` - Like a tweet on behalf of the stored user
//!
//! First-time setup runs the interactive OAuth 1.0a three-legged
//! handshake and persists the resulting credentials to a `.env` file.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod client;
mod config;
mod connection;
mod error;
mod oauth;
mod setup;
mod store;
mod types;

pub use client::TwitterApiClient;
pub use config::TwitterConfig;
pub use connection::{Action, ActionDescriptor, TwitterConnection};
pub use error::{TwitterError, TwitterResult};
pub use oauth::{OAuth1Handshake, OAuthSigner, OAuth1Tokens, RequestToken};
pub use setup::run_setup;
pub use store::CredentialStore;
