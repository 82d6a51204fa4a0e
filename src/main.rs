//! Twitter connection adapter CLI entrypoint.
//!
//! - `twitter-connector configure` - interactive OAuth 1.0a setup
//! - `twitter-connector status` - check stored credentials against the API
//! - `twitter-connector actions` - list the action registry
//! - `twitter-connector action <name> [key=value...]` - perform an action

#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use twitter_connector::{run_setup, CredentialStore, TwitterConnection};

/// Twitter/X API connection adapter.
#[derive(Parser)]
#[command(name = "twitter-connector")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path of the credential store file.
    #[arg(long, default_value = ".env", global = true)]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive OAuth 1.0a setup flow.
    ///
    /// Performs the three-legged handshake (request token, PIN
    /// authorization, access token) and persists the credentials.
    Configure,

    /// Check whether stored credentials are present and valid.
    Status,

    /// List the registered actions and their parameters.
    Actions,

    /// Perform a named action with key=value arguments.
    ///
    /// Example: twitter-connector action get-latest-tweets username=jack count=5
    Action {
        /// Action name (e.g. post-tweet).
        name: String,

        /// Arguments as key=value pairs.
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging.
    // Write logs to stderr so stdout is clean for JSON output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let store = CredentialStore::new(&cli.env_file);
    let connection = TwitterConnection::new(store);

    match cli.command {
        Commands::Configure => {
            run_setup(&connection).await?;
        }
        Commands::Status => {
            if connection.is_configured(true).await {
                println!("Twitter API is configured and credentials are valid.");
            } else {
                println!("Twitter API is not configured. Run `twitter-connector configure`.");
                std::process::exit(1);
            }
        }
        Commands::Actions => {
            for descriptor in connection.actions() {
                let params = descriptor
                    .params
                    .iter()
                    .map(|(name, kind)| format!("{name}: {kind}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("{} ({params})", descriptor.name);
            }
        }
        Commands::Action { name, args } => {
            let args = parse_action_args(&args)?;
            let result = connection.perform_action(&name, &args).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

/// Parse key=value argument pairs into a JSON object. Integer and
/// boolean values are coerced; everything else stays a string.
fn parse_action_args(pairs: &[String]) -> Result<Value> {
    let mut object = Map::new();

    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("invalid argument '{pair}', expected key=value"))?;

        let value = if let Ok(n) = value.parse::<u64>() {
            Value::from(n)
        } else if let Ok(b) = value.parse::<bool>() {
            Value::from(b)
        } else {
            Value::from(value)
        };

        object.insert(key.to_string(), value);
    }

    Ok(Value::Object(object))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_action_args() {
        let args = parse_action_args(&[
            "username=jack".to_string(),
            "count=5".to_string(),
            "verbose=true".to_string(),
        ])
        .unwrap();

        assert_eq!(args["username"], "jack");
        assert_eq!(args["count"], 5);
        assert_eq!(args["verbose"], true);
    }

    #[test]
    fn rejects_malformed_pair() {
        assert!(parse_action_args(&["nonsense".to_string()]).is_err());
    }
}
