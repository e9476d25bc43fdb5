//! CLI commands

use anyhow::{Context, Result, bail};
use assetdesk_client::types::LoginRequest;
use assetdesk_client::{ApiClient, RequestDescriptor};
use clap::Subcommand;
use serde_json::Value;
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the access token
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long, env = "ASSETDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored access token
    Logout,

    /// Show the signed in user
    Me,

    /// Exchange the refresh cookie for a new access token
    Refresh,

    /// GET an API path and print the JSON response
    Get {
        /// Path relative to the base URL, e.g. /assets
        path: String,

        /// Query parameters as key=value
        #[arg(short, long = "query", value_parser = parse_query_pair)]
        query: Vec<(String, String)>,
    },

    /// Ask a natural language question about the inventory
    Chat {
        /// The question
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
}

impl Commands {
    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::Login { email, password } => {
                let user = client
                    .login(&LoginRequest { email, password })
                    .await
                    .context("login failed")?;
                let name = user.name.as_deref().or(user.email.as_deref()).unwrap_or("user");
                println!("Signed in as {name}");
                Ok(())
            }
            Self::Logout => {
                client.logout().await.context("logout failed")?;
                println!("Signed out");
                Ok(())
            }
            Self::Me => {
                let me = client.me().await.context("could not fetch profile")?;
                print_json(&serde_json::to_value(me)?)
            }
            Self::Refresh => {
                client.refresh_token().await.context("token refresh failed")?;
                println!("Access token refreshed");
                Ok(())
            }
            Self::Get { path, query } => {
                info!(path = %path, "fetching");
                let response = client
                    .request(RequestDescriptor::get(path).query_pairs(query))
                    .await?;
                let body: Value = response.json()?;
                print_json(&body)
            }
            Self::Chat { message } => {
                let answer = client.chat_query(&message.join(" ")).await?;
                if let Some(summary) = answer.data.get("summary").and_then(Value::as_str) {
                    println!("{summary}");
                }
                print_json(&answer.data)
            }
        }
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_query_pair(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("expected key=value, got '{raw}'");
    };
    if key.is_empty() {
        bail!("query parameter name is empty in '{raw}'");
    }
    Ok((key.to_string(), value.to_string()))
}
