// ABOUTME: Dreamy server binary: serves the JSON API or mints development tokens
// ABOUTME: Configuration comes from the environment with command-line overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

//! # Dreamy Server Binary
//!
//! ```bash
//! dreamy-server serve --port 8081
//! dreamy-server dev-token --user 6f1c...  # bearer token for local testing
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use clap::{Parser, Subcommand};
use dreamy::auth::AuthManager;
use dreamy::config::ServerConfig;
use dreamy::logging;
use dreamy::resources::ServerResources;
use dreamy::server;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "dreamy-server")]
#[command(about = "Dreamy - running analytics with Strava sync")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Override DREAMY_HTTP_PORT
        #[arg(long)]
        port: Option<u16>,
        /// Override DREAMY_HOST
        #[arg(long)]
        host: Option<String>,
    },
    /// Print a bearer token signed with DREAMY_JWT_SECRET
    DevToken {
        /// User id to embed; a random one when omitted
        #[arg(long)]
        user: Option<Uuid>,
        /// Token lifetime in hours
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command.unwrap_or(Command::Serve {
        port: None,
        host: None,
    }) {
        Command::Serve { port, host } => {
            logging::init_from_env()?;
            let mut config = ServerConfig::from_env().context("Failed to load configuration")?;
            if let Some(port) = port {
                config.http_port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            serve(config).await
        }
        Command::DevToken { user, hours } => {
            let config = ServerConfig::from_env().context("Failed to load configuration")?;
            dev_token(&config, user, hours)
        }
    }
}

async fn serve(config: ServerConfig) -> Result<()> {
    info!("Starting Dreamy server");
    info!("{}", config.summary());

    let resources = Arc::new(
        ServerResources::from_config(config)
            .await
            .context("Failed to initialize server resources")?,
    );

    if let Err(e) = server::run(resources).await {
        error!("Server error: {e}");
        return Err(e.into());
    }
    Ok(())
}

fn dev_token(config: &ServerConfig, user: Option<Uuid>, hours: i64) -> Result<()> {
    let secret = config
        .jwt_secret
        .as_deref()
        .context("DREAMY_JWT_SECRET must be set to mint a token the server will accept")?;
    let user_id = user.unwrap_or_else(Uuid::new_v4);
    let token = AuthManager::new(secret.as_bytes(), hours)
        .issue_token_with_expiry(user_id, Duration::hours(hours))?;
    println!("user_id: {user_id}");
    println!("token:   {token}");
    Ok(())
}
