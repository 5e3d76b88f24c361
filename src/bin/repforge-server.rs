// ABOUTME: Repforge API server binary
// ABOUTME: Loads configuration, opens the database, and serves HTTP until shutdown
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Repforge Server Binary
//!
//! ```bash
//! # Serve with settings from the environment or .env
//! cargo run --bin repforge-server
//!
//! # Override the port and database
//! cargo run --bin repforge-server -- --http-port 9000 --database-url sqlite:./data/dev.db
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use repforge_server::config::ServerConfig;
use repforge_server::logging;
use repforge_server::resources::ServerResources;
use repforge_server::server::RepforgeServer;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "repforge-server")]
#[command(about = "Repforge training API - workouts, completion logging, scoring, and planning")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }
    config.validate()?;

    logging::init_from_env()?;

    info!("Starting Repforge Server");
    info!("{}", config.summary());

    let port = config.http_port;
    let resources = Arc::new(ServerResources::from_config(config).await?);
    info!("Database initialized");

    if let Err(e) = RepforgeServer::new(resources).run(port).await {
        error!("Server error: {e:#}");
        return Err(e);
    }
    Ok(())
}
