// ABOUTME: Catalog seeding utility for the Repforge server
// ABOUTME: Upserts movements, equipment, workout templates, and default chat rooms
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Catalog seeder for the Repforge server.
//!
//! Usage:
//! ```bash
//! # Seed the catalog (uses DATABASE_URL from environment)
//! cargo run --bin seed-catalog
//!
//! # Override database URL
//! cargo run --bin seed-catalog -- --database-url sqlite:./data/repforge.db
//!
//! # Replace existing templates
//! cargo run --bin seed-catalog -- --force
//! ```

use std::env;

use anyhow::Result;
use clap::Parser;
use repforge_server::database::Database;
use repforge_server::seed::seed_catalog;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "seed-catalog",
    about = "Repforge catalog seeder",
    long_about = "Create the movement catalog, equipment, workout templates, and chat rooms for the Repforge apps"
)]
struct SeedArgs {
    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Replace existing templates
    #[arg(long)]
    force: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = SeedArgs::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("seed_catalog={level},repforge_server={level}")))
        .init();

    if let Err(e) = dotenvy::dotenv() {
        info!("No .env file loaded: {e}");
    }
    let database_url = args.database_url.unwrap_or_else(|| {
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./data/repforge.db".to_owned())
    });

    info!("Seeding catalog into {database_url}");
    let database = Database::new(&database_url).await?;
    let report = seed_catalog(&database, args.force).await?;

    info!("Movements upserted: {}", report.movements);
    if report.templates_skipped {
        info!("Templates already present; rerun with --force to replace them");
    } else {
        info!("Templates inserted: {}", report.templates);
    }
    info!("Chat rooms created: {}", report.chat_rooms);
    Ok(())
}
