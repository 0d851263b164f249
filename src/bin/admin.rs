//! CLI administration tool for shortlink.
//!
//! Creates links and inspects statistics directly through the service
//! layer, without requiring the HTTP API to be running.
//!
//! # Usage
//!
//! ```bash
//! # Create a short link
//! cargo run --bin admin -- link create "https://example.com/some/path"
//!
//! # Prompt for the URL interactively
//! cargo run --bin admin -- link create
//!
//! # View statistics for a code
//! cargo run --bin admin -- link stats abc123
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use shortlink::application::services::LinkService;
use shortlink::infrastructure::persistence::PgLinkRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage short links
    Link {
        #[command(subcommand)]
        command: LinkCommands,
    },
    /// Database tools
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand)]
enum LinkCommands {
    /// Create a short link
    Create {
        /// The URL to shorten (prompted for when omitted)
        long_url: Option<String>,
    },
    /// Show click statistics for a short code
    Stats {
        /// The short code to inspect
        code: String,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Verify database connectivity
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Link { command } => {
            let service = LinkService::new(Arc::new(PgLinkRepository::new(Arc::new(pool))));

            match command {
                LinkCommands::Create { long_url } => create_link(&service, long_url).await,
                LinkCommands::Stats { code } => show_stats(&service, &code).await,
            }
        }
        Commands::Db { command } => match command {
            DbCommands::Check => check_database(&pool).await,
        },
    }
}

async fn create_link(service: &LinkService<PgLinkRepository>, long_url: Option<String>) -> Result<()> {
    let long_url = match long_url {
        Some(url) => url,
        None => Input::<String>::new()
            .with_prompt("URL to shorten")
            .interact_text()
            .context("Failed to read URL")?,
    };

    let link = service
        .create_link(long_url)
        .await
        .context("Failed to create link")?;

    println!("{}", "Link created".green().bold());
    println!("  Code:     {}", link.code.cyan());
    println!("  Long URL: {}", link.long_url);
    println!("  Created:  {}", link.created_at);

    Ok(())
}

async fn show_stats(service: &LinkService<PgLinkRepository>, code: &str) -> Result<()> {
    let (link, total_clicks) = service
        .get_link_stats(code)
        .await
        .context("Failed to fetch statistics")?;

    println!("{}", "Link statistics".green().bold());
    println!("  Code:         {}", link.code.cyan());
    println!("  Long URL:     {}", link.long_url);
    println!("  Created:      {}", link.created_at);
    println!("  Total clicks: {}", total_clicks.to_string().yellow());

    Ok(())
}

async fn check_database(pool: &PgPool) -> Result<()> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .context("Database check failed")?;

    println!("{}", "Database connection OK".green().bold());

    Ok(())
}
