//! Folio daemon - operator entry point for the content gateway
//!
//! Loads and validates the gateway configuration and exposes the core
//! operations for inspection:
//! - configuration checks
//! - public id encoding and decoding
//! - author merge lookups
//! - single page requests against the configured store

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use folio_gateway::config::StorageConfig;
use folio_gateway::{open_store, telemetry, ContentService, GatewayConfig, GatewayContext};
use folio_ids::IdNamespace;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Folio daemon CLI
#[derive(Parser)]
#[command(name = "foliod")]
#[command(about = "Folio - read-side content gateway", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "FOLIO_CONFIG")]
    config: Option<String>,

    /// MySQL connection URL; selects the mysql store
    #[arg(long, env = "FOLIO_DATABASE_URL")]
    database_url: Option<String>,

    /// Author merge file
    #[arg(long, env = "FOLIO_MERGE_FILE")]
    merge_file: Option<String>,

    /// Log level
    #[arg(long, env = "FOLIO_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "FOLIO_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load and validate configuration, then print a summary
    Check,

    /// Encode a raw key as a public id
    Encode { namespace: IdNamespace, value: u64 },

    /// Decode a public id back to its raw key
    Decode { namespace: IdNamespace, id: String },

    /// Show the canonical author and sibling accounts for a raw author id
    Related { raw_id: u64 },

    /// Request one page of articles
    Page {
        /// Taxonomy key to list (repeatable)
        #[arg(long = "tag", required = true)]
        tags: Vec<u64>,

        /// Page size
        #[arg(long)]
        take: Option<usize>,

        /// Cursor from a previous page
        #[arg(long)]
        cursor: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        GatewayConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    // Override with CLI args
    if let Some(url) = cli.database_url {
        config.storage = match config.storage {
            StorageConfig::Mysql {
                max_connections,
                connect_timeout_secs,
                ..
            } => StorageConfig::Mysql {
                url,
                max_connections,
                connect_timeout_secs,
            },
            StorageConfig::Memory => StorageConfig::Mysql {
                url,
                max_connections: 10,
                connect_timeout_secs: 5,
            },
        };
    }
    if let Some(merge_file) = cli.merge_file {
        config.identity.merge_file = merge_file;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json {
        config.logging.json = true;
    }

    telemetry::init_tracing(&config.logging)?;

    let context = Arc::new(GatewayContext::from_config(&config)?);

    match cli.command {
        Command::Check => {
            let storage = match &config.storage {
                StorageConfig::Memory => "memory",
                StorageConfig::Mysql { .. } => "mysql",
            };
            println!("configuration ok");
            println!("  port:          {}", config.server.port);
            println!("  storage:       {storage}");
            println!("  upstream:      {}", config.upstream.url);
            println!("  merge groups:  {}", context.merges.len());
            println!("  categories:    {}", context.categories.len());
            println!(
                "  page size:     {} (max {})",
                context.default_page_size, context.max_page_size
            );
        }
        Command::Encode { namespace, value } => {
            println!("{}", context.ids.encode(namespace, value));
        }
        Command::Decode { namespace, id } => {
            println!("{}", context.ids.decode(namespace, &id)?);
        }
        Command::Related { raw_id } => {
            let related = context.merges.related_ids(raw_id);
            println!("{}", serde_json::to_string_pretty(&related)?);
        }
        Command::Page { tags, take, cursor } => {
            let store = open_store(&config.storage).await?;
            let service = ContentService::new(store, Arc::clone(&context));
            let tags: BTreeSet<u64> = tags.into_iter().collect();
            let edge = service
                .articles_page(&tags, take, cursor.as_deref())
                .await?;
            info!(
                nodes = edge.nodes.len(),
                has_next_page = edge.has_next_page,
                "page served"
            );
            println!("{}", serde_json::to_string_pretty(&edge)?);
        }
    }

    Ok(())
}
