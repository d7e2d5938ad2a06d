//! Handset Catalog main entry point
//!
//! This is the command-line interface for the phone specification crawler.

use anyhow::Context;
use clap::Parser;
use handset_catalog::config::{resolve_config, Config};
use handset_catalog::crawler::run_crawl;
use handset_catalog::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Handset Catalog: builds a normalized phone specification dataset
///
/// Walks a catalog source (brand list, paginated listings, detail pages),
/// maps every phone onto one canonical schema, drops duplicates and writes
/// a JSON dataset.
#[derive(Parser, Debug)]
#[command(name = "handset-catalog")]
#[command(version)]
#[command(about = "Crawl and normalize mobile device specifications", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate and print the effective configuration without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::info!("No configuration file given, using defaults"),
    }

    let (config, config_hash) = resolve_config(cli.config.as_deref(), |var| std::env::var(var).ok())
        .map_err(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            e
        })
        .context("invalid configuration")?;

    if let Some(hash) = &config_hash {
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("handset_catalog=info,warn"),
            1 => EnvFilter::new("handset_catalog=debug,info"),
            2 => EnvFilter::new("handset_catalog=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Handset Catalog Dry Run ===\n");

    println!("Source:");
    println!("  Kind: {}", config.source.kind);
    println!("  Base URL: {}", config.source.base_url);
    println!(
        "  API token: {}",
        if config.source.api_token.is_some() {
            "<redacted>"
        } else {
            "<none>"
        }
    );
    match config.source.brand_limit {
        Some(limit) => println!("  Brand limit: {}", limit),
        None => println!("  Brand limit: none"),
    }

    println!("\nCrawler:");
    println!("  Throttle: {}ms", config.crawler.throttle_ms);
    println!("  Timeout: {}s", config.crawler.timeout_secs);
    println!("  Max pages per brand: {}", config.crawler.max_pages_per_brand);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Path: {}", config.output.path);
    println!("  Flush: {:?}", config.output.flush);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} source at {}",
        config.source.kind,
        config.source.base_url
    );

    match run_crawl(config).await {
        Ok(stats) => {
            if !quiet {
                print_statistics(&stats);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e).context("crawl aborted")
        }
    }
}
