//! Topic-Sieve main entry point
//!
//! This is the command-line interface for the Topic-Sieve crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use topic_sieve::config::{load_config_with_hash, validate, Config};
use topic_sieve::crawler::Crawler;
use topic_sieve::output::print_report;
use tracing_subscriber::EnvFilter;

/// Topic-Sieve: a same-site crawler that keeps only on-topic pages
///
/// Topic-Sieve crawls one web site breadth-first from a seed URL, asks a
/// classification agent whether each page is about the configured topic,
/// and stores the text of relevant pages exactly once.
#[derive(Parser, Debug)]
#[command(name = "topic-sieve")]
#[command(version)]
#[command(about = "A same-site crawler that keeps only on-topic pages", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Override the page budget from the configuration
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => (cfg, hash),
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).with_context(|| format!("loading {}", cli.config.display()));
        }
    };
    tracing::info!(hash = %config_hash, "Configuration loaded");

    if let Some(max_pages) = cli.max_pages {
        config.crawl.max_pages = max_pages;
        validate(&config).context("invalid --max-pages override")?;
    }

    if cli.dry_run {
        print_plan(&config);
        return Ok(());
    }

    handle_crawl(&config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("topic_sieve=info,warn"),
            1 => EnvFilter::new("topic_sieve=debug,info"),
            2 => EnvFilter::new("topic_sieve=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be crawled
fn print_plan(config: &Config) {
    println!("=== Topic-Sieve Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed: {}", config.crawl.seed_url);
    println!("  Max pages: {}", config.crawl.max_pages);
    println!("  Politeness delay: {}ms", config.crawl.politeness_delay_ms);
    println!("  Workers: {}", config.crawl.workers);
    match config.crawl.max_run_seconds {
        Some(secs) => println!("  Run deadline: {}s", secs),
        None => println!("  Run deadline: none"),
    }

    println!("\nRequests:");
    println!("  User agent: {}", config.request.user_agent);
    println!("  Timeout: {}ms", config.request.timeout_ms);
    for (name, value) in &config.request.headers {
        println!("  Header {}: {}", name, value);
    }

    println!("\nStore:");
    println!("  Backend: {:?}", config.store.backend);
    println!("  Location: {}", config.store.location);
    println!("  Prefix: {}", config.store.prefix);

    println!("\nClassifier:");
    println!("  Endpoint: {}", config.classifier.endpoint);
    println!("  Agent: {}", config.classifier.agent_id);
    println!("  Region: {}", config.classifier.region);
    println!("  Topic: {}", config.classifier.topic);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    let crawler = Crawler::from_config(config).context("failed to start crawler")?;

    let stop = crawler.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            stop.stop();
        }
    });

    let report = crawler.run().await;
    print_report(&report);

    Ok(())
}
