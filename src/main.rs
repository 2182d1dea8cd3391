//! Forum-Pulse main entry point
//!
//! This is the command-line interface for the Forum-Pulse sentiment
//! pipeline.

use clap::Parser;
use forum_pulse::config::{load_config_with_hash, Config};
use forum_pulse::crawler::build_fetcher;
use forum_pulse::input::resolve_threads;
use forum_pulse::pipeline::run_pipeline;
use forum_pulse::sentiment::resolve_scorer;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Forum-Pulse: a forum thread sentiment pipeline
///
/// Forum-Pulse crawls forum discussion threads page by page, extracts
/// individual posts, scores each post's sentiment, and writes a CSV of
/// scored posts plus a JSON summary per thread.
#[derive(Parser, Debug)]
#[command(name = "forum-pulse")]
#[command(version = "1.0.0")]
#[command(about = "A forum thread sentiment pipeline", long_about = None)]
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

    /// Validate config, resolve thread inputs, and show the plan without
    /// fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Input resolution is fully offline; any problem here is fatal before
    // the first network request
    let threads = match resolve_threads(&config.input) {
        Ok(threads) => threads,
        Err(e) => {
            tracing::error!("Failed to resolve thread inputs: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("Resolved {} thread(s) to crawl", threads.len());

    if cli.dry_run {
        handle_dry_run(&config, &threads);
        return Ok(());
    }

    let scorer = resolve_scorer(config.sentiment.engine);
    tracing::info!(
        "Sentiment engine: {}, fetch strategy: {:?}",
        scorer.name(),
        config.fetch.strategy
    );

    let mut fetcher = build_fetcher(&config)?;

    // Ctrl-C stops the run between threads; outputs for completed threads
    // are still written
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; finishing the current thread then stopping");
            shutdown_flag.store(true, Ordering::SeqCst);
        }
    });

    let report = run_pipeline(
        &config,
        &threads,
        scorer.as_ref(),
        fetcher.as_mut(),
        &shutdown,
    )
    .await?;

    // Failed threads do not fail the run; partial output already landed
    let failed = report.failed_urls();
    if !failed.is_empty() {
        tracing::warn!(
            "Run completed with {} of {} threads failed",
            failed.len(),
            report.threads.len()
        );
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        let default = match verbose {
            0 => "forum_pulse=info,warn",
            1 => "forum_pulse=debug,info",
            2 => "forum_pulse=trace,debug",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, threads: &[forum_pulse::input::ThreadInput]) {
    println!("=== Forum-Pulse Dry Run ===\n");

    println!("Fetch:");
    println!("  Strategy: {:?}", config.fetch.strategy);
    println!("  Max pages per thread: {}", config.fetch.max_pages);
    println!("  Max messages per thread: {}", config.fetch.max_messages);
    println!("  Empty-page budget: {}", config.fetch.max_empty_pages);
    println!("  Inter-page delay: {}ms", config.fetch.delay_ms);

    println!("\nSentiment:");
    println!("  Configured engine: {:?}", config.sentiment.engine);
    println!(
        "  Resolved engine: {}",
        resolve_scorer(config.sentiment.engine).name()
    );

    println!("\nOutput:");
    println!("  Posts CSV: {}", config.output.posts_path);
    println!("  Summary JSON: {}", config.output.summary_path);

    println!("\nThreads ({}):", threads.len());
    for thread in threads {
        match &thread.label {
            Some(label) => println!("  - {} ({})", thread.url, label),
            None => println!("  - {}", thread.url),
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} thread(s)", threads.len());
}
