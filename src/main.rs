//! gem-tenders main entry point
//!
//! This is the command-line interface for the GeM tender-listing harvester.

use anyhow::Context;
use clap::Parser;
use gem_tenders::config::{load_config_with_hash, Config};
use gem_tenders::driver::{ChromiumFactory, SnapshotFactory};
use gem_tenders::output::{print_run, print_summary, RunSummary, FORWARD_CSV_NAME};
use gem_tenders::service::{DriverFactory, ScrapeService};
use gem_tenders::state::Direction;
use gem_tenders::storage::{SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// gem-tenders: harvests the GeM "all bids" listing
///
/// Walks the paginated listing in a browser session, extracts every tender
/// card and writes the records to a CSV file, reconciling the count against
/// the total the site advertises.
#[derive(Parser, Debug)]
#[command(name = "gem-tenders")]
#[command(version = "1.0.0")]
#[command(about = "Paginated GeM tender-listing harvester", long_about = None)]
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

    /// Jump to the last page and walk backward
    #[arg(long)]
    reverse: bool,

    /// Lowest page a backward walk extracts (overrides the config)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    stop_page: Option<u32>,

    /// Replay saved listing pages (DIR/page-1.html, page-2.html, ...) instead of launching a browser
    #[arg(long, value_name = "DIR")]
    replay: Option<PathBuf>,

    /// Validate config and show what would be harvested without running
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show the latest stored run from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.reverse {
        config.traversal.direction = Direction::Backward;
    }
    if let Some(stop_page) = cli.stop_page {
        config.traversal.stop_page = stop_page;
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, cli.replay.as_deref());
        return Ok(());
    }
    if cli.stats {
        return handle_stats(&config);
    }

    let summary = match cli.replay {
        Some(dir) => {
            tracing::info!("Replaying snapshots from {}", dir.display());
            handle_run(SnapshotFactory::from_dir(dir), config, config_hash).await?
        }
        None => {
            let factory = ChromiumFactory::new(config.browser.clone(), &config.timing);
            handle_run(factory, config, config_hash).await?
        }
    };

    if !cli.quiet {
        println!();
        print_summary(&summary);
    }
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gem_tenders=info,warn"),
            1 => EnvFilter::new("gem_tenders=debug,info"),
            2 => EnvFilter::new("gem_tenders=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config, replay: Option<&Path>) {
    println!("=== gem-tenders Dry Run ===\n");

    println!("Site:");
    println!("  Listing URL: {}", config.listing_url());

    println!("\nTraversal:");
    println!("  Direction: {}", config.traversal.direction);
    if config.traversal.direction == Direction::Backward {
        println!("  Stop page: {}", config.traversal.stop_page);
    }
    println!("  Apply sort: {}", config.traversal.apply_sort);

    println!("\nTiming:");
    match &config.timing.settle_selector {
        Some(selector) => println!(
            "  Settle: until '{}' (max {}ms)",
            selector, config.timing.settle_ms
        ),
        None => println!("  Settle: {}ms", config.timing.settle_ms),
    }
    println!("  Sort menu delay: {}ms", config.timing.sort_menu_ms);
    println!(
        "  Scrolling: {} steps of {}px",
        config.timing.scroll_steps, config.timing.scroll_distance
    );

    println!("\nDriver:");
    match replay {
        Some(dir) => println!("  Snapshot replay from {}", dir.display()),
        None => {
            println!("  Chromium (headless: {})", config.browser.headless);
            if let Some(executable) = &config.browser.executable {
                println!("  Executable: {}", executable.display());
            }
        }
    }

    println!("\nOutput:");
    let csv_name = match (&config.output.csv_name, config.traversal.direction) {
        (Some(name), _) => name.clone(),
        (None, Direction::Forward) => FORWARD_CSV_NAME.to_string(),
        (None, Direction::Backward) => format!(
            "gem_reverse_<last page>_to_{}.csv",
            config.traversal.stop_page
        ),
    };
    println!(
        "  CSV: {}",
        Path::new(&config.output.directory).join(csv_name).display()
    );
    println!(
        "  Database: {}",
        config.output.database_path.as_deref().unwrap_or("(disabled)")
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows the latest stored run
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let database_path = config
        .output
        .database_path
        .as_deref()
        .context("No database-path configured in [output]")?;

    println!("Database: {}\n", database_path);

    let storage = SqliteStorage::new(Path::new(database_path))?;
    match storage.get_latest_run()? {
        Some(run) => {
            let stored = storage.count_records(run.id)?;
            print_run(&run, stored);
        }
        None => println!("No runs recorded yet"),
    }

    Ok(())
}

/// Handles the main harvest: one run through the background service
async fn handle_run<F: DriverFactory>(
    factory: F,
    config: Config,
    config_hash: String,
) -> anyhow::Result<RunSummary> {
    let service = ScrapeService::new(factory, config, config_hash);
    service.start();

    match service.wait().await {
        Some(Ok(summary)) => {
            tracing::info!("Run finished: {}", summary.termination);
            Ok(summary)
        }
        Some(Err(e)) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
        None => anyhow::bail!("Run was not started"),
    }
}
