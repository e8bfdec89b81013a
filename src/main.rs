//! Order book feed processor entry point.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use book_feed::config::Config;
use book_feed::feed::FeedProcessor;
use book_feed::metrics;

/// Order book feed processor.
#[derive(Parser, Debug)]
#[command(name = "book-feed")]
#[command(about = "Rebuild a limit order book from a CSV feed and report midquotes")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// Input CSV file (stdin when absent).
    #[arg(short = 'f', long)]
    infile: Option<PathBuf>,

    /// Output file (stdout when absent).
    #[arg(short = 'o', long)]
    outfile: Option<PathBuf>,

    /// Do not write book snapshots.
    #[arg(short = 'n', long)]
    nostate: bool,

    /// Do not write trade prints.
    #[arg(short = 't', long)]
    notrade: bool,

    /// Write a snapshot every N rows.
    #[arg(short = 'i', long)]
    snapshot_interval: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process the feed (default).
    Run,

    /// Check configuration validity.
    CheckConfig,
}

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load().context("failed to load configuration")?;

    // Initialize logging; stdout belongs to the feed output
    let filter = if args.verbose {
        EnvFilter::new("book_feed=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    // Initialize metrics
    metrics::init_metrics();

    // Override with CLI args if provided
    if args.nostate {
        config.emit_state = false;
    }
    if args.notrade {
        config.emit_trades = false;
    }
    if let Some(interval) = args.snapshot_interval {
        config.snapshot_interval = interval;
    }

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Run) | None => cmd_run(&config, args.infile, args.outfile),
    }
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("BOOK FEED - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Snapshot Interval: {} rows", config.snapshot_interval);
    println!("  Snapshots: {}", if config.emit_state { "Enabled" } else { "Disabled" });
    println!("  Trade Prints: {}", if config.emit_trades { "Enabled" } else { "Disabled" });
    println!("  Log Filter: {}", config.rust_log);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Process the whole feed.
fn cmd_run(
    config: &Config,
    infile: Option<PathBuf>,
    outfile: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    let input: Box<dyn Read> = match &infile {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let output: Box<dyn Write> = match &outfile {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    info!(
        infile = ?infile,
        outfile = ?outfile,
        snapshot_interval = config.snapshot_interval,
        emit_state = config.emit_state,
        emit_trades = config.emit_trades,
        "Processing feed"
    );

    let started = Instant::now();
    let (summary, _) = FeedProcessor::from_config(config, output).run(input)?;

    info!(
        rows = summary.rows,
        errors = summary.errors,
        trades = summary.trades,
        crossed = summary.crossed_signals,
        resting = summary.resting_orders,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "Feed processed"
    );

    Ok(())
}
