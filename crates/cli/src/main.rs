//! notifyx - print filesystem events for the given paths

use anyhow::{Context, Result};
use clap::Parser;
use notifyx_watcher::{EventMask, PollConfig, Timeout, WatchRegistry};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod output;

use output::Printer;

/// Watch paths and print every event the kernel reports for them
#[derive(Parser)]
#[command(name = "notifyx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Files or directories to watch (not recursive)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Events to watch for, e.g. "CREATE|DELETE" (default: all)
    #[arg(short, long)]
    mask: Option<String>,

    /// Seconds to wait per poll (default: wait forever)
    #[arg(short, long)]
    timeout: Option<f64>,

    /// Exit after the first poll
    #[arg(long)]
    once: bool,

    /// Print one JSON object per event
    #[arg(long)]
    json: bool,

    /// Config file (default: <config dir>/notifyx/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read buffer size in bytes
    #[arg(long)]
    buffer_capacity: Option<usize>,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_file.as_deref())?;

    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    // Negative means no limit
    let timeout = Timeout::from(cli.timeout.unwrap_or(-1.0));
    if !cli.once && timeout.duration() == Some(Duration::ZERO) {
        anyhow::bail!("--timeout 0 never waits; use it together with --once");
    }

    let config = config::load(cli.config.as_deref())?;

    let mask = match &cli.mask {
        Some(names) => {
            EventMask::parse(names).with_context(|| format!("Invalid --mask: {}", names))?
        }
        None => config.watch.mask()?,
    };

    let poll_config = match cli.buffer_capacity {
        Some(capacity) => PollConfig::with_buffer_capacity(capacity),
        None => config.poll,
    };
    poll_config.validate()?;

    let channel = notifyx_watcher::channel_create().context("Failed to open inotify channel")?;
    let mut registry = WatchRegistry::new(channel, poll_config);

    for path in &cli.paths {
        registry
            .watch(path, mask)
            .with_context(|| format!("Failed to watch {}", path.display()))?;
    }
    info!("Watching {} paths (mask {})", cli.paths.len(), mask);

    let stdout = io::stdout();
    let color = !cli.json && stdout.is_terminal();
    let mut printer = Printer::new(stdout.lock(), cli.json, color);

    loop {
        let events = registry.poll(timeout).context("Failed to read events")?;
        debug!("Poll returned {} events", events.len());

        for event in &events {
            printer.print(event)?;
        }
        printer.flush()?;

        if cli.once {
            break;
        }
        if registry.is_empty() {
            info!("No watches left, exiting");
            break;
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG`, and optionally to a file
fn init_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let console_layer = fmt::layer().with_writer(io::stderr).with_target(false);

    let Some(log_file) = log_file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .init();
        return Ok(None);
    };

    let dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = log_file
        .file_name()
        .with_context(|| format!("Invalid log file path: {}", log_file.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(Some(guard))
}
