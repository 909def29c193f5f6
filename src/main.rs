// src/main.rs

//! pagewatch CLI
//!
//! Thin host around the watcher. The config file describes the site and
//! the delivery template; the state file persists the polling interval
//! and watch list between invocations.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pagewatch::{
    config::{Config, TomlStateStore},
    delivery::ConsoleSink,
    error::Result,
    session::HttpSession,
    watcher::Watcher,
};

/// pagewatch - profile page watcher
#[derive(Parser, Debug)]
#[command(
    name = "pagewatch",
    version,
    about = "Watches profile pages and prints new posts"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Path to the state file holding the interval and watch list
    #[arg(short, long, default_value = "data/state.toml")]
    state: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a screen name to the watch list
    Watch {
        /// Screen name of the profile page to watch
        handle: String,
    },

    /// Remove a screen name from the watch list
    Unwatch {
        /// Screen name to stop watching
        handle: String,
    },

    /// Set the polling interval
    Interval {
        /// Seconds between passes
        secs: String,
    },

    /// Show the watch list
    List,

    /// Poll every watched page once and exit
    Once,

    /// Poll on the configured interval until interrupted
    Run {
        /// Override the polling interval before starting
        #[arg(long)]
        interval: Option<String>,

        /// Add screen names to the watch list before starting
        #[arg(long)]
        watch: Vec<String>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Stop the watcher before the process exits, downgrading a grace-period
/// overrun to a warning. A worker stuck mid-fetch gets aborted anyway.
async fn shutdown(watcher: &Watcher) {
    if let Err(e) = watcher.stop().await {
        log::warn!("{e}");
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    let session = Arc::new(HttpSession::new(&config.http)?);
    let sink = Arc::new(ConsoleSink::new(config.delivery.template.clone()));
    let store = Arc::new(TomlStateStore::open(&cli.state)?);
    let watcher = Watcher::new(session, sink, store)?;

    match cli.command {
        Command::Watch { handle } => {
            log::info!("{}", watcher.add_target(&handle).await?);
            shutdown(&watcher).await;
        }

        Command::Unwatch { handle } => {
            log::info!("{}", watcher.remove_target(&handle).await?);
            shutdown(&watcher).await;
        }

        Command::Interval { secs } => {
            log::info!("{}", watcher.set_interval(&secs).await?);
            shutdown(&watcher).await;
        }

        Command::List => {
            log::info!("{}", watcher.list_targets());
        }

        Command::Once => {
            let outcome = watcher.poll_once().await?;
            log::info!(
                "polled {} target(s): {} delivered, {} failure(s)",
                outcome.targets_polled,
                outcome.delivered,
                outcome.failures
            );
        }

        Command::Run { interval, watch } => {
            // Interval first, so a worker spawned by the first added
            // target already runs on the requested cadence.
            if let Some(secs) = &interval {
                log::info!("{}", watcher.set_interval(secs).await?);
            }
            for handle in &watch {
                match watcher.add_target(handle).await {
                    Ok(message) => log::info!("{message}"),
                    Err(e) => log::warn!("{e}"),
                }
            }

            if !watcher.start().await? && !watcher.is_running().await {
                log::error!("nothing to watch: add a target first (see 'watch' and 'interval')");
                return Ok(());
            }

            log::info!("{}", watcher.list_targets());
            log::info!(
                "polling every {}s; press Ctrl-C to stop",
                watcher.interval_secs()
            );

            tokio::signal::ctrl_c().await?;
            shutdown(&watcher).await;
        }
    }

    Ok(())
}
