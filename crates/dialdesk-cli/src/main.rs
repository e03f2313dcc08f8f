mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;

use crate::commands::{leases, outcomes, records, stats, Context};
use crate::error::{exit_code_for, report_error};
use dialdesk_config as config;
use dialdesk_store::db::StoreOptions;
use dialdesk_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "dialdesk", version, about = "dialdesk CLI")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load phone numbers into an agent's dial list
    Import(records::ImportArgs),
    /// Lease the next eligible record
    Next(leases::NextArgs),
    /// Give a leased record back to the pool
    Release(leases::ReleaseArgs),
    /// Record the call outcome and complete the record
    Finalize(outcomes::FinalizeArgs),
    /// Show one record with its eligibility
    Show(records::ShowArgs),
    /// List an agent's records in dial order
    List(records::ListArgs),
    /// Count records per status
    Stats(stats::StatsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) => {
                if path.exists() {
                    debug!(path = %path.display(), "config resolved");
                } else {
                    debug!(path = %path.display(), "config missing, using defaults");
                }
            }
            Err(err) => {
                debug!(error = %err, "config unavailable");
            }
        }
    }

    let db_path = paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
    if verbose {
        debug!(path = %db_path.display(), "database path resolved");
    }

    let options = StoreOptions {
        busy_timeout: Duration::from_millis(u64::from(app_config.store.busy_timeout_ms)),
    };
    let store = Store::open_with_options(&db_path, &options)
        .with_context(|| format!("open database {}", db_path.display()))?
        .with_attempt_policy(app_config.attempt_policy());
    store.migrate().with_context(|| "run migrations")?;

    let ctx = Context {
        store: &store,
        json,
        config: &app_config,
    };

    match command {
        Command::Import(args) => records::import(&ctx, args),
        Command::Next(args) => leases::next(&ctx, args),
        Command::Release(args) => leases::release(&ctx, args),
        Command::Finalize(args) => outcomes::finalize(&ctx, args),
        Command::Show(args) => records::show(&ctx, args),
        Command::List(args) => records::list(&ctx, args),
        Command::Stats(args) => stats::stats(&ctx, args),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
