//! warpcheck CLI.
//!
//! Replays the log of an optimistic (Time-Warp) hardware simulator and
//! checks it against the dispatch, occupancy, GVT and rollback rules.
//!
//! # Quick Start
//!
//! ```bash
//! # Validate a simulation log
//! warpcheck check ../verilog/sim.log
//!
//! # Cancellation rate and queue-depth histogram
//! warpcheck stats ../verilog/sim.log
//!
//! # Stimulus for the priority queue testbench
//! warpcheck vectors --pattern 1112220 --output prio_q_test_data.dat
//! ```

mod commands;
mod style;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use warpcheck_config::{ConfigLoader, WarpcheckConfig};

/// warpcheck - correctness oracle for Time-Warp simulator traces.
#[derive(Parser)]
#[command(name = "warpcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory holding warpcheck.toml.
    #[arg(short = 'C', long, global = true, default_value = ".")]
    project: PathBuf,

    /// Log rollbacks and batch boundaries to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Replay a simulator log and report the first protocol violation.
    Check {
        /// Simulator log (default: trace.log_path).
        log: Option<PathBuf>,

        /// Core count of the simulated hardware.
        #[arg(long)]
        cores: Option<usize>,
    },

    /// Print cancellation rate and queue-depth histogram of a log.
    Stats {
        /// Simulator log (default: trace.log_path).
        log: Option<PathBuf>,

        /// Largest queue depth with its own histogram bucket.
        #[arg(long)]
        queue_slots: Option<usize>,

        /// Output format (text, table, json).
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Write priority queue testbench vectors.
    Vectors {
        /// Operation digits: 1 enqueue, 2 dequeue, 0 no-op.
        #[arg(short, long)]
        pattern: Option<String>,

        /// Random operations to draw when no pattern is given.
        #[arg(short = 'n', long)]
        iterations: Option<u64>,

        /// RNG seed (random if omitted).
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output file (default: testbench.output).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration commands.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the merged configuration.
    Show {
        /// Output format (text, json, toml).
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for reports
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    style::set_no_color(cli.no_color);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            style::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let Cli {
        project,
        verbose,
        command,
        ..
    } = cli;
    let ok = |()| ExitCode::SUCCESS;

    match command {
        Commands::Version => {
            commands::version::run();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { log, cores } => {
            let config = load_config(&project)?;
            commands::check::run(&config, log, cores, verbose)
        }
        Commands::Stats {
            log,
            queue_slots,
            format,
        } => {
            let config = load_config(&project)?;
            commands::stats::run(&config, log, queue_slots, &format).map(ok)
        }
        Commands::Vectors {
            pattern,
            iterations,
            seed,
            output,
        } => {
            let config = load_config(&project)?;
            let args = commands::vectors::VectorArgs {
                pattern,
                iterations,
                seed,
                output,
            };
            commands::vectors::run(&config, args).map(ok)
        }
        Commands::Config(ConfigCommands::Show { format }) => {
            let config = load_config(&project)?;
            commands::config::show(&config, &project, &format).map(ok)
        }
    }
}

fn load_config(project: &Path) -> Result<WarpcheckConfig> {
    debug!(project = %project.display(), "loading configuration");
    ConfigLoader::new()
        .with_project_dir(project)
        .load()
        .context("Failed to load configuration")
}
