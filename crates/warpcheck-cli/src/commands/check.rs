//! Trace validation command.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use tracing::debug;
use warpcheck_config::WarpcheckConfig;
use warpcheck_kernel::ValidatorState;
use warpcheck_trace::{ReplaySummary, TraceError, Violation, replay_file};

use crate::style::{self, colors::SemanticStyle};

/// Replays the log and reports the first violation.
///
/// Silent on a consistent log unless `verbose` is set. A violation is
/// printed to stderr and turns into a failing exit code.
pub fn run(
    config: &WarpcheckConfig,
    log: Option<PathBuf>,
    cores: Option<usize>,
    verbose: bool,
) -> Result<ExitCode> {
    let path = log.unwrap_or_else(|| config.trace.log_path.clone());
    let cores = cores.unwrap_or(config.validator.cores);
    debug!(path = %path.display(), cores, "checking trace");

    match replay_file(&path, ValidatorState::with_core_count(cores)) {
        Ok(summary) => {
            debug!(lines = summary.lines, "trace consistent");
            if verbose {
                print_summary(&summary);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(TraceError::Violation(violation)) => {
            print_violation(&violation);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_violation(violation: &Violation) {
    style::print_error(&format!(
        "protocol violation: {}",
        violation.error.invariant().error()
    ));
    style::eprint_labeled("Line", &violation.line_number.to_string());
    if let Some(cycle) = violation.cycle {
        style::eprint_labeled("Cycle", &cycle.to_string());
    }
    style::eprint_labeled("Log", &violation.line.trim().code());
    style::eprint_labeled("Reason", &violation.error.to_string());
}

fn print_summary(summary: &ReplaySummary) {
    style::print_success(&format!("{} lines consistent", summary.lines));
    let cycle = summary
        .last_cycle
        .map_or_else(|| "-".to_string(), |c| c.to_string());
    let table = style::info_table(&[
        ("Sends", summary.sends.to_string()),
        ("Execs", summary.execs.to_string()),
        ("Recvs", summary.recvs.to_string()),
        ("Nulls", summary.nulls.to_string()),
        ("Cancellations", summary.cancellations.to_string()),
        ("Batches closed", summary.batches_closed.to_string()),
        ("Unrecognized", summary.unrecognized.to_string()),
        ("Last cycle", cycle),
        ("Final GVT", summary.final_gvt.to_string()),
        ("Queued", summary.queued.to_string()),
        ("Busy cores", summary.busy_cores.to_string()),
    ]);
    println!("{table}");
}
