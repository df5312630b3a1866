//! Trace statistics command.

use std::path::PathBuf;

use anyhow::{Result, bail};
use tracing::debug;
use warpcheck_config::WarpcheckConfig;
use warpcheck_trace::{TraceStats, stats_file};

use crate::style;

pub fn run(
    config: &WarpcheckConfig,
    log: Option<PathBuf>,
    queue_slots: Option<usize>,
    format: &str,
) -> Result<()> {
    if !matches!(format, "text" | "table" | "json") {
        bail!("unknown format '{format}' (expected text, table or json)");
    }

    let path = log.unwrap_or_else(|| config.trace.log_path.clone());
    let queue_slots = queue_slots.unwrap_or(config.stats.queue_slots);
    debug!(path = %path.display(), queue_slots, format, "collecting stats");
    let stats = stats_file(&path, queue_slots)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Total processed = {}", stats.total_processed);
    println!(
        "Cancellation messages = {} ({})",
        stats.cancellations,
        percent(&stats)
    );

    if format == "table" {
        println!("{}", style::histogram_table(&stats.histogram));
    } else {
        for (depth, count) in stats.histogram.iter().enumerate() {
            println!("{depth}: {count}");
        }
    }

    if stats.overflow > 0 {
        style::print_warn(&format!(
            "{} receives reported a depth above {}",
            stats.overflow,
            stats.histogram.len() - 1
        ));
    }
    if stats.missing_depth > 0 {
        style::print_warn(&format!(
            "{} receives carried no depth annotation",
            stats.missing_depth
        ));
    }

    Ok(())
}

fn percent(stats: &TraceStats) -> String {
    stats
        .cancellation_percent()
        .map_or_else(|| "n/a".to_string(), |p| format!("{p:.2}%"))
}
