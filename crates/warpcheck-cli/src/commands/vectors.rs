//! Testbench vector generation command.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;
use warpcheck_config::WarpcheckConfig;
use warpcheck_testbench::{Pattern, VectorConfig, write_vectors};

use crate::style::{self, colors::SemanticStyle};

/// Command-line overrides for the `[testbench]` section.
pub struct VectorArgs {
    pub pattern: Option<String>,
    pub iterations: Option<u64>,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
}

pub fn run(config: &WarpcheckConfig, args: VectorArgs) -> Result<()> {
    let pattern = args
        .pattern
        .as_deref()
        .map(str::parse::<Pattern>)
        .transpose()?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let output = args.output.unwrap_or_else(|| config.testbench.output.clone());

    let vector_config = VectorConfig {
        iterations: args.iterations.unwrap_or(config.testbench.iterations),
        capacity: config.testbench.capacity,
        max_value: config.testbench.max_value,
        seed,
        pattern,
    };

    debug!(?vector_config, output = %output.display(), "generating vectors");
    let file = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let summary = write_vectors(vector_config, file)?;

    style::print_success(&format!(
        "Wrote {} vectors to {}",
        summary.enqueued + summary.dequeued + summary.nops,
        output.display().to_string().code()
    ));
    style::print_labeled("Seed", &seed.to_string());
    style::print_labeled("Enqueued", &summary.enqueued.to_string());
    style::print_labeled("Dequeued", &summary.dequeued.to_string());
    style::print_labeled("Skipped", &summary.skipped.to_string());

    Ok(())
}
