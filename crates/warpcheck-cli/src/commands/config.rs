//! Configuration management commands.

use std::path::Path;

use anyhow::{Result, bail};
use warpcheck_config::{WarpcheckConfig, existing_layers};

use crate::style::{self, colors::SemanticStyle};

/// Show current configuration.
pub fn show(config: &WarpcheckConfig, project: &Path, format: &str) -> Result<()> {
    match format {
        "json" => {
            let json = serde_json::to_string_pretty(config)?;
            println!("{json}");
        }
        "toml" => {
            print!("{}", config.to_toml()?);
        }
        "text" => {
            println!("{}", "warpcheck Configuration".header());
            println!("=======================\n");

            println!("Sources:");
            let layers = existing_layers(project, true);
            if layers.is_empty() {
                style::print_labeled("Files", "none (built-in defaults)");
            }
            for (layer, file) in layers {
                style::print_labeled(&layer.to_string(), &file.display().to_string());
            }
            println!();

            println!("Trace:");
            style::print_labeled("Log path", &config.trace.log_path.display().to_string());
            println!();

            println!("Validator:");
            style::print_labeled("Cores", &config.validator.cores.to_string());
            println!();

            println!("Stats:");
            style::print_labeled("Queue slots", &config.stats.queue_slots.to_string());
            println!();

            println!("Testbench:");
            style::print_labeled("Iterations", &config.testbench.iterations.to_string());
            style::print_labeled("Capacity", &config.testbench.capacity.to_string());
            style::print_labeled("Max value", &config.testbench.max_value.to_string());
            style::print_labeled("Output", &config.testbench.output.display().to_string());
        }
        other => bail!("unknown format '{other}' (expected text, json or toml)"),
    }

    Ok(())
}
