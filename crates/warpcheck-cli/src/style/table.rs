//! Table formatting using comfy-table.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

fn base_table() -> Table {
    let mut table = Table::new();

    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table
}

fn header_cell(text: &str) -> Cell {
    if super::no_color() {
        Cell::new(text)
    } else {
        Cell::new(text).add_attribute(Attribute::Bold).fg(Color::Cyan)
    }
}

/// Creates a queue-depth histogram table: depth, receive count and share
/// of all receives.
pub fn histogram_table(histogram: &[u64]) -> Table {
    let mut table = base_table();
    table.set_header(vec![
        header_cell("Depth"),
        header_cell("Receives"),
        header_cell("Share"),
    ]);

    let total: u64 = histogram.iter().sum();
    for (depth, &count) in histogram.iter().enumerate() {
        let share = if total == 0 {
            "-".to_string()
        } else {
            format!("{:.2}%", count as f64 * 100.0 / total as f64)
        };
        table.add_row(vec![
            Cell::new(depth).set_alignment(CellAlignment::Right),
            Cell::new(count).set_alignment(CellAlignment::Right),
            Cell::new(share).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// Creates a key-value info table (two columns: key and value).
pub fn info_table(entries: &[(&str, String)]) -> Table {
    let mut table = base_table();

    for (key, value) in entries {
        let key_cell = if super::no_color() {
            Cell::new(key)
        } else {
            Cell::new(key).fg(Color::DarkGrey)
        };
        table.add_row(vec![key_cell, Cell::new(value)]);
    }

    table
}
