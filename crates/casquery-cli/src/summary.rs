use std::path::Path;

use casquery_batch::{BatchSummary, RowStatus};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

const STATUSES: [RowStatus; 4] = [
    RowStatus::Success,
    RowStatus::NormalizationFailed,
    RowStatus::LookupFailed,
    RowStatus::NotFound,
];

pub fn print_batch_summary(summary: &BatchSummary, output: &Path) {
    println!("Output: {}", output.display());
    println!("{}", batch_summary_table(summary));
}

/// Row counts per status, with a total row and the number of registry
/// requests issued.
pub fn batch_summary_table(summary: &BatchSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Status"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    for status in STATUSES {
        let count = summary.count(status);
        table.add_row(vec![status_cell(status), count_cell(status, count)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.total).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        dim_cell("registry lookups"),
        dim_cell(summary.registry_lookups),
    ]);
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_color(status: RowStatus) -> Color {
    match status {
        RowStatus::Success => Color::Green,
        RowStatus::NotFound => Color::Yellow,
        RowStatus::NormalizationFailed | RowStatus::LookupFailed => Color::Red,
    }
}

fn status_cell(status: RowStatus) -> Cell {
    Cell::new(status.as_str()).fg(status_color(status))
}

fn count_cell(status: RowStatus, count: usize) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count)
            .fg(status_color(status))
            .add_attribute(Attribute::Bold)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
