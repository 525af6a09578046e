//! Plain-text rendering for terminal output: aligned tables and budget
//! gauges. Works on already-formatted display strings; no numbers are
//! rounded or recomputed here.

use adboard_core::format::{thousands, Table};
use adboard_core::report::BudgetGauge;

const GAUGE_WIDTH: usize = 24;

/// Print a table with the label column left-aligned and every other column
/// right-aligned, the usual shape for numeric reports.
pub fn print_table(table: &Table) {
    let widths = column_widths(table);
    println!("  {}", format_line(&table.columns, &widths));
    let rule_len: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    println!("  {}", "-".repeat(rule_len));
    for row in &table.rows {
        println!("  {}", format_line(row, &widths));
    }
    if table.rows.is_empty() {
        println!("  (no rows)");
    }
}

/// One app's budget bar: `MaxiBingo [######------] 37.5% ...`.
pub fn print_gauge(gauge: &BudgetGauge) {
    let filled = (gauge.fill * GAUGE_WIDTH as f64).round() as usize;
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(GAUGE_WIDTH - filled)
    );
    println!(
        "  {:<20} [{bar}] {:>6} of budget used (${} / ${})",
        gauge.app,
        format!("{:.1}%", gauge.pct_used),
        thousands(gauge.spend),
        thousands(gauge.total_budget),
    );
}

fn column_widths(table: &Table) -> Vec<usize> {
    let mut widths: Vec<usize> = table.columns.iter().map(String::len).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() && cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }
    widths
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &width))| {
            if i == 0 {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

// ── Tests ──────────────────────────────────────────────────────────────────
