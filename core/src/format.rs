//! Display formatting. This is the last stage of the pipeline and it only
//! produces strings: nothing here feeds back into arithmetic, so rounding a
//! cell can never change a computed total.
//!
//! Column names map to render kinds through one fixed table. Values in
//! columns the table does not know (ids, dates, cells rendered upstream)
//! pass through untouched.

use serde::{Deserialize, Serialize};

/// How a numeric column renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Integer with `.` as the grouping separator: 12345 -> "12.345".
    Thousands,
    /// Fraction as a two-decimal percentage: 0.0732 -> "7.32%".
    Percent,
    /// Two fixed decimal places: 3.456 -> "3.46".
    Decimal,
}

/// The column -> kind table. One place, enumerated, no inference.
pub fn column_kind(column: &str) -> Option<ColumnKind> {
    match column {
        "Spend ($)" | "Installs" | "Impressions" | "Revenue D7" | "Payers D7"
        | "Total Budget ($)" => Some(ColumnKind::Thousands),
        "Attribution %" | "Payers %" => Some(ColumnKind::Percent),
        "CPI" | "IPM" | "CPM" | "ARPI" | "ARPP" => Some(ColumnKind::Decimal),
        _ => None,
    }
}

/// A single display value before rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Num(f64),
    Text(String),
    Empty,
}

/// Render one cell for a named column. Text and empty cells pass through
/// unchanged whatever the column; numbers in unmapped columns print plainly.
pub fn render(column: &str, value: &Cell) -> String {
    match value {
        Cell::Num(v) => match column_kind(column) {
            Some(ColumnKind::Thousands) => thousands(*v),
            Some(ColumnKind::Percent) => percent(*v),
            Some(ColumnKind::Decimal) => decimal(*v),
            None => v.to_string(),
        },
        Cell::Text(s) => s.clone(),
        Cell::Empty => String::new(),
    }
}

/// Round to an integer and group digits with `.` separators.
pub fn thousands(value: f64) -> String {
    let negative = value < 0.0;
    let digits = (value.abs().round() as u64).to_string();
    let mut reversed = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            reversed.push('.');
        }
        reversed.push(c);
    }
    let grouped: String = reversed.chars().rev().collect();
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Two-decimal percentage from a fraction: 0.0732 -> "7.32%".
pub fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// One-decimal percentage from a fraction: 0.5 -> "50.0%".
pub fn percent1(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Two fixed decimal places.
pub fn decimal(value: f64) -> String {
    format!("{value:.2}")
}

/// A fully rendered view: column headers plus rows of display strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Render one row of cells through the column table and append it.
    pub fn push_row(&mut self, cells: &[Cell]) {
        debug_assert_eq!(cells.len(), self.columns.len(), "row width mismatch");
        let rendered = self
            .columns
            .iter()
            .zip(cells)
            .map(|(column, cell)| render(column, cell))
            .collect();
        self.rows.push(rendered);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_table_matches_the_dashboard_columns() {
        assert_eq!(column_kind("Spend ($)"), Some(ColumnKind::Thousands));
        assert_eq!(column_kind("Impressions"), Some(ColumnKind::Thousands));
        assert_eq!(column_kind("Total Budget ($)"), Some(ColumnKind::Thousands));
        assert_eq!(column_kind("Attribution %"), Some(ColumnKind::Percent));
        assert_eq!(column_kind("Payers %"), Some(ColumnKind::Percent));
        assert_eq!(column_kind("CPI"), Some(ColumnKind::Decimal));
        assert_eq!(column_kind("ARPP"), Some(ColumnKind::Decimal));
        assert_eq!(column_kind("Campaign Id"), None);
        assert_eq!(column_kind("Date"), None);
    }

    #[test]
    fn thousands_groups_with_dot_separators() {
        assert_eq!(thousands(12_345.0), "12.345");
        assert_eq!(thousands(1_234_567.0), "1.234.567");
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(-12_345.0), "-12.345");
        // Rounds to an integer before grouping.
        assert_eq!(thousands(1_999.6), "2.000");
    }

    #[test]
    fn percent_renders_two_decimals_from_a_fraction() {
        assert_eq!(percent(0.0732), "7.32%");
        assert_eq!(percent(0.2), "20.00%");
        assert_eq!(percent(1.0), "100.00%");
        assert_eq!(percent(0.0), "0.00%");
    }

    #[test]
    fn percent1_renders_one_decimal_from_a_fraction() {
        assert_eq!(percent1(0.5), "50.0%");
        assert_eq!(percent1(0.375), "37.5%");
        assert_eq!(percent1(0.0), "0.0%");
    }

    #[test]
    fn decimal_renders_two_places() {
        assert_eq!(decimal(3.456), "3.46");
        assert_eq!(decimal(10.0), "10.00");
        assert_eq!(decimal(0.0), "0.00");
    }

    #[test]
    fn render_dispatches_on_the_column_name() {
        assert_eq!(render("Spend ($)", &Cell::Num(12_345.0)), "12.345");
        assert_eq!(render("Payers %", &Cell::Num(0.2)), "20.00%");
        assert_eq!(render("CPI", &Cell::Num(3.456)), "3.46");
    }

    #[test]
    fn unmapped_and_non_numeric_cells_pass_through() {
        assert_eq!(
            render("Campaign Id", &Cell::Text("CMP-1001".into())),
            "CMP-1001"
        );
        // Pre-rendered percentages must survive the formatter unchanged.
        assert_eq!(render("ROAS D7", &Cell::Text("50.0%".into())), "50.0%");
        assert_eq!(render("Spend ($)", &Cell::Empty), "");
        assert_eq!(render("Some Other Column", &Cell::Num(42.0)), "42");
    }

    #[test]
    fn table_rows_render_through_the_column_table() {
        let mut table = Table::new(&["App Name", "Spend ($)", "CPI"]);
        table.push_row(&[
            Cell::Text("MaxiBingo".into()),
            Cell::Num(12_345.0),
            Cell::Num(2.5),
        ]);
        assert_eq!(table.rows[0], vec!["MaxiBingo", "12.345", "2.50"]);
    }
}
