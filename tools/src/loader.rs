//! Dataset ingestion: CSV text in, fully parsed records out.
//!
//! All text cleaning happens here, at the edge. The raw export carries
//! embedded thousands separators in Impressions (quoted fields), trailing
//! percent signs on Attribution % and ROAS D7, and `%d-%b-%y` dates. The
//! core never sees any of that; it gets typed, non-negative records with
//! absent numeric cells already collapsed to zero.
//!
//! A malformed row is skipped with a warning, never a hard stop: one bad
//! export line should not take the whole report down.

use adboard_core::record::{CampaignRecord, Dataset};
use adboard_core::types::Day;
use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};

pub struct LoadSummary {
    pub rows: usize,
    pub skipped: usize,
}

/// Read a performance CSV into an immutable dataset snapshot.
pub fn load_csv(path: &str) -> Result<(Dataset, LoadSummary)> {
    let file = File::open(path).with_context(|| format!("Cannot open dataset {path}"))?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header = lines.next().ok_or_else(|| anyhow!("{path} is empty"))??;
    let columns = split_record(&header);
    let index = ColumnIndex::from_header(&columns)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (line_no, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_record(&line);
        match parse_row(&fields, &index) {
            Some(record) => records.push(record),
            None => {
                skipped += 1;
                // +2: one for the header, one for zero-based enumerate.
                log::warn!("skipping malformed row {} of {path}", line_no + 2);
            }
        }
    }

    log::info!(
        "loaded {} records from {path} ({skipped} skipped)",
        records.len()
    );
    let summary = LoadSummary {
        rows: records.len(),
        skipped,
    };
    Ok((Dataset::new(records), summary))
}

/// Positions of the dataset columns, resolved from the header by name so
/// column order in the export never matters. Identity and date columns are
/// required; a missing measure column reads as all zeros.
#[derive(Debug)]
struct ColumnIndex {
    app: usize,
    campaign: usize,
    creative: usize,
    date: usize,
    spend: Option<usize>,
    installs: Option<usize>,
    impressions: Option<usize>,
    payers: Option<usize>,
    revenue: Option<usize>,
    attribution: Option<usize>,
    roas: Option<usize>,
}

impl ColumnIndex {
    fn from_header(columns: &[String]) -> Result<Self> {
        let find = |name: &str| columns.iter().position(|c| c.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| anyhow!("dataset is missing required column '{name}'"))
        };
        Ok(Self {
            app: require("App Name")?,
            campaign: require("Campaign Id")?,
            creative: require("Creative Id")?,
            date: require("Date")?,
            spend: find("Spend ($)"),
            installs: find("Installs"),
            impressions: find("Impressions"),
            payers: find("Payers D7"),
            revenue: find("Revenue D7"),
            attribution: find("Attribution %"),
            roas: find("ROAS D7"),
        })
    }
}

fn parse_row(fields: &[String], index: &ColumnIndex) -> Option<CampaignRecord> {
    let app = fields.get(index.app)?.trim().to_string();
    if app.is_empty() {
        return None;
    }
    let campaign = fields.get(index.campaign)?.trim().to_string();
    let creative = fields.get(index.creative)?.trim().to_string();
    let date = parse_date(fields.get(index.date)?)?;

    // The raw ROAS D7 column is validated for shape but never kept: the
    // core derives ROAS from revenue and spend, and a stored copy of a
    // derived figure is exactly the kind of thing that drifts.
    if let Some(i) = index.roas {
        if let Some(cell) = fields.get(i) {
            clean_percent(cell)?;
        }
    }

    Some(CampaignRecord {
        app,
        campaign,
        creative,
        date,
        spend: number_at(fields, index.spend)?,
        installs: count_at(fields, index.installs)?,
        impressions: count_at(fields, index.impressions)?,
        revenue_d7: number_at(fields, index.revenue)?,
        payers_d7: count_at(fields, index.payers)?,
        attribution: percent_at(fields, index.attribution)?,
    })
}

fn number_at(fields: &[String], index: Option<usize>) -> Option<f64> {
    match index {
        Some(i) => clean_number(fields.get(i).map(String::as_str).unwrap_or("")),
        None => Some(0.0),
    }
}

fn count_at(fields: &[String], index: Option<usize>) -> Option<u64> {
    number_at(fields, index).map(|v| v.round() as u64)
}

fn percent_at(fields: &[String], index: Option<usize>) -> Option<f64> {
    match index {
        Some(i) => clean_percent(fields.get(i).map(String::as_str).unwrap_or("")),
        None => Some(0.0),
    }
}

/// Strip grouping separators and parse. An empty cell is zero; negative or
/// garbage values mark the row malformed.
fn clean_number(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return Some(0.0);
    }
    cleaned.parse::<f64>().ok().filter(|v| *v >= 0.0)
}

/// "61%" or "61" both mean the fraction 0.61. An empty cell is zero.
fn clean_percent(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_end_matches('%').trim();
    if cleaned.is_empty() {
        return Some(0.0);
    }
    let value = cleaned.parse::<f64>().ok().filter(|v| *v >= 0.0)?;
    Some(value / 100.0)
}

/// Dates arrive as `05-Jan-25`.
fn parse_date(raw: &str) -> Option<Day> {
    Day::parse_from_str(raw.trim(), "%d-%b-%y").ok()
}

/// Split one CSV line, honoring double-quoted fields. The Impressions
/// column is quoted in real exports because of its embedded separators.
fn split_record(line: &str) -> Vec<String> {
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

// ── Sample export ──────────────────────────────────────────────────────────

const WRITE_HEADER: &str = "Date,App Name,Campaign Id,Creative Id,Spend ($),Impressions,Installs,Payers D7,Revenue D7,ROAS D7,Attribution %";

/// Write records in the raw export format `load_csv` accepts, separators,
/// percent signs and all. Attribution rounds to whole percent like the
/// real exports carry it.
pub fn write_csv(records: &[CampaignRecord], path: &str) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Cannot create {path}"))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{WRITE_HEADER}")?;
    for record in records {
        writeln!(out, "{}", format_row(record))?;
    }
    out.flush()?;
    log::info!("wrote {} rows to {path}", records.len());
    Ok(())
}

fn format_row(record: &CampaignRecord) -> String {
    let roas_pct = if record.spend > 0.0 {
        record.revenue_d7 / record.spend * 100.0
    } else {
        0.0
    };
    format!(
        "{},{},{},{},{:.2},\"{}\",{},{},{:.2},{:.0}%,{:.0}%",
        record.date.format("%d-%b-%y"),
        record.app,
        record.campaign,
        record.creative,
        record.spend,
        group_thousands(record.impressions),
        record.installs,
        record.payers_d7,
        record.revenue_d7,
        roas_pct,
        record.attribution * 100.0,
    )
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut reversed = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            reversed.push(',');
        }
        reversed.push(c);
    }
    reversed.chars().rev().collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────
