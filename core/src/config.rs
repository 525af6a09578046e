//! Runtime configuration. Budget caps live here, not in the dataset: the
//! performance CSV never carries budget columns, so caps arrive from a JSON
//! file (or the shipped defaults) at startup.

use crate::budget::BudgetBook;
use crate::error::ReportResult;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
struct BudgetCapsFile {
    default_daily_cap: f64,
    #[serde(default)]
    daily_caps: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub budget: BudgetBook,
}

impl ReportConfig {
    /// Load caps from a JSON file shaped like:
    ///
    /// ```json
    /// { "default_daily_cap": 2000.0, "daily_caps": { "MaxiBingo": 4000.0 } }
    /// ```
    ///
    /// In tests and demos, use `ReportConfig::default()`.
    pub fn load(path: &str) -> ReportResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read budget config {path}: {e}"))?;
        let file: BudgetCapsFile = serde_json::from_str(&content)?;
        log::info!(
            "loaded budget config from {path}: {} app caps, default {}",
            file.daily_caps.len(),
            file.default_daily_cap
        );
        Ok(Self {
            budget: BudgetBook::new(file.daily_caps, file.default_daily_cap),
        })
    }
}

impl Default for ReportConfig {
    /// The shipped caps: MaxiBingo runs a doubled daily cap, every other app
    /// uses the house default.
    fn default() -> Self {
        let mut caps = HashMap::new();
        caps.insert("MaxiBingo".to_string(), 4_000.0);
        Self {
            budget: BudgetBook::new(caps, 2_000.0),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
