//! Per-app daily spend caps and the proration model.
//!
//! Budgets are configuration, not data: the dataset never carries them.
//! Two different prorations are in play and they are not interchangeable:
//!
//!   1. Per-app view:  total budget = the app's daily cap x days in view.
//!   2. Per-day view:  the day's budget = sum of daily caps over the apps
//!      present in the filtered data, regardless of how many of those apps
//!      actually spent on that particular day.
//!
//! The per-day figure deliberately over-counts on days where an app was
//! dark. It answers "how much was the whole portfolio allowed to spend on
//! a day like this", which is the comparison the day view promises.

use crate::types::AppName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Daily budget caps per app, with a fallback cap for unmapped apps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetBook {
    daily_caps: HashMap<AppName, f64>,
    default_daily_cap: f64,
}

impl BudgetBook {
    pub fn new(daily_caps: HashMap<AppName, f64>, default_daily_cap: f64) -> Self {
        Self {
            daily_caps,
            default_daily_cap,
        }
    }

    /// The daily cap for one app. Lookup trims surrounding whitespace but is
    /// otherwise exact (case-sensitive); unknown apps get the default cap.
    pub fn daily_cap(&self, app: &str) -> f64 {
        self.daily_caps
            .get(app.trim())
            .copied()
            .unwrap_or(self.default_daily_cap)
    }

    /// Budget for one app over a view of `num_days` days. The day count
    /// floors at 1, so a degenerate window never yields a zero budget.
    pub fn total_budget(&self, app: &str, num_days: i64) -> f64 {
        self.daily_cap(app) * num_days.max(1) as f64
    }

    /// A single day's budget: the sum of daily caps over `apps`. Callers
    /// pass the distinct apps present in the filtered data.
    pub fn day_budget<'a, I>(&self, apps: I) -> f64
    where
        I: IntoIterator<Item = &'a str>,
    {
        apps.into_iter().map(|app| self.daily_cap(app)).sum()
    }
}

/// Spend as a percentage of budget. A non-positive budget reads as "no
/// budget to measure against" and yields 0, never a division blowup.
pub fn utilization_pct(spend: f64, total_budget: f64) -> f64 {
    if total_budget > 0.0 {
        spend / total_budget * 100.0
    } else {
        0.0
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
