//! Derived marketing KPIs.
//!
//! One calculator serves both levels: a single record and a group's summed
//! totals go through the same formulas, so a one-row group and its row agree
//! exactly. RULE: any zero denominator yields 0.0, never an infinity, a NaN
//! or an error. Zero is how the dashboard renders "nothing to divide by".

use crate::record::CampaignRecord;
use serde::{Deserialize, Serialize};

/// The seven derived ratio metrics.
///
/// `roas_d7` and `payer_rate` are plain fractions (0.5 means 50%); scaling
/// for display belongs to the formatter, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    /// Cost per install: spend / installs.
    pub cpi: f64,
    /// Installs per mille: installs / (impressions / 1000).
    pub ipm: f64,
    /// Cost per mille: spend / (impressions / 1000).
    pub cpm: f64,
    /// Return on ad spend at day 7: revenue_d7 / spend.
    pub roas_d7: f64,
    /// Payer conversion at day 7: payers_d7 / installs.
    pub payer_rate: f64,
    /// Average revenue per install at day 7.
    pub arpi: f64,
    /// Average revenue per payer at day 7.
    pub arpp: f64,
}

impl Kpis {
    /// Compute every metric from base measures. Works identically for one
    /// record and for aggregated sums; only the inputs differ.
    pub fn compute(
        spend: f64,
        installs: u64,
        impressions: u64,
        revenue_d7: f64,
        payers_d7: u64,
    ) -> Self {
        let installs = installs as f64;
        let mille = impressions as f64 / 1000.0;
        let payers = payers_d7 as f64;
        Self {
            cpi: safe_div(spend, installs),
            ipm: safe_div(installs, mille),
            cpm: safe_div(spend, mille),
            roas_d7: safe_div(revenue_d7, spend),
            payer_rate: safe_div(payers, installs),
            arpi: safe_div(revenue_d7, installs),
            arpp: safe_div(revenue_d7, payers),
        }
    }

    pub fn from_record(record: &CampaignRecord) -> Self {
        Self::compute(
            record.spend,
            record.installs,
            record.impressions,
            record.revenue_d7,
            record.payers_d7,
        )
    }
}

/// Division under the degenerate-case policy: a non-positive denominator or
/// a non-finite quotient collapses to zero.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        let value = numerator / denominator;
        if value.is_finite() {
            value
        } else {
            0.0
        }
    } else {
        0.0
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
