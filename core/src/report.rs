//! Report views. Every view is one full pass over the dataset snapshot:
//!
//!   1. Filter rows by the explicit criteria.
//!   2. Aggregate at the view's granularity; KPIs recompute from group sums.
//!   3. Attach budget columns (caps prorated over the viewed window).
//!   4. Render a display table through the formatter.
//!
//! Nothing is cached between calls, so a view can never show stale numbers
//! after the criteria change. RULE: the app-analysis views read the whole
//! dataset and ignore the selection criteria entirely; picking an app is a
//! separate question from filtering the general tabs.

use crate::aggregate::{aggregate, AggregateGroup, GroupKey, GroupTotals, GroupValue};
use crate::budget::utilization_pct;
use crate::config::ReportConfig;
use crate::error::ReportResult;
use crate::filter::{DateRange, FilterCriteria};
use crate::format::{percent1, Cell, Table};
use crate::metrics::Kpis;
use crate::record::{CampaignRecord, Dataset};
use crate::types::Day;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Headline figures for the overview panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_spend: f64,
    pub total_revenue_d7: f64,
    /// Revenue as a percentage of spend, 0 when nothing was spent.
    pub roas_pct: f64,
    /// Rows that survived the filter; 0 means "no data matches".
    pub rows: usize,
}

/// One app's budget consumption over the selected window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetGauge {
    pub app: String,
    pub spend: f64,
    pub total_budget: f64,
    pub pct_used: f64,
    /// pct_used scaled to [0, 1] for progress rendering; overspend clamps.
    pub fill: f64,
}

/// One row of the performance-by-app view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppRow {
    pub app: String,
    pub totals: GroupTotals,
    pub kpis: Kpis,
    pub total_budget: f64,
    pub budget_used_pct: f64,
}

/// One row of the performance-by-day view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRow {
    pub date: Day,
    pub totals: GroupTotals,
    pub kpis: Kpis,
    /// Sum of daily caps over the apps present in the filtered data. The
    /// same figure on every row: it describes the portfolio, not the day.
    pub total_budget: f64,
    pub budget_used_pct: f64,
}

/// Headline figures for one app's analysis panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppKpis {
    pub app: String,
    pub spend: f64,
    pub revenue_d7: f64,
    pub installs: u64,
    pub roas_pct: f64,
}

/// One campaign of the selected app, with budget context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRow {
    pub campaign: String,
    pub totals: GroupTotals,
    pub kpis: Kpis,
    pub budget_used_pct: f64,
}

/// One creative, aggregated across days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeRow {
    pub creative: String,
    pub totals: GroupTotals,
    pub kpis: Kpis,
}

/// One campaign's drill-down: headline plus per-creative breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDetail {
    pub campaign: String,
    pub spend: f64,
    pub revenue_d7: f64,
    pub roas_pct: f64,
    pub creatives: Vec<CreativeRow>,
}

/// The engine: one dataset snapshot plus one configuration, shared by every
/// view. Construction is the only load; views are pure reads.
pub struct ReportEngine {
    dataset: Dataset,
    config: ReportConfig,
}

impl ReportEngine {
    pub fn new(dataset: Dataset, config: ReportConfig) -> Self {
        Self { dataset, config }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Overview panel: total spend, total D7 revenue and blended ROAS over
    /// the filtered rows.
    pub fn overview(&self, criteria: &FilterCriteria) -> Overview {
        let filtered = criteria.apply(self.dataset.records());
        let total_spend: f64 = filtered.iter().map(|r| r.spend).sum();
        let total_revenue_d7: f64 = filtered.iter().map(|r| r.revenue_d7).sum();
        let roas_pct = if total_spend > 0.0 {
            total_revenue_d7 / total_spend * 100.0
        } else {
            0.0
        };
        Overview {
            total_spend,
            total_revenue_d7,
            roas_pct,
            rows: filtered.len(),
        }
    }

    /// Budget gauges: per-app spend against the cap prorated over the
    /// selected window, ordered by app name.
    pub fn budget_usage(&self, criteria: &FilterCriteria) -> ReportResult<Vec<BudgetGauge>> {
        let filtered = criteria.apply(self.dataset.records());
        let num_days = selected_day_count(criteria, &filtered);
        let groups = aggregate(&filtered, &[GroupKey::App])?;

        let gauges = groups
            .iter()
            .filter_map(|group| {
                let app = text_key(group, GroupKey::App)?;
                let spend = group.totals.spend;
                let total_budget = self.config.budget.total_budget(app, num_days);
                let pct_used = utilization_pct(spend, total_budget);
                Some(BudgetGauge {
                    app: app.to_string(),
                    spend,
                    total_budget,
                    pct_used,
                    fill: (pct_used / 100.0).clamp(0.0, 1.0),
                })
            })
            .collect();
        Ok(gauges)
    }

    /// Performance by app, ordered by app name.
    pub fn by_app(&self, criteria: &FilterCriteria) -> ReportResult<Vec<AppRow>> {
        let filtered = criteria.apply(self.dataset.records());
        let num_days = selected_day_count(criteria, &filtered);
        let groups = aggregate(&filtered, &[GroupKey::App])?;

        let rows = groups
            .into_iter()
            .filter_map(|group| {
                let app = text_key(&group, GroupKey::App)?.to_string();
                let total_budget = self.config.budget.total_budget(&app, num_days);
                let budget_used_pct = utilization_pct(group.totals.spend, total_budget);
                Some(AppRow {
                    app,
                    kpis: group.kpis,
                    totals: group.totals,
                    total_budget,
                    budget_used_pct,
                })
            })
            .collect();
        Ok(rows)
    }

    /// Performance by day, chronological. Each row carries the same total
    /// budget figure: the summed caps of every app present in the filtered
    /// data, whether or not each app spent on that particular day.
    pub fn by_day(&self, criteria: &FilterCriteria) -> ReportResult<Vec<DayRow>> {
        let filtered = criteria.apply(self.dataset.records());
        let apps = present_apps(&filtered);
        let total_budget = self
            .config
            .budget
            .day_budget(apps.iter().map(String::as_str));
        let groups = aggregate(&filtered, &[GroupKey::Date])?;

        let rows = groups
            .into_iter()
            .filter_map(|group| {
                let date = group
                    .key_value(GroupKey::Date)
                    .and_then(GroupValue::as_day)?;
                let budget_used_pct = utilization_pct(group.totals.spend, total_budget);
                Some(DayRow {
                    date,
                    kpis: group.kpis,
                    totals: group.totals,
                    total_budget,
                    budget_used_pct,
                })
            })
            .collect();
        Ok(rows)
    }

    /// Headline KPIs for one app, over the whole dataset.
    pub fn app_kpis(&self, app: &str) -> AppKpis {
        let records = self.app_records(app);
        let spend: f64 = records.iter().map(|r| r.spend).sum();
        let revenue_d7: f64 = records.iter().map(|r| r.revenue_d7).sum();
        let installs: u64 = records.iter().map(|r| r.installs).sum();
        let roas_pct = if spend > 0.0 {
            revenue_d7 / spend * 100.0
        } else {
            0.0
        };
        AppKpis {
            app: app.to_string(),
            spend,
            revenue_d7,
            installs,
            roas_pct,
        }
    }

    /// Campaign summary for one app. Budget context prorates the app's
    /// daily cap over the number of distinct days the app has data for,
    /// not over a selected window.
    pub fn campaign_summary(&self, app: &str) -> ReportResult<Vec<CampaignRow>> {
        let records = self.app_records(app);
        let distinct_days = distinct_day_count(&records);
        let app_budget = self.config.budget.total_budget(app, distinct_days);
        let groups = aggregate(&records, &[GroupKey::App, GroupKey::Campaign])?;

        let rows = groups
            .into_iter()
            .filter_map(|group| {
                let campaign = text_key(&group, GroupKey::Campaign)?.to_string();
                let budget_used_pct = utilization_pct(group.totals.spend, app_budget);
                Some(CampaignRow {
                    campaign,
                    kpis: group.kpis,
                    totals: group.totals,
                    budget_used_pct,
                })
            })
            .collect();
        Ok(rows)
    }

    /// Creative performance for one app, aggregated across all days.
    pub fn creative_summary(&self, app: &str) -> ReportResult<Vec<CreativeRow>> {
        let records = self.app_records(app);
        let groups = aggregate(&records, &[GroupKey::App, GroupKey::Creative])?;
        Ok(groups.into_iter().filter_map(creative_row).collect())
    }

    /// Per-campaign drill-down for one app: campaign headline figures plus
    /// the per-creative breakdown inside each campaign.
    pub fn campaign_details(&self, app: &str) -> ReportResult<Vec<CampaignDetail>> {
        let records = self.app_records(app);
        let campaigns = aggregate(&records, &[GroupKey::Campaign])?;

        let mut details = Vec::with_capacity(campaigns.len());
        for group in campaigns {
            let campaign = match text_key(&group, GroupKey::Campaign) {
                Some(c) => c.to_string(),
                None => continue,
            };
            let spend = group.totals.spend;
            let revenue_d7 = group.totals.revenue_d7;
            let roas_pct = if spend > 0.0 {
                revenue_d7 / spend * 100.0
            } else {
                0.0
            };

            let subset: Vec<CampaignRecord> = records
                .iter()
                .filter(|r| r.campaign == campaign)
                .cloned()
                .collect();
            let creatives = aggregate(
                &subset,
                &[GroupKey::App, GroupKey::Campaign, GroupKey::Creative],
            )?
            .into_iter()
            .filter_map(creative_row)
            .collect();

            details.push(CampaignDetail {
                campaign,
                spend,
                revenue_d7,
                roas_pct,
                creatives,
            });
        }
        Ok(details)
    }

    /// All rows for one app, selection criteria deliberately not applied.
    fn app_records(&self, app: &str) -> Vec<CampaignRecord> {
        self.dataset
            .records()
            .iter()
            .filter(|r| r.app == app)
            .cloned()
            .collect()
    }
}

fn creative_row(group: AggregateGroup) -> Option<CreativeRow> {
    let creative = text_key(&group, GroupKey::Creative)?.to_string();
    Some(CreativeRow {
        creative,
        kpis: group.kpis,
        totals: group.totals,
    })
}

fn text_key(group: &AggregateGroup, key: GroupKey) -> Option<&str> {
    group.key_value(key).and_then(GroupValue::as_text)
}

/// Days in the viewed window: the explicit range when the criteria carry
/// one, otherwise the span of the filtered data, floor 1.
fn selected_day_count(criteria: &FilterCriteria, filtered: &[CampaignRecord]) -> i64 {
    if let Some(range) = criteria.date_range {
        return range.num_days();
    }
    let mut days = filtered.iter().map(|r| r.date);
    match days.next() {
        Some(first) => {
            let (mut lo, mut hi) = (first, first);
            for day in days {
                if day < lo {
                    lo = day;
                }
                if day > hi {
                    hi = day;
                }
            }
            DateRange::new(lo, hi).num_days()
        }
        None => 1,
    }
}

/// Distinct apps in `records`, first-seen order.
fn present_apps(records: &[CampaignRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for record in records {
        if seen.insert(record.app.as_str()) {
            out.push(record.app.clone());
        }
    }
    out
}

/// Distinct days with data, for per-app budget proration.
fn distinct_day_count(records: &[CampaignRecord]) -> i64 {
    let days: HashSet<Day> = records.iter().map(|r| r.date).collect();
    days.len() as i64
}

// ── Display tables ─────────────────────────────────────────────────────────

/// Render the performance-by-app view as a display table.
pub fn app_table(rows: &[AppRow]) -> Table {
    let mut table = Table::new(&[
        "App Name",
        "Spend ($)",
        "Installs",
        "Impressions",
        "Payers D7",
        "Revenue D7",
        "Attribution %",
        "CPI",
        "IPM",
        "CPM",
        "ROAS D7",
        "Payers %",
        "ARPI",
        "ARPP",
        "Total Budget ($)",
        "% of Budget Used",
    ]);
    for row in rows {
        table.push_row(&[
            Cell::Text(row.app.clone()),
            Cell::Num(row.totals.spend),
            Cell::Num(row.totals.installs as f64),
            Cell::Num(row.totals.impressions as f64),
            Cell::Num(row.totals.payers_d7 as f64),
            Cell::Num(row.totals.revenue_d7),
            Cell::Num(row.totals.attribution_mean),
            Cell::Num(row.kpis.cpi),
            Cell::Num(row.kpis.ipm),
            Cell::Num(row.kpis.cpm),
            Cell::Text(percent1(row.kpis.roas_d7)),
            Cell::Num(row.kpis.payer_rate),
            Cell::Num(row.kpis.arpi),
            Cell::Num(row.kpis.arpp),
            Cell::Num(row.total_budget),
            Cell::Text(format!("{:.1}%", row.budget_used_pct)),
        ]);
    }
    table
}

/// Render the performance-by-day view as a display table.
pub fn day_table(rows: &[DayRow]) -> Table {
    let mut table = Table::new(&[
        "Date",
        "Spend ($)",
        "Installs",
        "Impressions",
        "Payers D7",
        "Revenue D7",
        "Attribution %",
        "CPI",
        "IPM",
        "CPM",
        "ROAS D7",
        "Payers %",
        "ARPI",
        "ARPP",
        "Total Budget ($)",
        "% of Budget Used",
    ]);
    for row in rows {
        table.push_row(&[
            Cell::Text(row.date.format("%Y-%m-%d").to_string()),
            Cell::Num(row.totals.spend),
            Cell::Num(row.totals.installs as f64),
            Cell::Num(row.totals.impressions as f64),
            Cell::Num(row.totals.payers_d7 as f64),
            Cell::Num(row.totals.revenue_d7),
            Cell::Num(row.totals.attribution_mean),
            Cell::Num(row.kpis.cpi),
            Cell::Num(row.kpis.ipm),
            Cell::Num(row.kpis.cpm),
            Cell::Text(percent1(row.kpis.roas_d7)),
            Cell::Num(row.kpis.payer_rate),
            Cell::Num(row.kpis.arpi),
            Cell::Num(row.kpis.arpp),
            Cell::Num(row.total_budget),
            Cell::Text(format!("{:.1}%", row.budget_used_pct)),
        ]);
    }
    table
}

/// Render the campaign summary as a display table.
pub fn campaign_table(rows: &[CampaignRow]) -> Table {
    let mut table = Table::new(&[
        "Campaign Id",
        "Spend ($)",
        "Revenue D7",
        "Installs",
        "Payers D7",
        "CPI",
        "CPM",
        "IPM",
        "ROAS D7",
        "Payers %",
        "ARPI",
        "ARPP",
        "% of Budget Used",
    ]);
    for row in rows {
        table.push_row(&[
            Cell::Text(row.campaign.clone()),
            Cell::Num(row.totals.spend),
            Cell::Num(row.totals.revenue_d7),
            Cell::Num(row.totals.installs as f64),
            Cell::Num(row.totals.payers_d7 as f64),
            Cell::Num(row.kpis.cpi),
            Cell::Num(row.kpis.cpm),
            Cell::Num(row.kpis.ipm),
            Cell::Text(percent1(row.kpis.roas_d7)),
            Cell::Num(row.kpis.payer_rate),
            Cell::Num(row.kpis.arpi),
            Cell::Num(row.kpis.arpp),
            Cell::Text(format!("{:.1}%", row.budget_used_pct)),
        ]);
    }
    table
}

/// Render a creative breakdown as a display table.
pub fn creative_table(rows: &[CreativeRow]) -> Table {
    let mut table = Table::new(&[
        "Creative Id",
        "Spend ($)",
        "Revenue D7",
        "Installs",
        "Payers D7",
        "CPI",
        "CPM",
        "IPM",
        "ROAS D7",
        "Payers %",
        "ARPI",
        "ARPP",
    ]);
    for row in rows {
        table.push_row(&[
            Cell::Text(row.creative.clone()),
            Cell::Num(row.totals.spend),
            Cell::Num(row.totals.revenue_d7),
            Cell::Num(row.totals.installs as f64),
            Cell::Num(row.totals.payers_d7 as f64),
            Cell::Num(row.kpis.cpi),
            Cell::Num(row.kpis.cpm),
            Cell::Num(row.kpis.ipm),
            Cell::Text(percent1(row.kpis.roas_d7)),
            Cell::Num(row.kpis.payer_rate),
            Cell::Num(row.kpis.arpi),
            Cell::Num(row.kpis.arpp),
        ]);
    }
    table
}
