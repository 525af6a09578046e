//! Grouped aggregation over filtered records.
//!
//! The one rule that keeps every view honest: ratio metrics are NEVER summed
//! or averaged across rows. Base measures (spend, installs, impressions,
//! revenue, payers) are summed per group, then the KPI calculator runs once
//! on the sums. Attribution is the exception and is averaged, since it is a
//! confidence score rather than an additive measure.
//!
//! Groups come back in a deterministic order (ascending over the rendered
//! key tuple). Views that want a different order re-sort the result.

use crate::error::{ReportError, ReportResult};
use crate::metrics::Kpis;
use crate::record::CampaignRecord;
use crate::types::Day;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A grouping dimension. `column()` names the matching dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    App,
    Campaign,
    Creative,
    Date,
}

impl GroupKey {
    pub fn column(&self) -> &'static str {
        match self {
            Self::App => "App Name",
            Self::Campaign => "Campaign Id",
            Self::Creative => "Creative Id",
            Self::Date => "Date",
        }
    }

    fn value_of(&self, record: &CampaignRecord) -> GroupValue {
        match self {
            Self::App => GroupValue::Text(record.app.clone()),
            Self::Campaign => GroupValue::Text(record.campaign.clone()),
            Self::Creative => GroupValue::Text(record.creative.clone()),
            Self::Date => GroupValue::Day(record.date),
        }
    }
}

/// One grouping key's value for one group. Days stay typed so date views
/// can sort chronologically without re-parsing rendered strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupValue {
    Day(Day),
    Text(String),
}

impl GroupValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Day(_) => None,
        }
    }

    pub fn as_day(&self) -> Option<Day> {
        match self {
            Self::Day(d) => Some(*d),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Summed base measures plus the attribution mean for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotals {
    pub spend: f64,
    pub installs: u64,
    pub impressions: u64,
    pub revenue_d7: f64,
    pub payers_d7: u64,
    /// Mean attribution fraction over the group's rows.
    pub attribution_mean: f64,
    /// Number of source rows folded into the group.
    pub rows: usize,
}

impl GroupTotals {
    /// Recompute the ratio metrics from this group's sums.
    pub fn kpis(&self) -> Kpis {
        Kpis::compute(
            self.spend,
            self.installs,
            self.impressions,
            self.revenue_d7,
            self.payers_d7,
        )
    }
}

/// One distinct key combination with its totals and recomputed KPIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateGroup {
    /// (key, value) pairs in the order the keys were requested.
    pub keys: Vec<(GroupKey, GroupValue)>,
    pub totals: GroupTotals,
    pub kpis: Kpis,
}

impl AggregateGroup {
    /// The value for one grouping key, if that key was requested.
    pub fn key_value(&self, key: GroupKey) -> Option<&GroupValue> {
        self.keys
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value)
    }
}

#[derive(Default)]
struct Accumulator {
    spend: f64,
    installs: u64,
    impressions: u64,
    revenue_d7: f64,
    payers_d7: u64,
    attribution_sum: f64,
    rows: usize,
}

impl Accumulator {
    fn fold(&mut self, record: &CampaignRecord) {
        self.spend += record.spend;
        self.installs += record.installs;
        self.impressions += record.impressions;
        self.revenue_d7 += record.revenue_d7;
        self.payers_d7 += record.payers_d7;
        self.attribution_sum += record.attribution;
        self.rows += 1;
    }
}

/// Group `records` by the requested keys, sum base measures per group and
/// recompute the KPIs from those sums.
///
/// Empty input is a valid empty result. An empty key list is a caller bug
/// and is reported as `NoGroupKeys`.
pub fn aggregate(
    records: &[CampaignRecord],
    keys: &[GroupKey],
) -> ReportResult<Vec<AggregateGroup>> {
    if keys.is_empty() {
        return Err(ReportError::NoGroupKeys);
    }

    let mut groups: BTreeMap<Vec<GroupValue>, Accumulator> = BTreeMap::new();
    for record in records {
        let key: Vec<GroupValue> = keys.iter().map(|k| k.value_of(record)).collect();
        groups.entry(key).or_default().fold(record);
    }

    let out: Vec<AggregateGroup> = groups
        .into_iter()
        .map(|(values, acc)| {
            let totals = GroupTotals {
                spend: acc.spend,
                installs: acc.installs,
                impressions: acc.impressions,
                revenue_d7: acc.revenue_d7,
                payers_d7: acc.payers_d7,
                attribution_mean: acc.attribution_sum / acc.rows as f64,
                rows: acc.rows,
            };
            let kpis = totals.kpis();
            AggregateGroup {
                keys: keys.iter().copied().zip(values).collect(),
                totals,
                kpis,
            }
        })
        .collect();

    log::debug!(
        "aggregated {} records into {} groups by {:?}",
        records.len(),
        out.len(),
        keys
    );
    Ok(out)
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> Day {
        s.parse().unwrap()
    }

    fn row(app: &str, campaign: &str, date: &str, spend: f64) -> CampaignRecord {
        CampaignRecord {
            app: app.into(),
            campaign: campaign.into(),
            creative: format!("{campaign}-v1"),
            date: day(date),
            spend,
            installs: 10,
            impressions: 5_000,
            revenue_d7: spend / 2.0,
            payers_d7: 2,
            attribution: 0.8,
        }
    }

    #[test]
    fn same_key_rows_merge_by_summing() {
        let records = vec![
            row("Game", "c1", "2025-03-01", 100.0),
            row("Game", "c1", "2025-03-01", 200.0),
        ];
        let groups = aggregate(&records, &[GroupKey::Date]).unwrap();
        assert_eq!(groups.len(), 1, "same-date rows must land in one group");
        let g = &groups[0];
        assert_eq!(g.totals.spend, 300.0);
        assert_eq!(g.totals.installs, 20);
        assert_eq!(g.totals.impressions, 10_000);
        assert_eq!(g.totals.payers_d7, 4);
        assert_eq!(g.totals.rows, 2);
    }

    #[test]
    fn attribution_is_averaged_not_summed() {
        let mut a = row("Game", "c1", "2025-03-01", 100.0);
        let mut b = row("Game", "c1", "2025-03-01", 100.0);
        a.attribution = 0.6;
        b.attribution = 1.0;
        let groups = aggregate(&[a, b], &[GroupKey::App]).unwrap();
        assert!((groups[0].totals.attribution_mean - 0.8).abs() < 1e-9);
    }

    #[test]
    fn kpis_come_from_group_sums_not_row_averages() {
        // Row KPIs: CPI 10 and CPI 40. Averaging rows would give CPI 25;
        // recomputing from sums gives (100+200)/(10+5) = 20.
        let mut a = row("Game", "c1", "2025-03-01", 100.0);
        let mut b = row("Game", "c1", "2025-03-02", 200.0);
        a.installs = 10;
        b.installs = 5;
        let groups = aggregate(&[a, b], &[GroupKey::App]).unwrap();
        assert!((groups[0].kpis.cpi - 20.0).abs() < 1e-9);
    }

    #[test]
    fn re_aggregating_group_totals_is_idempotent() {
        // Folding each group back into a single record and aggregating again
        // must reproduce the same totals and KPIs.
        let records = vec![
            row("Alpha", "c1", "2025-03-01", 100.0),
            row("Alpha", "c2", "2025-03-02", 250.0),
            row("Beta", "c3", "2025-03-01", 40.0),
        ];
        let first = aggregate(&records, &[GroupKey::App]).unwrap();

        let folded: Vec<CampaignRecord> = first
            .iter()
            .map(|g| CampaignRecord {
                app: g.key_value(GroupKey::App).unwrap().to_string(),
                campaign: "folded".into(),
                creative: "folded".into(),
                date: day("2025-03-01"),
                spend: g.totals.spend,
                installs: g.totals.installs,
                impressions: g.totals.impressions,
                revenue_d7: g.totals.revenue_d7,
                payers_d7: g.totals.payers_d7,
                attribution: g.totals.attribution_mean,
            })
            .collect();
        let second = aggregate(&folded, &[GroupKey::App]).unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.totals.spend, b.totals.spend);
            assert_eq!(a.totals.installs, b.totals.installs);
            assert_eq!(a.totals.impressions, b.totals.impressions);
            assert_eq!(a.totals.revenue_d7, b.totals.revenue_d7);
            assert_eq!(a.totals.payers_d7, b.totals.payers_d7);
            assert_eq!(a.totals.attribution_mean, b.totals.attribution_mean);
            assert_eq!(a.kpis, b.kpis, "KPIs must survive re-aggregation");
        }
    }

    #[test]
    fn result_is_independent_of_row_order() {
        let a = row("Alpha", "c1", "2025-03-01", 10.0);
        let b = row("Beta", "c2", "2025-03-02", 20.0);
        let c = row("Alpha", "c1", "2025-03-02", 30.0);
        let forward = aggregate(&[a.clone(), b.clone(), c.clone()], &[GroupKey::App]).unwrap();
        let reversed = aggregate(&[c, b, a], &[GroupKey::App]).unwrap();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn multi_key_grouping_splits_on_every_dimension() {
        let records = vec![
            row("Game", "c1", "2025-03-01", 10.0),
            row("Game", "c1", "2025-03-02", 10.0),
            row("Game", "c2", "2025-03-01", 10.0),
        ];
        let groups = aggregate(&records, &[GroupKey::Campaign, GroupKey::Date]).unwrap();
        assert_eq!(groups.len(), 3);
        // Deterministic ascending order over the key tuple.
        assert_eq!(
            groups[0].key_value(GroupKey::Campaign).unwrap().to_string(),
            "c1"
        );
        assert_eq!(
            groups[0].key_value(GroupKey::Date).unwrap().to_string(),
            "2025-03-01"
        );
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let groups = aggregate(&[], &[GroupKey::App]).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn empty_key_list_is_rejected() {
        let records = vec![row("Game", "c1", "2025-03-01", 10.0)];
        let err = aggregate(&records, &[]).unwrap_err();
        assert!(matches!(err, ReportError::NoGroupKeys));
    }

    #[test]
    fn one_row_group_matches_direct_record_metrics() {
        let record = row("Game", "c1", "2025-03-01", 100.0);
        let direct = crate::metrics::Kpis::from_record(&record);
        let groups = aggregate(&[record], &[GroupKey::Creative]).unwrap();
        assert_eq!(groups[0].kpis, direct);
    }

    #[test]
    fn date_groups_sort_chronologically() {
        let records = vec![
            row("Game", "c1", "2025-03-09", 1.0),
            row("Game", "c1", "2025-02-28", 1.0),
            row("Game", "c1", "2025-03-01", 1.0),
        ];
        let groups = aggregate(&records, &[GroupKey::Date]).unwrap();
        let days: Vec<Day> = groups
            .iter()
            .filter_map(|g| g.key_value(GroupKey::Date).and_then(GroupValue::as_day))
            .collect();
        assert_eq!(
            days,
            vec![day("2025-02-28"), day("2025-03-01"), day("2025-03-09")]
        );
    }
}
