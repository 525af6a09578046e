//! Raw performance rows and the immutable dataset handle.
//!
//! RULE: ingestion owns all text cleaning. By the time a record reaches this
//! crate every field is typed and non-negative; absent numeric cells have
//! already collapsed to zero. Nothing downstream re-parses strings.

use crate::types::{AppName, CampaignId, CreativeId, Day};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// One fully parsed row of the campaign performance dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub app: AppName,
    pub campaign: CampaignId,
    pub creative: CreativeId,
    pub date: Day,
    /// Ad spend for the day, in account currency.
    #[serde(default)]
    pub spend: f64,
    #[serde(default)]
    pub installs: u64,
    #[serde(default)]
    pub impressions: u64,
    /// Revenue attributed within seven days of install.
    #[serde(default)]
    pub revenue_d7: f64,
    /// Paying users within seven days of install.
    #[serde(default)]
    pub payers_d7: u64,
    /// Attribution confidence as a fraction in [0, 1].
    #[serde(default)]
    pub attribution: f64,
}

/// The loaded dataset: read once, then shared as an immutable snapshot.
///
/// Every interaction recomputes its view from the same snapshot, so two
/// views produced from one handle can never disagree about the underlying
/// rows. Cloning the handle is a reference-count bump.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Arc<Vec<CampaignRecord>>,
}

impl Dataset {
    pub fn new(records: Vec<CampaignRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    pub fn records(&self) -> &[CampaignRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct app names, in first-seen order.
    pub fn apps(&self) -> Vec<AppName> {
        distinct(self.records.iter().map(|r| &r.app))
    }

    /// Distinct campaign ids, in first-seen order.
    pub fn campaigns(&self) -> Vec<CampaignId> {
        distinct(self.records.iter().map(|r| &r.campaign))
    }

    /// Distinct creative ids, in first-seen order.
    pub fn creatives(&self) -> Vec<CreativeId> {
        distinct(self.records.iter().map(|r| &r.creative))
    }

    /// Earliest and latest dates present, or None for an empty dataset.
    pub fn date_bounds(&self) -> Option<(Day, Day)> {
        let mut days = self.records.iter().map(|r| r.date);
        let first = days.next()?;
        let (mut lo, mut hi) = (first, first);
        for day in days {
            if day < lo {
                lo = day;
            }
            if day > hi {
                hi = day;
            }
        }
        Some((lo, hi))
    }
}

fn distinct<'a, I>(values: I) -> Vec<String>
where
    I: Iterator<Item = &'a String>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        if seen.insert(value.as_str()) {
            out.push(value.clone());
        }
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> Day {
        s.parse().unwrap()
    }

    fn row(app: &str, campaign: &str, date: &str) -> CampaignRecord {
        CampaignRecord {
            app: app.into(),
            campaign: campaign.into(),
            creative: format!("{campaign}-cr"),
            date: day(date),
            spend: 10.0,
            installs: 1,
            impressions: 100,
            revenue_d7: 5.0,
            payers_d7: 0,
            attribution: 0.9,
        }
    }

    #[test]
    fn distinct_values_keep_first_seen_order() {
        let dataset = Dataset::new(vec![
            row("Beta", "c1", "2025-01-02"),
            row("Alpha", "c2", "2025-01-01"),
            row("Beta", "c1", "2025-01-03"),
        ]);
        assert_eq!(dataset.apps(), vec!["Beta".to_string(), "Alpha".to_string()]);
        assert_eq!(
            dataset.campaigns(),
            vec!["c1".to_string(), "c2".to_string()]
        );
    }

    #[test]
    fn date_bounds_span_min_and_max() {
        let dataset = Dataset::new(vec![
            row("A", "c1", "2025-01-05"),
            row("A", "c1", "2025-01-01"),
            row("A", "c1", "2025-01-03"),
        ]);
        assert_eq!(
            dataset.date_bounds(),
            Some((day("2025-01-01"), day("2025-01-05")))
        );
    }

    #[test]
    fn empty_dataset_has_no_bounds() {
        let dataset = Dataset::new(Vec::new());
        assert!(dataset.is_empty());
        assert_eq!(dataset.date_bounds(), None);
        assert!(dataset.apps().is_empty());
    }
}
