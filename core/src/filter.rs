//! Row selection. Criteria are explicit values passed per call; there is no
//! ambient "current selection" anywhere in the crate.

use crate::record::{CampaignRecord, Dataset};
use crate::types::Day;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An inclusive calendar-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Day,
    pub end: Day,
}

impl DateRange {
    pub fn new(start: Day, end: Day) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, day: Day) -> bool {
        day >= self.start && day <= self.end
    }

    /// Days covered, counting both endpoints. Floors at 1 so a collapsed or
    /// inverted range never zeroes out a prorated budget.
    pub fn num_days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(1)
    }
}

/// Which rows an interaction wants to see.
///
/// Dimensions combine with AND; within a dimension a row matches if its
/// value is a member of the set. An empty set therefore matches nothing for
/// that dimension. Start from `matching_all` and narrow with the `with_*`
/// builders to mirror how a UI selection works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub apps: HashSet<String>,
    pub campaigns: HashSet<String>,
    pub creatives: HashSet<String>,
    pub date_range: Option<DateRange>,
}

impl FilterCriteria {
    /// The default selection: every observed app, campaign and creative,
    /// over the full observed date span.
    pub fn matching_all(dataset: &Dataset) -> Self {
        Self {
            apps: dataset.apps().into_iter().collect(),
            campaigns: dataset.campaigns().into_iter().collect(),
            creatives: dataset.creatives().into_iter().collect(),
            date_range: dataset
                .date_bounds()
                .map(|(start, end)| DateRange::new(start, end)),
        }
    }

    pub fn with_apps<I, S>(mut self, apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apps = apps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_campaigns<I, S>(mut self, campaigns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.campaigns = campaigns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_creatives<I, S>(mut self, creatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.creatives = creatives.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_date_range(mut self, start: Day, end: Day) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    fn matches(&self, record: &CampaignRecord) -> bool {
        self.apps.contains(&record.app)
            && self.campaigns.contains(&record.campaign)
            && self.creatives.contains(&record.creative)
            && self
                .date_range
                .map_or(true, |range| range.contains(record.date))
    }

    /// The subset of `records` satisfying every dimension. An empty result
    /// is valid; downstream aggregation over it is zero-valued, not an error.
    pub fn apply(&self, records: &[CampaignRecord]) -> Vec<CampaignRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
