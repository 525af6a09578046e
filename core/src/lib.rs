//! adboard-core — the reporting engine behind the campaign dashboard.
//!
//! PIPELINE ORDER (fixed, documented, never reordered):
//!   1. `record`      raw performance rows and the shared dataset handle
//!   2. `filter`      explicit row selection (apps, campaigns, creatives, dates)
//!   3. `aggregate`   grouping at app / campaign / creative / day granularity
//!   4. `budget`      per-app daily caps prorated over the viewed window
//!   5. `format`      display rendering, the last step and nothing but strings
//!
//! RULES:
//!   - KPIs are recomputed from group sums, never averaged across rows.
//!   - Every interaction is a full recompute against the snapshot.
//!   - The crate holds no hidden state; criteria and config are parameters.
//!
//! `report` ties the stages into the views a UI shows.

pub mod aggregate;
pub mod budget;
pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod metrics;
pub mod record;
pub mod report;
pub mod rng;
pub mod sample;
pub mod types;
