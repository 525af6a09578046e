//! Deterministic sample-dataset generation using a curated app portfolio.
//!
//! Provides realistic campaign performance rows for demos and bulk tests.
//! All generation is deterministic (same seed = same records).

use crate::record::CampaignRecord;
use crate::rng::SampleRng;
use crate::types::Day;

/// Apps in the sample portfolio. MaxiBingo is included so generated data
/// always exercises a non-default budget cap.
fn portfolio_apps() -> &'static [&'static str] {
    &[
        "MaxiBingo",
        "Solitaire Voyage",
        "Puzzle Safari",
        "Word Harbor",
        "Merge Meadows",
    ]
}

/// Creative themes, used to make creative ids readable.
fn creative_themes() -> &'static [&'static str] {
    &["intro", "gameplay", "winner", "bonus", "retro", "holiday"]
}

/// Generate `days` days of campaign rows starting at `start`.
///
/// Every app runs a small stable set of campaigns, each with a handful of
/// creatives. A creative skips a day now and then, so date coverage is
/// realistic rather than a perfect grid. Payer counts can come out zero on
/// thin days, which keeps the degenerate KPI paths exercised downstream.
pub fn generate(seed: u64, start: Day, days: u32) -> Vec<CampaignRecord> {
    let mut rng = SampleRng::new(seed);
    let mut records = Vec::new();
    let mut campaign_seq = 1_000u32;
    let mut creative_seq = 200u32;

    for app in portfolio_apps() {
        let campaign_count = 2 + rng.next_u64_below(2); // 2..=3
        for _ in 0..campaign_count {
            campaign_seq += 1;
            let campaign = format!("CMP-{campaign_seq}");
            let creative_count = 2 + rng.next_u64_below(3); // 2..=4
            for _ in 0..creative_count {
                creative_seq += 1;
                let themes = creative_themes();
                let theme = themes[rng.next_u64_below(themes.len() as u64) as usize];
                let creative = format!("CR-{creative_seq}-{theme}");

                for offset in 0..days {
                    // Dark day: the network served nothing for this creative.
                    if rng.chance(0.15) {
                        continue;
                    }
                    let date = start + chrono::Duration::days(offset as i64);
                    let spend = rng.pareto(40.0, 1.6).min(3_000.0);
                    let cpm = rng.uniform(8.0, 24.0);
                    let impressions = (spend / cpm * 1_000.0) as u64;
                    let ipm = rng.uniform(1.5, 9.0);
                    let installs = (impressions as f64 / 1_000.0 * ipm) as u64;
                    let payer_share = rng.uniform(0.02, 0.12);
                    let payers_d7 = (installs as f64 * payer_share) as u64;
                    let arpp = rng.uniform(8.0, 60.0);
                    let revenue_d7 = payers_d7 as f64 * arpp;
                    let attribution = rng.uniform(0.55, 0.98);

                    records.push(CampaignRecord {
                        app: (*app).to_string(),
                        campaign: campaign.clone(),
                        creative: creative.clone(),
                        date,
                        spend,
                        installs,
                        impressions,
                        revenue_d7,
                        payers_d7,
                        attribution,
                    });
                }
            }
        }
    }

    log::info!(
        "generated {} sample records over {} days (seed {seed})",
        records.len(),
        days
    );
    records
}

// ── Tests ──────────────────────────────────────────────────────────────────
