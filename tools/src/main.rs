//! report-runner: headless report builder for the adboard core.
//!
//! Usage:
//!   report-runner --data Dataset.csv [--config budgets.json] [--app MaxiBingo]
//!   report-runner --data Dataset.csv --apps "MaxiBingo,Word Harbor" --from 2025-01-01 --to 2025-01-31
//!   report-runner --sample --seed 42 --days 30 [--out Sample.csv]
//!   report-runner --data Dataset.csv --ipc-mode

mod loader;
mod render;

use adboard_core::config::ReportConfig;
use adboard_core::filter::{DateRange, FilterCriteria};
use adboard_core::format::{thousands, Table};
use adboard_core::record::Dataset;
use adboard_core::report::{
    app_table, campaign_table, creative_table, day_table, AppKpis, BudgetGauge, ReportEngine,
};
use adboard_core::sample;
use adboard_core::types::Day;
use anyhow::{anyhow, Result};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    SetFilters {
        #[serde(default)]
        apps: Option<Vec<String>>,
        #[serde(default)]
        campaigns: Option<Vec<String>>,
        #[serde(default)]
        creatives: Option<Vec<String>>,
        #[serde(default)]
        from: Option<Day>,
        #[serde(default)]
        to: Option<Day>,
    },
    AppAnalysis {
        app: String,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    rows: usize,
    total_spend: f64,
    total_revenue_d7: f64,
    roas_pct: f64,
    budget_usage: Vec<BudgetGauge>,
    by_app: Table,
    by_day: Table,
    apps: Vec<String>,
    campaigns: Vec<String>,
    creatives: Vec<String>,
}

#[derive(serde::Serialize)]
struct AppAnalysisState {
    app: String,
    kpis: AppKpis,
    campaign_summary: Table,
    creative_summary: Table,
    campaign_details: Vec<CampaignDetailState>,
}

#[derive(serde::Serialize)]
struct CampaignDetailState {
    campaign: String,
    spend: f64,
    revenue_d7: f64,
    roas_pct: f64,
    creatives: Table,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let sample_mode = args.iter().any(|a| a == "--sample");
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let seed = parse_arg(&args, "--seed", 42u64);
    let days = parse_arg(&args, "--days", 30u32);

    let config = match flag_value(&args, "--config") {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };

    let dataset = if sample_mode {
        let start_raw = flag_value(&args, "--start").unwrap_or("2025-01-01");
        let start: Day = start_raw
            .parse()
            .map_err(|e| anyhow!("invalid --start '{start_raw}': {e}"))?;
        let records = sample::generate(seed, start, days);
        if let Some(path) = flag_value(&args, "--out") {
            loader::write_csv(&records, path)?;
            println!("wrote {} sample rows to {path}", records.len());
            return Ok(());
        }
        Dataset::new(records)
    } else {
        let path = flag_value(&args, "--data")
            .ok_or_else(|| anyhow!("--data <file.csv> is required (or use --sample)"))?;
        let (dataset, summary) = loader::load_csv(path)?;
        if !ipc_mode {
            println!("adboard report-runner");
            println!("  dataset:  {path}");
            println!("  rows:     {}", summary.rows);
            if summary.skipped > 0 {
                println!("  skipped:  {} malformed", summary.skipped);
            }
            println!();
        }
        dataset
    };

    let engine = ReportEngine::new(dataset, config);

    if ipc_mode {
        run_ipc_loop(&engine)?;
    } else {
        print_report(&engine, &args)?;
    }

    Ok(())
}

// ── One-shot report ────────────────────────────────────────────────────────

fn print_report(engine: &ReportEngine, args: &[String]) -> Result<()> {
    let criteria = criteria_from_args(engine.dataset(), args)?;

    let overview = engine.overview(&criteria);
    if overview.rows == 0 {
        println!("No rows match the current filters.");
        return Ok(());
    }

    println!("=== GENERAL OVERVIEW ===");
    println!("  Total Spend ($): {}", thousands(overview.total_spend));
    println!("  ROAS D7 (%):     {:.1}%", overview.roas_pct);
    println!();

    println!("=== VISUAL BUDGET USAGE ===");
    for gauge in engine.budget_usage(&criteria)? {
        render::print_gauge(&gauge);
    }
    println!();

    println!("=== PERFORMANCE BY APP ===");
    render::print_table(&app_table(&engine.by_app(&criteria)?));
    println!();

    println!("=== PERFORMANCE BY DAY ===");
    render::print_table(&day_table(&engine.by_day(&criteria)?));

    if let Some(app) = flag_value(args, "--app") {
        print_app_analysis(engine, app)?;
    }
    Ok(())
}

fn print_app_analysis(engine: &ReportEngine, app: &str) -> Result<()> {
    let kpis = engine.app_kpis(app);
    println!();
    println!("=== APP ANALYSIS: {app} ===");
    println!("  Spend ($):      {}", thousands(kpis.spend));
    println!("  Revenue D7 ($): {}", thousands(kpis.revenue_d7));
    println!("  Installs:       {}", thousands(kpis.installs as f64));
    println!("  ROAS D7 (%):    {:.1}%", kpis.roas_pct);
    println!();

    println!("--- Campaign Summary ---");
    render::print_table(&campaign_table(&engine.campaign_summary(app)?));
    println!();

    println!("--- Aggregated Creative Performance ---");
    render::print_table(&creative_table(&engine.creative_summary(app)?));

    for detail in engine.campaign_details(app)? {
        println!();
        println!(
            "--- Campaign {} | Spend: ${} | ROAS: {:.1}% ---",
            detail.campaign,
            thousands(detail.spend),
            detail.roas_pct
        );
        render::print_table(&creative_table(&detail.creatives));
    }
    Ok(())
}

fn criteria_from_args(dataset: &Dataset, args: &[String]) -> Result<FilterCriteria> {
    let mut criteria = FilterCriteria::matching_all(dataset);
    if let Some(apps) = flag_value(args, "--apps") {
        criteria = criteria.with_apps(split_list(apps));
    }
    if let Some(campaigns) = flag_value(args, "--campaigns") {
        criteria = criteria.with_campaigns(split_list(campaigns));
    }
    if let Some(creatives) = flag_value(args, "--creatives") {
        criteria = criteria.with_creatives(split_list(creatives));
    }

    let from = parse_day_flag(args, "--from")?;
    let to = parse_day_flag(args, "--to")?;
    if from.is_some() || to.is_some() {
        // A single bound narrows the observed range from that side.
        let bounds = criteria
            .date_range
            .or_else(|| dataset.date_bounds().map(|(lo, hi)| DateRange::new(lo, hi)));
        let start = from.or(bounds.map(|r| r.start));
        let end = to.or(bounds.map(|r| r.end));
        if let (Some(start), Some(end)) = (start, end) {
            criteria = criteria.with_date_range(start, end);
        }
    }
    Ok(criteria)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn parse_day_flag(args: &[String], flag: &str) -> Result<Option<Day>> {
    match flag_value(args, flag) {
        Some(raw) => raw
            .parse::<Day>()
            .map(Some)
            .map_err(|e| anyhow!("invalid {flag} date '{raw}': {e}")),
        None => Ok(None),
    }
}

// ── IPC mode ───────────────────────────────────────────────────────────────

fn run_ipc_loop(engine: &ReportEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    // The selection lives in the runner session, never in the core: every
    // command below recomputes its answer from the same dataset snapshot.
    let mut criteria = FilterCriteria::matching_all(engine.dataset());

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {
                let state = build_ui_state(engine, &criteria)?;
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
            IpcCommand::SetFilters {
                apps,
                campaigns,
                creatives,
                from,
                to,
            } => {
                apply_filters(
                    engine.dataset(),
                    &mut criteria,
                    apps,
                    campaigns,
                    creatives,
                    from,
                    to,
                );
                let state = build_ui_state(engine, &criteria)?;
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
            IpcCommand::AppAnalysis { app } => {
                let state = build_app_analysis(engine, &app)?;
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn apply_filters(
    dataset: &Dataset,
    criteria: &mut FilterCriteria,
    apps: Option<Vec<String>>,
    campaigns: Option<Vec<String>>,
    creatives: Option<Vec<String>>,
    from: Option<Day>,
    to: Option<Day>,
) {
    if let Some(apps) = apps {
        criteria.apps = apps.into_iter().collect();
    }
    if let Some(campaigns) = campaigns {
        criteria.campaigns = campaigns.into_iter().collect();
    }
    if let Some(creatives) = creatives {
        criteria.creatives = creatives.into_iter().collect();
    }
    if from.is_some() || to.is_some() {
        let bounds = criteria
            .date_range
            .or_else(|| dataset.date_bounds().map(|(lo, hi)| DateRange::new(lo, hi)));
        let start = from.or(bounds.map(|r| r.start));
        let end = to.or(bounds.map(|r| r.end));
        if let (Some(start), Some(end)) = (start, end) {
            criteria.date_range = Some(DateRange::new(start, end));
        }
    }
}

fn build_ui_state(engine: &ReportEngine, criteria: &FilterCriteria) -> Result<UiState> {
    let overview = engine.overview(criteria);
    let budget_usage = engine.budget_usage(criteria)?;
    let by_app = app_table(&engine.by_app(criteria)?);
    let by_day = day_table(&engine.by_day(criteria)?);
    let dataset = engine.dataset();

    Ok(UiState {
        rows: overview.rows,
        total_spend: overview.total_spend,
        total_revenue_d7: overview.total_revenue_d7,
        roas_pct: overview.roas_pct,
        budget_usage,
        by_app,
        by_day,
        apps: dataset.apps(),
        campaigns: dataset.campaigns(),
        creatives: dataset.creatives(),
    })
}

fn build_app_analysis(engine: &ReportEngine, app: &str) -> Result<AppAnalysisState> {
    let campaign_details = engine
        .campaign_details(app)?
        .into_iter()
        .map(|detail| CampaignDetailState {
            creatives: creative_table(&detail.creatives),
            campaign: detail.campaign,
            spend: detail.spend,
            revenue_d7: detail.revenue_d7,
            roas_pct: detail.roas_pct,
        })
        .collect();

    Ok(AppAnalysisState {
        app: app.to_string(),
        kpis: engine.app_kpis(app),
        campaign_summary: campaign_table(&engine.campaign_summary(app)?),
        creative_summary: creative_table(&engine.creative_summary(app)?),
        campaign_details,
    })
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
