use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use svcdash::analytics::{analyze_hourly_patterns, calculate_trends, HourlyPatterns, TrendAnalysis};
use svcdash::config::Config;
use svcdash::filter::{filter_impact, validate_filters, FilterImpact, FilterValidation};
use svcdash::stats::{
    data_quality, operator_breakdown, status_breakdown, time_trends, DataQuality, OperatorSummary,
    StatusSummary, TimeTrends,
};
use svcdash::{aggregate, apply_filters, compute_stats, ChartCache, ChartDataBundle, FilterSpec, Record, Stats};

#[derive(Parser)]
#[command(name = "svcdash")]
#[command(about = "Service record statistics and chart data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// KPI statistics for the filtered records
    Stats(ReportArgs),
    /// Chart data bundle for the filtered records
    Chart(ReportArgs),
    /// Stats, charts and derived insights in one document
    Report(ReportArgs),
}

#[derive(Args)]
struct ReportArgs {
    /// JSON array of normalized records
    #[arg(short, long)]
    input: PathBuf,
    /// JSON filter specification
    #[arg(long)]
    filters: Option<PathBuf>,
    #[arg(long)]
    operator: Vec<String>,
    #[arg(long)]
    status: Vec<String>,
    #[arg(long)]
    client: Vec<String>,
    #[arg(long)]
    unit: Vec<String>,
    /// Inclusive start date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,
    /// Inclusive end date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    stats: Stats,
    charts: &'a ChartDataBundle,
    trends: TrendAnalysis,
    hourly_patterns: HourlyPatterns,
    operators: Vec<OperatorSummary>,
    statuses: Vec<StatusSummary>,
    time_trends: TimeTrends,
    data_quality: DataQuality,
    filter_impact: FilterImpact,
    filter_validation: FilterValidation,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

impl ReportArgs {
    fn filter_spec(&self) -> Result<FilterSpec> {
        let mut spec: FilterSpec = match &self.filters {
            Some(path) => read_json(path)?,
            None => FilterSpec::default(),
        };

        spec.operator.extend(self.operator.iter().cloned());
        spec.status.extend(self.status.iter().cloned());
        spec.client.extend(self.client.iter().cloned());
        spec.unit.extend(self.unit.iter().cloned());
        if self.from.is_some() {
            spec.date_from = self.from.clone();
        }
        if self.to.is_some() {
            spec.date_to = self.to.clone();
        }

        Ok(spec)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (Commands::Stats(args) | Commands::Chart(args) | Commands::Report(args)) = &cli.command;

    let records: Arc<[Record]> = read_json::<Vec<Record>>(&args.input)?.into();
    let filters = args.filter_spec()?;
    info!("Loaded {} records from {}", records.len(), args.input.display());

    let validation = validate_filters(&filters);
    for error in &validation.errors {
        tracing::warn!("Filter ignored: {}", error);
    }

    let filtered = apply_filters(&records, &filters);
    info!("{} records match the active filters", filtered.len());

    let cache = config
        .cache
        .enabled
        .then(|| ChartCache::from_config(&config.cache));
    let charts = match &cache {
        Some(cache) => cache.chart_data(&filtered, &filters),
        None => Arc::new(aggregate(&filtered, &filters)),
    };

    match &cli.command {
        Commands::Stats(_) => print_json(&compute_stats(&filtered)),
        Commands::Chart(_) => print_json(charts.as_ref()),
        Commands::Report(_) => print_json(&Report {
            stats: compute_stats(&filtered),
            charts: &charts,
            trends: calculate_trends(&charts.by_period),
            hourly_patterns: analyze_hourly_patterns(&charts.by_hour),
            operators: operator_breakdown(&filtered),
            statuses: status_breakdown(&filtered),
            time_trends: time_trends(&filtered),
            data_quality: data_quality(&filtered),
            filter_impact: filter_impact(records.len(), filtered.len()),
            filter_validation: validation,
        }),
    }
}
