use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rainshield::analysis::{self, PremiumDistribution, RunPremium, YearStats};
use rainshield::config::QuoteConfig;
use rainshield::dashboard;
use rainshield::provider::{
    CsvFileProvider, OpenMeteoProvider, SyntheticProvider, WeatherDataProvider,
};
use rainshield::report;
use rainshield::quote;

#[derive(Parser)]
#[command(name = "rainshield", version, about = "Parametric rainfall insurance pricing")]
struct Cli {
    /// TOML file overriding the built-in defaults.
    #[arg(long, global = true, env = "RAINSHIELD_CONFIG")]
    config: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate the annual premium and replay the history with and without cover.
    Quote(QuoteArgs),
    /// Premium distribution over many synthetic rainfall histories.
    Stability(StabilityArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum Source {
    OpenMeteo,
    Csv,
    Synthetic,
}

#[derive(Args)]
struct BusinessArgs {
    #[arg(long)]
    max_daily_revenue: Option<f64>,
    #[arg(long)]
    fixed_daily_cost: Option<f64>,
    #[arg(long)]
    pivot_rainfall_mm: Option<f64>,
}

#[derive(Args)]
struct QuoteArgs {
    #[arg(long)]
    location: Option<String>,
    /// First day of the history (YYYY-MM-DD).
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last day of the history (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    end: Option<NaiveDate>,
    #[command(flatten)]
    business: BusinessArgs,
    #[arg(long, value_enum, default_value = "open-meteo")]
    source: Source,
    /// `date,rainfall_mm` file for `--source csv`.
    #[arg(long, required_if_eq("source", "csv"))]
    file: Option<PathBuf>,
    /// Seed for `--source synthetic`.
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Write the per-day table as CSV.
    #[arg(long)]
    table: Option<PathBuf>,
    /// Write the two chart series as JSON.
    #[arg(long)]
    chart: Option<PathBuf>,
    /// Print a JSON summary instead of the text documents.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct StabilityArgs {
    #[arg(long, default_value_t = 200)]
    runs: u64,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Length of each synthetic history in years.
    #[arg(long, default_value_t = 10)]
    years: u32,
    #[command(flatten)]
    business: BusinessArgs,
    /// Write per-run premiums as CSV.
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => QuoteConfig::load(path)?,
        None => QuoteConfig::canonical(),
    };

    match cli.command {
        Command::Quote(args) => run_quote(config, args),
        Command::Stability(args) => run_stability(config, args),
    }
}

fn apply_business(config: &mut QuoteConfig, args: &BusinessArgs) {
    if let Some(v) = args.max_daily_revenue {
        config.business.max_daily_revenue = v;
    }
    if let Some(v) = args.fixed_daily_cost {
        config.business.fixed_daily_cost = v;
    }
    if let Some(v) = args.pivot_rainfall_mm {
        config.business.pivot_rainfall_mm = v;
    }
}

fn run_quote(mut config: QuoteConfig, args: QuoteArgs) -> Result<()> {
    if let Some(loc) = args.location {
        config.location = loc;
    }
    if args.start.is_some() {
        config.start_date = args.start;
    }
    if args.end.is_some() {
        config.end_date = args.end;
    }
    apply_business(&mut config, &args.business);

    let provider: Box<dyn WeatherDataProvider> = match args.source {
        Source::OpenMeteo => Box::new(OpenMeteoProvider::new(config.open_meteo.clone())?),
        Source::Csv => {
            let path = args.file.as_ref().context("--file is required with --source csv")?;
            Box::new(CsvFileProvider::new(path))
        }
        Source::Synthetic => Box::new(SyntheticProvider::new(config.synthetic, args.seed)),
    };

    let today = Local::now().date_naive();
    let q = quote::run(&config, provider.as_ref(), today)
        .with_context(|| format!("quoting {} from {}", config.location, provider.name()))?;

    if let Some(path) = &args.table {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        dashboard::write_table_csv(&dashboard::daily_table(&q.retrospective), BufWriter::new(file))?;
        info!(path = %path.display(), "per-day table written");
    }
    if let Some(path) = &args.chart {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &dashboard::chart_series(&q.retrospective))?;
        info!(path = %path.display(), "chart data written");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&q)?);
        return Ok(());
    }

    let currency = &config.currency;
    println!("{}", report::quote_document(&q.params, &q.estimate, currency).dated(today).render_text());
    print_year_table(&q.years, q.estimator.annualization_days(), currency);
    print!(
        "{}",
        report::retrospective_document(&q.estimate, &q.retrospective, currency)
            .dated(today)
            .render_text()
    );
    Ok(())
}

fn print_year_table(years: &[YearStats], annualization_days: f64, currency: &str) {
    if years.is_empty() {
        return;
    }
    println!("=== Year character table ===");
    println!(
        "{:>4} | {:>4} | {:>9} | {:>7} | {:>14} | {:>14} | {:>14}",
        "Year", "Days", "LossDays#", "LossD%", "Loss", "Net", "BurnCost"
    );
    println!("{}", "-".repeat(4 + 3 + 4 + 3 + 9 + 3 + 7 + 3 + 14 + 3 + 14 + 3 + 14));
    for y in years {
        println!(
            "{:>4} | {:>4} | {:>9} | {:>6.1}% | {:>14.2} | {:>14.2} | {:>14.2}",
            y.year,
            y.days,
            y.loss_days,
            y.loss_day_ratio() * 100.0,
            y.total_loss,
            y.net_outcome,
            y.burn_cost(annualization_days),
        );
    }
    println!("(amounts in {currency})\n");
}

fn run_stability(mut config: QuoteConfig, args: StabilityArgs) -> Result<()> {
    apply_business(&mut config, &args.business);
    let params = config.business_parameters().context("invalid business parameters")?;
    let estimator = config.estimator().context("invalid pricing constants")?;
    let end = config.end_date.unwrap_or_else(|| Local::now().date_naive());
    let range = rainshield::types::DateRange::trailing_years(end, args.years)?;

    info!(runs = args.runs, seed = args.seed, days = range.days(), "pricing synthetic histories");
    let runs = analysis::premium_runs(
        &config.synthetic,
        range,
        &params,
        &estimator,
        args.seed,
        args.runs,
    )?;

    if let Some(path) = &args.csv {
        write_runs_csv(&runs, path)?;
        info!(path = %path.display(), "per-run premiums written");
    }

    match analysis::analyse_runs(&runs) {
        Some(dist) => print_distribution(&dist, args.runs, &config.currency),
        None => warn!("distribution requires >= 2 runs"),
    }
    Ok(())
}

fn write_runs_csv(runs: &[RunPremium], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = csv::Writer::from_writer(BufWriter::new(file));
    for run in runs {
        w.serialize(run)?;
    }
    w.flush()?;
    Ok(())
}

fn print_distribution(dist: &PremiumDistribution, n_runs: u64, currency: &str) {
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "=== Premium distribution (N={n_runs} synthetic histories) ===");
    let _ = writeln!(
        out,
        "{:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10}",
        "", "min", "p5", "p25", "p50", "p75", "p95", "max", "mean", "stddev"
    );
    for (label, ds) in [("Premium", &dist.premium), ("Impact%", &dist.impact_percent)] {
        let _ = writeln!(
            out,
            "{:>10} | {:>10.2} | {:>10.2} | {:>10.2} | {:>10.2} | {:>10.2} | {:>10.2} | {:>10.2} | {:>10.2} | {:>10.2}",
            label, ds.min, ds.p5, ds.p25, ds.p50, ds.p75, ds.p95, ds.max, ds.mean, ds.std_dev,
        );
    }
    let _ = writeln!(out, "Premium CV: {:.3}  (premium in {currency})", dist.premium_cv);
}
