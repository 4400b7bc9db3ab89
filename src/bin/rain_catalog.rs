use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Result;
use chrono::{Datelike, Local};
use clap::Parser;
use rainshield::config::QuoteConfig;
use rainshield::provider::{SyntheticProvider, WeatherDataProvider};
use rainshield::types::DateRange;

/// Dump a synthetic daily rainfall series as NDJSON.
#[derive(Parser)]
#[command(name = "rain_catalog")]
struct Cli {
    /// Years of history ending at the configured end date (or today).
    #[arg(default_value_t = 10)]
    years: u32,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => QuoteConfig::load(path)?,
        None => QuoteConfig::canonical(),
    };
    let location = cli.location.unwrap_or(config.location);
    let end = config.end_date.unwrap_or_else(|| Local::now().date_naive());
    let range = DateRange::trailing_years(end, cli.years)?;

    let provider = SyntheticProvider::new(config.synthetic, cli.seed);
    let series = provider.fetch_daily_rainfall(&location, range)?;

    // Write NDJSON to stdout.
    let mut out = BufWriter::new(std::io::stdout().lock());
    for obs in series.iter() {
        serde_json::to_writer(&mut out, obs)?;
        writeln!(out)?;
    }
    out.flush()?;

    // Wet-day summary to stderr.
    let mut wet_days = 0usize;
    let mut wet_total = 0.0_f64;
    let mut wettest = 0.0_f64;
    let mut by_month: BTreeMap<u32, (usize, usize, f64)> = BTreeMap::new();
    for obs in series.iter() {
        let m = by_month.entry(obs.date.month()).or_insert((0, 0, 0.0));
        m.0 += 1;
        if obs.rainfall_mm > 0.0 {
            wet_days += 1;
            wet_total += obs.rainfall_mm;
            wettest = wettest.max(obs.rainfall_mm);
            m.1 += 1;
            m.2 += obs.rainfall_mm;
        }
    }

    let mean_wet = if wet_days == 0 { 0.0 } else { wet_total / wet_days as f64 };
    eprintln!(
        "rain_catalog: {} {} → {}, {} days, {} wet ({:.1}%), mean_wet={:.2} mm, max={:.2} mm",
        location,
        range.start(),
        range.end(),
        series.len(),
        wet_days,
        wet_days as f64 / series.len().max(1) as f64 * 100.0,
        mean_wet,
        wettest,
    );
    for (month, (days, wet, total)) in by_month {
        let ratio = wet as f64 / days as f64;
        eprintln!("  month={month:>2}  days={days:>4}  wet={wet:>4}  wet_ratio={ratio:.3}  total={total:>8.1} mm");
    }
    Ok(())
}
