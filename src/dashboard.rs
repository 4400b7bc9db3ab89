//! Per-day table and chart series for display.

use std::io::Write;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::retrospective::RetrospectiveResult;

/// Day/month/year, as shown in the table and on the chart axis.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Number of x-axis labels the chart aims for.
const TARGET_TICKS: usize = 10;

fn display_date<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&date.format(DISPLAY_DATE_FORMAT))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRow {
    #[serde(serialize_with = "display_date")]
    pub date: NaiveDate,
    pub rainfall_mm: f64,
    pub outcome_uninsured: f64,
    pub outcome_insured: f64,
}

pub fn daily_table(result: &RetrospectiveResult) -> Vec<DailyRow> {
    result
        .dates
        .iter()
        .zip(&result.rainfall_mm)
        .zip(result.per_day_uninsured.iter().zip(&result.per_day_insured))
        .map(|((&date, &rainfall_mm), (&outcome_uninsured, &outcome_insured))| DailyRow {
            date,
            rainfall_mm,
            outcome_uninsured,
            outcome_insured,
        })
        .collect()
}

pub fn write_table_csv<W: Write>(rows: &[DailyRow], writer: W) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_writer(writer);
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: &'static str,
    pub values: Vec<f64>,
}

/// Two daily series on a shared date axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub dates: Vec<String>,
    pub series: [ChartSeries; 2],
    /// Indices into `dates` that get an axis label.
    pub ticks: Vec<usize>,
}

/// Label every `max(1, n / 10)`-th day.
pub fn tick_indices(n: usize) -> Vec<usize> {
    let step = (n / TARGET_TICKS).max(1);
    (0..n).step_by(step).collect()
}

pub fn chart_series(result: &RetrospectiveResult) -> ChartData {
    ChartData {
        dates: result.dates.iter().map(|d| d.format(DISPLAY_DATE_FORMAT).to_string()).collect(),
        series: [
            ChartSeries { name: "Uninsured", values: result.per_day_uninsured.clone() },
            ChartSeries { name: "Insured", values: result.per_day_insured.clone() },
        ],
        ticks: tick_indices(result.days()),
    }
}
