use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Revenue and cost profile of the insured business.
///
/// Amounts are currency units per day; the pivot is in millimetres.
/// Only constructible through [`BusinessParameters::new`], so a value in hand
/// always has `pivot_rainfall_mm > 0` and finite, non-negative amounts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBusinessParameters")]
pub struct BusinessParameters {
    max_daily_revenue: f64,
    fixed_daily_cost: f64,
    pivot_rainfall_mm: f64,
}

#[derive(Deserialize)]
struct RawBusinessParameters {
    max_daily_revenue: f64,
    fixed_daily_cost: f64,
    pivot_rainfall_mm: f64,
}

impl TryFrom<RawBusinessParameters> for BusinessParameters {
    type Error = ModelError;

    fn try_from(raw: RawBusinessParameters) -> Result<Self, Self::Error> {
        BusinessParameters::new(raw.max_daily_revenue, raw.fixed_daily_cost, raw.pivot_rainfall_mm)
    }
}

impl BusinessParameters {
    pub fn new(
        max_daily_revenue: f64,
        fixed_daily_cost: f64,
        pivot_rainfall_mm: f64,
    ) -> Result<Self, ModelError> {
        if !max_daily_revenue.is_finite() || max_daily_revenue < 0.0 {
            return Err(ModelError::invalid(
                "max_daily_revenue",
                max_daily_revenue,
                "must be finite and non-negative",
            ));
        }
        if !fixed_daily_cost.is_finite() || fixed_daily_cost < 0.0 {
            return Err(ModelError::invalid(
                "fixed_daily_cost",
                fixed_daily_cost,
                "must be finite and non-negative",
            ));
        }
        if !pivot_rainfall_mm.is_finite() || pivot_rainfall_mm <= 0.0 {
            return Err(ModelError::invalid(
                "pivot_rainfall_mm",
                pivot_rainfall_mm,
                "must be finite and positive",
            ));
        }
        Ok(BusinessParameters { max_daily_revenue, fixed_daily_cost, pivot_rainfall_mm })
    }

    pub fn max_daily_revenue(&self) -> f64 {
        self.max_daily_revenue
    }

    pub fn fixed_daily_cost(&self) -> f64 {
        self.fixed_daily_cost
    }

    pub fn pivot_rainfall_mm(&self) -> f64 {
        self.pivot_rainfall_mm
    }
}

/// Total rainfall for one calendar day, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RainfallObservation {
    pub date: NaiveDate,
    pub rainfall_mm: f64,
}

/// Inclusive calendar window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ModelError> {
        if start > end {
            return Err(ModelError::InvalidDateRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// The `years`-long window ending on `end`.
    /// Falls back to the last valid day of the month (29 Feb → 28 Feb).
    pub fn trailing_years(end: NaiveDate, years: u32) -> Result<Self, ModelError> {
        let start = end
            .checked_sub_months(Months::new(12 * years))
            .ok_or(ModelError::InvalidDateRange { start: NaiveDate::MIN, end })?;
        DateRange::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days in the window, both ends included.
    pub fn days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take(self.days())
    }
}

/// Chronological, gap-free daily rainfall record.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HistoricalSeries {
    observations: Vec<RainfallObservation>,
}

impl HistoricalSeries {
    /// Validate that `observations` advance by exactly one day each step.
    pub fn new(observations: Vec<RainfallObservation>) -> Result<Self, ModelError> {
        for pair in observations.windows(2) {
            let expected = pair[0].date.succ_opt().unwrap_or(NaiveDate::MAX);
            if pair[1].date != expected {
                return Err(ModelError::NonContiguousSeries { expected, found: pair[1].date });
            }
        }
        Ok(HistoricalSeries { observations })
    }

    /// Series starting at `start` with one value per consecutive day.
    pub fn from_daily(start: NaiveDate, values: impl IntoIterator<Item = f64>) -> Self {
        let observations = start
            .iter_days()
            .zip(values)
            .map(|(date, rainfall_mm)| RainfallObservation { date, rainfall_mm })
            .collect();
        HistoricalSeries { observations }
    }

    pub fn empty() -> Self {
        HistoricalSeries::default()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[RainfallObservation] {
        &self.observations
    }

    pub fn iter(&self) -> impl Iterator<Item = &RainfallObservation> {
        self.observations.iter()
    }

    /// Window covered by the series; `None` when empty.
    pub fn range(&self) -> Option<DateRange> {
        let first = self.observations.first()?;
        let last = self.observations.last()?;
        Some(DateRange { start: first.date, end: last.date })
    }
}
