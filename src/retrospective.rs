//! Retrospective comparison of insured and uninsured outcomes.
//!
//! The contract is modelled as a floor at zero: every loss day is reimbursed
//! up to breakeven and profit days are untouched. No deductible, no cap.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::ModelError;
use crate::outcome::series_outcomes;
use crate::types::{BusinessParameters, HistoricalSeries};

/// How `impact_percent` was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactBasis {
    /// Relative to a non-zero uninsured total.
    Measured,
    /// Uninsured total was exactly zero; `impact_percent` is a defined 0, not a measurement.
    ZeroBaseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Beneficial,
    NotNeeded,
    /// No percentage could be measured.
    Undetermined,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Beneficial => "Insurance beneficial",
            Verdict::NotNeeded => "Insurance not needed",
            Verdict::Undetermined => "Undetermined (zero uninsured total)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrospectiveResult {
    pub dates: Vec<NaiveDate>,
    pub rainfall_mm: Vec<f64>,
    pub per_day_uninsured: Vec<f64>,
    /// `max(uninsured, 0)` day by day.
    pub per_day_insured: Vec<f64>,
    pub total_uninsured: f64,
    pub total_insured: f64,
    pub impact_percent: f64,
    pub impact_basis: ImpactBasis,
}

impl RetrospectiveResult {
    /// Absolute improvement from insurance, `total_insured - total_uninsured`.
    pub fn impact(&self) -> f64 {
        self.total_insured - self.total_uninsured
    }

    pub fn days(&self) -> usize {
        self.per_day_uninsured.len()
    }

    pub fn verdict(&self) -> Verdict {
        match self.impact_basis {
            ImpactBasis::ZeroBaseline => Verdict::Undetermined,
            ImpactBasis::Measured if self.impact_percent > 0.0 => Verdict::Beneficial,
            ImpactBasis::Measured => Verdict::NotNeeded,
        }
    }
}

/// Replay `series` with and without cover.
pub fn compare(
    series: &HistoricalSeries,
    params: &BusinessParameters,
) -> Result<RetrospectiveResult, ModelError> {
    let per_day_uninsured = series_outcomes(series, params)?;
    let per_day_insured: Vec<f64> = per_day_uninsured.iter().map(|&o| o.max(0.0)).collect();

    let total_uninsured: f64 = per_day_uninsured.iter().sum();
    let total_insured: f64 = per_day_insured.iter().sum();
    let impact = total_insured - total_uninsured;

    let (impact_percent, impact_basis) = if total_uninsured != 0.0 {
        (impact / total_uninsured.abs() * 100.0, ImpactBasis::Measured)
    } else {
        debug!(days = series.len(), "uninsured total is zero; impact tagged as zero-baseline");
        (0.0, ImpactBasis::ZeroBaseline)
    };

    Ok(RetrospectiveResult {
        dates: series.iter().map(|o| o.date).collect(),
        rainfall_mm: series.iter().map(|o| o.rainfall_mm).collect(),
        per_day_uninsured,
        per_day_insured,
        total_uninsured,
        total_insured,
        impact_percent,
        impact_basis,
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn params() -> BusinessParameters {
        BusinessParameters::new(1000.0, 300.0, 10.0).unwrap()
    }

    fn series(values: &[f64]) -> HistoricalSeries {
        HistoricalSeries::from_daily(NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(), values.to_vec())
    }

    #[test]
    fn worked_example_comparison() {
        let r = compare(&series(&[0.0, 10.0, 5.0, 20.0]), &params()).unwrap();
        assert_eq!(r.per_day_uninsured, vec![700.0, -300.0, 200.0, -300.0]);
        assert_eq!(r.per_day_insured, vec![700.0, 0.0, 200.0, 0.0]);
        assert_eq!(r.total_uninsured, 300.0);
        assert_eq!(r.total_insured, 900.0);
        assert_eq!(r.impact(), 600.0);
        assert!((r.impact_percent - 200.0).abs() < 1e-9);
        assert_eq!(r.impact_basis, ImpactBasis::Measured);
        assert_eq!(r.verdict(), Verdict::Beneficial);
    }

    #[test]
    fn negative_uninsured_total_uses_absolute_denominator() {
        let r = compare(&series(&[10.0, 20.0]), &params()).unwrap();
        assert_eq!(r.total_uninsured, -600.0);
        assert_eq!(r.total_insured, 0.0);
        assert!((r.impact_percent - 100.0).abs() < 1e-9, "got {}", r.impact_percent);
    }

    #[test]
    fn zero_uninsured_total_is_tagged() {
        // 700 - 300 - 300 - 100
        let r = compare(&series(&[0.0, 10.0, 10.0, 8.0]), &params()).unwrap();
        assert!(r.total_uninsured.abs() < 1e-9, "total {}", r.total_uninsured);
        assert_eq!(r.impact_basis, ImpactBasis::ZeroBaseline);
        assert_eq!(r.impact_percent, 0.0);
        assert_eq!(r.verdict(), Verdict::Undetermined);
    }

    #[test]
    fn all_profit_days_mean_insurance_not_needed() {
        let r = compare(&series(&[0.0, 1.0, 2.0]), &params()).unwrap();
        assert_eq!(r.per_day_insured, r.per_day_uninsured);
        assert_eq!(r.impact_percent, 0.0);
        assert_eq!(r.impact_basis, ImpactBasis::Measured);
        assert_eq!(r.verdict(), Verdict::NotNeeded);
    }

    #[test]
    fn empty_series_is_zero_baseline() {
        let r = compare(&HistoricalSeries::empty(), &params()).unwrap();
        assert_eq!(r.days(), 0);
        assert_eq!(r.impact_basis, ImpactBasis::ZeroBaseline);
    }

    #[test]
    fn keeps_dates_and_rainfall_aligned() {
        let s = series(&[1.0, 2.0, 3.0]);
        let r = compare(&s, &params()).unwrap();
        assert_eq!(r.dates.len(), 3);
        assert_eq!(r.rainfall_mm, vec![1.0, 2.0, 3.0]);
        assert_eq!(r.dates[2], NaiveDate::from_ymd_opt(2021, 5, 3).unwrap());
    }

    #[test]
    fn invalid_rainfall_yields_no_partial_result() {
        assert!(compare(&series(&[0.0, f64::NAN]), &params()).is_err());
    }

    proptest! {
        #[test]
        fn insured_is_floored_uninsured_and_never_worse(
            values in proptest::collection::vec(0.0f64..60.0, 0..200),
            revenue in 0.0f64..1e5,
            cost in 0.0f64..1e5,
            pivot in 0.1f64..50.0,
        ) {
            let p = BusinessParameters::new(revenue, cost, pivot).unwrap();
            let r = compare(&series(&values), &p).unwrap();
            for (u, i) in r.per_day_uninsured.iter().zip(&r.per_day_insured) {
                prop_assert_eq!(*i, u.max(0.0));
            }
            prop_assert!(r.total_insured >= r.total_uninsured);
            prop_assert!(r.impact_percent >= 0.0);
        }
    }
}
