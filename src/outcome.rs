//! Daily outcome model: one day's rainfall to one day's net result.
//!
//! Revenue falls linearly from `max_daily_revenue` at 0 mm to nothing at the
//! pivot, and stays at nothing above it. The outcome is that revenue minus
//! the fixed daily cost, so it goes negative on heavy-rain days.

use crate::error::ModelError;
use crate::types::{BusinessParameters, HistoricalSeries};

fn check_rainfall(rainfall_mm: f64) -> Result<f64, ModelError> {
    if !rainfall_mm.is_finite() {
        return Err(ModelError::invalid("rainfall_mm", rainfall_mm, "must be a finite number"));
    }
    if rainfall_mm < 0.0 {
        return Err(ModelError::invalid("rainfall_mm", rainfall_mm, "must be non-negative"));
    }
    Ok(rainfall_mm)
}

/// Revenue actually delivered on a day with `rainfall_mm` of rain.
pub fn daily_revenue_at_rainfall(
    rainfall_mm: f64,
    params: &BusinessParameters,
) -> Result<f64, ModelError> {
    let rainfall_mm = check_rainfall(rainfall_mm)?;
    let pivot = params.pivot_rainfall_mm();
    let revenue = if rainfall_mm >= pivot {
        0.0
    } else if rainfall_mm > 0.0 {
        params.max_daily_revenue() * (pivot - rainfall_mm) / pivot
    } else {
        params.max_daily_revenue()
    };
    Ok(revenue)
}

/// Net result for the day: delivered revenue minus fixed cost. Negative on a loss day.
pub fn daily_outcome(rainfall_mm: f64, params: &BusinessParameters) -> Result<f64, ModelError> {
    Ok(daily_revenue_at_rainfall(rainfall_mm, params)? - params.fixed_daily_cost())
}

/// Outcome for every day of `series`, in order.
///
/// Stops at the first rejected observation; the error carries its date.
pub fn series_outcomes(
    series: &HistoricalSeries,
    params: &BusinessParameters,
) -> Result<Vec<f64>, ModelError> {
    series
        .iter()
        .map(|obs| daily_outcome(obs.rainfall_mm, params).map_err(|e| e.at(obs.date)))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use proptest::prelude::*;

    use super::*;

    fn params() -> BusinessParameters {
        BusinessParameters::new(1000.0, 300.0, 10.0).unwrap()
    }

    #[test]
    fn worked_examples() {
        let p = params();
        assert_eq!(daily_outcome(0.0, &p).unwrap(), 700.0);
        assert_eq!(daily_outcome(10.0, &p).unwrap(), -300.0);
        assert_eq!(daily_outcome(5.0, &p).unwrap(), 200.0);
        assert_eq!(daily_outcome(20.0, &p).unwrap(), -300.0);
        assert_eq!(daily_revenue_at_rainfall(5.0, &p).unwrap(), 500.0);
    }

    #[test]
    fn rejects_non_finite_and_negative_rainfall() {
        let p = params();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -0.5] {
            let err = daily_outcome(bad, &p).unwrap_err();
            assert!(
                matches!(err, ModelError::InvalidInput { field: "rainfall_mm", .. }),
                "rainfall {bad} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn series_error_points_at_offending_day() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let series = HistoricalSeries::from_daily(start, [0.0, 3.0, f64::NAN, 1.0]);
        let err = series_outcomes(&series, &params()).unwrap_err();
        match err {
            ModelError::InvalidObservation { date, .. } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
            }
            other => panic!("expected InvalidObservation, got {other:?}"),
        }
    }

    #[test]
    fn zero_revenue_business_always_loses_fixed_cost() {
        let p = BusinessParameters::new(0.0, 50.0, 4.0).unwrap();
        for r in [0.0, 1.0, 4.0, 100.0] {
            assert_eq!(daily_outcome(r, &p).unwrap(), -50.0);
        }
    }

    proptest! {
        #[test]
        fn at_or_above_pivot_loses_fixed_cost(
            revenue in 0.0f64..1e6,
            cost in 0.0f64..1e6,
            pivot in 0.1f64..500.0,
            excess in 0.0f64..1000.0,
        ) {
            let p = BusinessParameters::new(revenue, cost, pivot).unwrap();
            prop_assert_eq!(daily_outcome(pivot + excess, &p).unwrap(), -cost);
        }

        #[test]
        fn dry_day_earns_full_margin(revenue in 0.0f64..1e6, cost in 0.0f64..1e6, pivot in 0.1f64..500.0) {
            let p = BusinessParameters::new(revenue, cost, pivot).unwrap();
            prop_assert_eq!(daily_outcome(0.0, &p).unwrap(), revenue - cost);
        }

        #[test]
        fn strictly_decreasing_below_pivot(
            revenue in 1.0f64..1e6,
            cost in 0.0f64..1e6,
            pivot in 1.0f64..500.0,
            a in 0.01f64..0.98,
            gap in 0.01f64..0.5,
        ) {
            let p = BusinessParameters::new(revenue, cost, pivot).unwrap();
            let lo = a * pivot;
            let hi = (a + gap).min(0.99) * pivot;
            prop_assume!(hi > lo);
            let o_lo = daily_outcome(lo, &p).unwrap();
            let o_hi = daily_outcome(hi, &p).unwrap();
            prop_assert!(o_hi < o_lo, "outcome({hi}) = {o_hi} should be < outcome({lo}) = {o_lo}");
        }

        #[test]
        fn revenue_stays_within_bounds(revenue in 0.0f64..1e6, pivot in 0.1f64..500.0, r in 0.0f64..1000.0) {
            let p = BusinessParameters::new(revenue, 0.0, pivot).unwrap();
            let delivered = daily_revenue_at_rainfall(r, &p).unwrap();
            prop_assert!((0.0..=revenue).contains(&delivered));
        }
    }
}
