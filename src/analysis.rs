use std::collections::BTreeMap;

use chrono::Datelike;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::ModelError;
use crate::outcome::series_outcomes;
use crate::premium::PremiumEstimator;
use crate::provider::synthetic::{RainfallModel, generate};
use crate::retrospective::compare;
use crate::types::{BusinessParameters, DateRange, HistoricalSeries};

/// Per-calendar-year loss aggregate of a historical series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearStats {
    pub year: i32,
    /// Observed days in the year (fewer than 365 at the window edges).
    pub days: usize,
    pub loss_days: usize,
    /// Σ |outcome| over loss days.
    pub total_loss: f64,
    /// Σ outcome over all days.
    pub net_outcome: f64,
}

impl YearStats {
    fn zero(year: i32) -> Self {
        YearStats { year, days: 0, loss_days: 0, total_loss: 0.0, net_outcome: 0.0 }
    }

    /// Fraction of observed days that were loss days. Zero if no days.
    pub fn loss_day_ratio(&self) -> f64 {
        if self.days == 0 { 0.0 } else { self.loss_days as f64 / self.days as f64 }
    }

    /// Loss per observed day scaled to `annualization_days`; the unloaded premium for this year alone.
    pub fn burn_cost(&self, annualization_days: f64) -> f64 {
        if self.days == 0 {
            0.0
        } else {
            self.total_loss / self.days as f64 * annualization_days
        }
    }
}

/// Group a series' daily outcomes by calendar year, oldest first.
pub fn yearly_stats(
    series: &HistoricalSeries,
    params: &BusinessParameters,
) -> Result<Vec<YearStats>, ModelError> {
    let outcomes = series_outcomes(series, params)?;
    let mut by_year: BTreeMap<i32, YearStats> = BTreeMap::new();
    for (obs, outcome) in series.iter().zip(outcomes) {
        let year = obs.date.year();
        let s = by_year.entry(year).or_insert_with(|| YearStats::zero(year));
        s.days += 1;
        s.net_outcome += outcome;
        if outcome < 0.0 {
            s.loss_days += 1;
            s.total_loss += outcome.abs();
        }
    }
    Ok(by_year.into_values().collect())
}

/// Distribution statistics for a continuous metric across N runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistStats {
    pub n: usize,
    pub min: f64,
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

/// Linear-interpolated percentiles and sample standard deviation. `None` if empty.
pub fn percentile_stats(values: &mut [f64]) -> Option<DistStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();

    let interp = |p: f64| -> f64 {
        let h = p * (n - 1) as f64;
        let lo = h.floor() as usize;
        let hi = (lo + 1).min(n - 1);
        let frac = h - lo as f64;
        values[lo] * (1.0 - frac) + values[hi] * frac
    };

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = if n > 1 {
        values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    } else {
        0.0
    };

    Some(DistStats {
        n,
        min: values[0],
        p5: interp(0.05),
        p25: interp(0.25),
        p50: interp(0.50),
        p75: interp(0.75),
        p95: interp(0.95),
        max: values[n - 1],
        mean,
        std_dev: variance.sqrt(),
    })
}

/// Outcome of pricing one synthetic history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunPremium {
    pub seed: u64,
    pub premium: f64,
    pub loss_days: usize,
    pub impact_percent: f64,
}

/// Price `runs` independent synthetic histories over `range`, seeds
/// `start_seed..start_seed + runs`, in parallel.
///
/// Each run owns its RNG, so the output is identical for any thread count.
/// Returned in seed order.
pub fn premium_runs(
    model: &RainfallModel,
    range: DateRange,
    params: &BusinessParameters,
    estimator: &PremiumEstimator,
    start_seed: u64,
    runs: u64,
) -> Result<Vec<RunPremium>, ModelError> {
    (0..runs)
        .into_par_iter()
        .map(|i| -> Result<RunPremium, ModelError> {
            let seed = start_seed + i;
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let series = generate(model, range, &mut rng)?;
            let estimate = estimator.estimate_annual_premium(&series, params)?;
            let retro = compare(&series, params)?;
            Ok(RunPremium {
                seed,
                premium: estimate.premium,
                loss_days: estimate.loss_days,
                impact_percent: retro.impact_percent,
            })
        })
        .collect()
}

/// Cross-run distribution of the premium and the retrospective impact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremiumDistribution {
    pub premium: DistStats,
    pub impact_percent: DistStats,
    /// Coefficient of variation of the premium (std_dev / mean); 0 when the mean is 0.
    pub premium_cv: f64,
}

/// `None` when fewer than 2 runs are available.
pub fn analyse_runs(runs: &[RunPremium]) -> Option<PremiumDistribution> {
    if runs.len() < 2 {
        return None;
    }
    let mut premiums: Vec<f64> = runs.iter().map(|r| r.premium).collect();
    let mut impacts: Vec<f64> = runs.iter().map(|r| r.impact_percent).collect();
    let premium = percentile_stats(&mut premiums)?;
    let impact_percent = percentile_stats(&mut impacts)?;
    let premium_cv = if premium.mean == 0.0 { 0.0 } else { premium.std_dev / premium.mean };
    Some(PremiumDistribution { premium, impact_percent, premium_cv })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn params() -> BusinessParameters {
        BusinessParameters::new(1000.0, 300.0, 10.0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // ── yearly_stats ──────────────────────────────────────────────────────────

    #[test]
    fn splits_at_new_year() {
        // 30 Dec, 31 Dec, 1 Jan, 2 Jan
        let s = HistoricalSeries::from_daily(d(2022, 12, 30), [0.0, 20.0, 10.0, 5.0]);
        let stats = yearly_stats(&s, &params()).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].year, 2022);
        assert_eq!(stats[0].days, 2);
        assert_eq!(stats[0].loss_days, 1);
        assert_eq!(stats[0].total_loss, 300.0);
        assert_eq!(stats[0].net_outcome, 400.0);
        assert_eq!(stats[1].year, 2023);
        assert_eq!(stats[1].net_outcome, -100.0);
    }

    #[test]
    fn burn_cost_matches_unloaded_premium_for_single_year() {
        let s = HistoricalSeries::from_daily(d(2021, 3, 1), [0.0, 10.0, 5.0, 20.0]);
        let stats = yearly_stats(&s, &params()).unwrap();
        let unloaded = PremiumEstimator::new(1.0, 365.0)
            .unwrap()
            .estimate_annual_premium(&s, &params())
            .unwrap();
        assert!((stats[0].burn_cost(365.0) - unloaded.premium).abs() < 1e-9);
        assert!((stats[0].loss_day_ratio() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_series_has_no_years() {
        assert!(yearly_stats(&HistoricalSeries::empty(), &params()).unwrap().is_empty());
        assert_eq!(YearStats::zero(2000).burn_cost(365.0), 0.0);
    }

    // ── percentile_stats ──────────────────────────────────────────────────────

    #[test]
    fn percentile_stats_two_values() {
        // p50 of [0.5, 1.0]: h = 0.5, lo = 0, hi = 1, frac = 0.5 → 0.75
        let mut values = vec![1.0, 0.5];
        let s = percentile_stats(&mut values).unwrap();
        assert_eq!(s.n, 2);
        assert_eq!(s.min, 0.5);
        assert_eq!(s.max, 1.0);
        assert!((s.p50 - 0.75).abs() < 1e-12);
    }

    #[test]
    fn percentile_stats_single_value_has_zero_spread() {
        let mut values = vec![3.0];
        let s = percentile_stats(&mut values).unwrap();
        assert_eq!(s.p5, 3.0);
        assert_eq!(s.p95, 3.0);
        assert_eq!(s.std_dev, 0.0);
    }

    #[test]
    fn percentile_stats_empty_is_none() {
        let mut values: Vec<f64> = vec![];
        assert!(percentile_stats(&mut values).is_none());
    }

    // ── premium_runs / analyse_runs ───────────────────────────────────────────

    fn one_year() -> DateRange {
        DateRange::new(d(2020, 1, 1), d(2020, 12, 31)).unwrap()
    }

    #[test]
    fn runs_are_seed_ordered_and_reproducible() {
        let model = RainfallModel::default();
        let est = PremiumEstimator::default();
        let a = premium_runs(&model, one_year(), &params(), &est, 100, 8).unwrap();
        let b = premium_runs(&model, one_year(), &params(), &est, 100, 8).unwrap();
        assert_eq!(a, b, "same seeds must give identical runs");
        let seeds: Vec<u64> = a.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, (100..108).collect::<Vec<u64>>());
        assert!(a.iter().all(|r| r.premium >= 0.0));
    }

    #[test]
    fn dry_climate_prices_to_zero() {
        let model = RainfallModel { wet_day_probability: 0.0, ..RainfallModel::default() };
        let runs =
            premium_runs(&model, one_year(), &params(), &PremiumEstimator::default(), 1, 4).unwrap();
        let dist = analyse_runs(&runs).unwrap();
        assert_eq!(dist.premium.max, 0.0);
        assert_eq!(dist.premium_cv, 0.0);
    }

    #[test]
    fn analyse_runs_needs_two_runs() {
        let run = RunPremium { seed: 1, premium: 10.0, loss_days: 1, impact_percent: 5.0 };
        assert!(analyse_runs(&[]).is_none());
        assert!(analyse_runs(std::slice::from_ref(&run)).is_none());
        let dist = analyse_runs(&[run.clone(), RunPremium { seed: 2, premium: 30.0, ..run }]).unwrap();
        assert_eq!(dist.premium.n, 2);
        assert!((dist.premium.mean - 20.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_model_fails_the_batch() {
        let model = RainfallModel { wet_day_probability: 2.0, ..RainfallModel::default() };
        assert!(
            premium_runs(&model, one_year(), &params(), &PremiumEstimator::default(), 0, 3).is_err()
        );
    }
}
