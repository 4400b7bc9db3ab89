use serde::Serialize;
use tracing::debug;

use crate::error::ModelError;
use crate::outcome::series_outcomes;
use crate::types::{BusinessParameters, HistoricalSeries};

/// Margin loaded onto the pure expected loss.
pub const DEFAULT_SAFETY_FACTOR: f64 = 1.2;

/// Days per year used to annualise the expected daily loss.
pub const DEFAULT_ANNUALIZATION_DAYS: f64 = 365.0;

/// Whether a premium was computed from observations or defaulted for lack of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumBasis {
    /// At least one day was observed; a zero premium means no loss days.
    Observed,
    /// The series was empty; the zero premium carries no information.
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremiumEstimate {
    /// Annual premium in currency units. Never negative.
    pub premium: f64,
    /// Loss averaged over every calendar day of the series, not just loss days.
    pub average_daily_loss: f64,
    pub loss_days: usize,
    pub observed_days: usize,
    pub basis: PremiumBasis,
}

impl PremiumEstimate {
    fn no_data() -> Self {
        PremiumEstimate {
            premium: 0.0,
            average_daily_loss: 0.0,
            loss_days: 0,
            observed_days: 0,
            basis: PremiumBasis::NoData,
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.basis == PremiumBasis::NoData
    }
}

/// Turns a historical series into an annual premium.
///
/// premium = (Σ |loss| over loss days / days observed) × annualization_days × safety_factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PremiumEstimator {
    safety_factor: f64,
    annualization_days: f64,
}

impl Default for PremiumEstimator {
    fn default() -> Self {
        PremiumEstimator {
            safety_factor: DEFAULT_SAFETY_FACTOR,
            annualization_days: DEFAULT_ANNUALIZATION_DAYS,
        }
    }
}

impl PremiumEstimator {
    pub fn new(safety_factor: f64, annualization_days: f64) -> Result<Self, ModelError> {
        if !safety_factor.is_finite() || safety_factor <= 0.0 {
            return Err(ModelError::invalid(
                "safety_factor",
                safety_factor,
                "must be finite and positive",
            ));
        }
        if !annualization_days.is_finite() || annualization_days <= 0.0 {
            return Err(ModelError::invalid(
                "annualization_days",
                annualization_days,
                "must be finite and positive",
            ));
        }
        Ok(PremiumEstimator { safety_factor, annualization_days })
    }

    pub fn safety_factor(&self) -> f64 {
        self.safety_factor
    }

    pub fn annualization_days(&self) -> f64 {
        self.annualization_days
    }

    pub fn estimate_annual_premium(
        &self,
        series: &HistoricalSeries,
        params: &BusinessParameters,
    ) -> Result<PremiumEstimate, ModelError> {
        if series.is_empty() {
            debug!("empty rainfall series; premium tagged as no-data");
            return Ok(PremiumEstimate::no_data());
        }

        let outcomes = series_outcomes(series, params)?;
        let (loss_days, total_loss) = outcomes
            .iter()
            .filter(|&&o| o < 0.0)
            .fold((0usize, 0.0f64), |(n, sum), &o| (n + 1, sum + o.abs()));

        let observed_days = outcomes.len();
        let average_daily_loss = total_loss / observed_days as f64;
        let premium = average_daily_loss * self.annualization_days * self.safety_factor;

        debug!(observed_days, loss_days, average_daily_loss, premium, "premium estimated");
        Ok(PremiumEstimate {
            premium,
            average_daily_loss,
            loss_days,
            observed_days,
            basis: PremiumBasis::Observed,
        })
    }
}
