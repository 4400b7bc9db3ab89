use std::f64::consts::TAU;

use chrono::Datelike;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Exp, LogNormal};
use serde::{Deserialize, Serialize};

use super::WeatherDataProvider;
use crate::error::{ModelError, ProviderError};
use crate::types::{DateRange, HistoricalSeries};

/// Rain amount on a wet day, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AmountModel {
    /// ln-space params. E[X] = exp(mu + sigma²/2) mm.
    LogNormal { mu: f64, sigma: f64 },
    /// Exponential with the given mean, in mm.
    Exponential { mean: f64 },
}

impl AmountModel {
    fn sample(&self, rng: &mut impl Rng) -> Result<f64, ModelError> {
        let mm = match *self {
            AmountModel::LogNormal { mu, sigma } => LogNormal::new(mu, sigma)
                .map_err(|_| ModelError::invalid("sigma", sigma, "must be finite and non-negative"))?
                .sample(rng),
            AmountModel::Exponential { mean } => {
                if !mean.is_finite() || mean <= 0.0 {
                    return Err(ModelError::invalid("mean", mean, "must be finite and positive"));
                }
                Exp::new(1.0 / mean)
                    .map_err(|_| ModelError::invalid("mean", mean, "must be finite and positive"))?
                    .sample(rng)
            }
        };
        Ok(mm)
    }
}

/// Daily rainfall generator: a Bernoulli wet/dry draw, then an amount.
///
/// The wet-day probability follows a yearly cosine:
/// `p(doy) = wet_day_probability × (1 + seasonal_amplitude × cos(2π(doy − wettest_day)/365))`,
/// clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainfallModel {
    pub wet_day_probability: f64,
    pub seasonal_amplitude: f64,
    /// Day of year (1-366) with the highest wet-day probability.
    pub wettest_day: u32,
    pub amount: AmountModel,
}

impl Default for RainfallModel {
    /// Roughly a temperate western-European city: ~110 wet days a year,
    /// median wet-day rain ~2.7 mm, wetter in late autumn.
    fn default() -> Self {
        RainfallModel {
            wet_day_probability: 0.30,
            seasonal_amplitude: 0.25,
            wettest_day: 320,
            amount: AmountModel::LogNormal { mu: 1.0, sigma: 1.1 },
        }
    }
}

impl RainfallModel {
    pub fn wet_probability(&self, day_of_year: u32) -> f64 {
        let phase = TAU * (day_of_year as f64 - self.wettest_day as f64) / 365.0;
        (self.wet_day_probability * (1.0 + self.seasonal_amplitude * phase.cos())).clamp(0.0, 1.0)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if !(0.0..=1.0).contains(&self.wet_day_probability) {
            return Err(ModelError::invalid(
                "wet_day_probability",
                self.wet_day_probability,
                "must lie in [0, 1]",
            ));
        }
        if !self.seasonal_amplitude.is_finite() {
            return Err(ModelError::invalid(
                "seasonal_amplitude",
                self.seasonal_amplitude,
                "must be finite",
            ));
        }
        Ok(())
    }
}

/// Draw one value per day of `range` from `model`.
pub fn generate(
    model: &RainfallModel,
    range: DateRange,
    rng: &mut impl Rng,
) -> Result<HistoricalSeries, ModelError> {
    model.validate()?;
    let mut values = Vec::with_capacity(range.days());
    for date in range.iter() {
        let p = model.wet_probability(date.ordinal());
        let mm = if rng.random_bool(p) { model.amount.sample(rng)? } else { 0.0 };
        values.push(mm);
    }
    Ok(HistoricalSeries::from_daily(range.start(), values))
}

/// FNV-1a, so a location always maps to the same stream.
fn location_key(location: &str) -> u64 {
    location
        .to_lowercase()
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325, |h, b| (h ^ b as u64).wrapping_mul(0x0100_0000_01b3))
}

/// Seeded, offline provider. Identical `(seed, location, range)` give identical series.
pub struct SyntheticProvider {
    model: RainfallModel,
    seed: u64,
}

impl SyntheticProvider {
    pub fn new(model: RainfallModel, seed: u64) -> Self {
        SyntheticProvider { model, seed }
    }
}

impl WeatherDataProvider for SyntheticProvider {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn fetch_daily_rainfall(
        &self,
        location: &str,
        range: DateRange,
    ) -> Result<HistoricalSeries, ProviderError> {
        let mut rng = ChaCha20Rng::seed_from_u64(self.seed ^ location_key(location));
        Ok(generate(&self.model, range, &mut rng)?)
    }
}
