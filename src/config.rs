use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::error::{ConfigError, ModelError};
use crate::premium::{DEFAULT_ANNUALIZATION_DAYS, DEFAULT_SAFETY_FACTOR, PremiumEstimator};
use crate::provider::synthetic::RainfallModel;
use crate::types::{BusinessParameters, DateRange};

/// Length of the default look-back window.
pub const DEFAULT_HISTORY_YEARS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BusinessConfig {
    /// Revenue on a dry day (currency units).
    pub max_daily_revenue: f64,
    pub fixed_daily_cost: f64,
    /// Rainfall at which the day's revenue is gone (mm).
    pub pivot_rainfall_mm: f64,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        BusinessConfig { max_daily_revenue: 1000.0, fixed_daily_cost: 300.0, pivot_rainfall_mm: 10.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub safety_factor: f64,
    pub annualization_days: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            safety_factor: DEFAULT_SAFETY_FACTOR,
            annualization_days: DEFAULT_ANNUALIZATION_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OpenMeteoSettings {
    pub geocoding_url: String,
    pub archive_url: String,
    /// IANA zone used to cut the archive into days.
    pub timezone: String,
    pub timeout_secs: u64,
}

impl Default for OpenMeteoSettings {
    fn default() -> Self {
        OpenMeteoSettings {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            archive_url: "https://archive-api.open-meteo.com/v1/archive".to_string(),
            timezone: "Europe/Paris".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Everything a quote run needs besides the rainfall itself.
///
/// `canonical()` holds the defaults; a TOML file may override any subset of
/// keys and CLI flags override the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    pub location: String,
    /// Currency code printed next to amounts; no conversion is done.
    pub currency: String,
    /// Window start; `None` means `DEFAULT_HISTORY_YEARS` before `end_date`.
    pub start_date: Option<NaiveDate>,
    /// Window end; `None` means today.
    pub end_date: Option<NaiveDate>,
    pub business: BusinessConfig,
    pub pricing: PricingConfig,
    pub open_meteo: OpenMeteoSettings,
    pub synthetic: RainfallModel,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        QuoteConfig::canonical()
    }
}

impl QuoteConfig {
    pub fn canonical() -> Self {
        QuoteConfig {
            location: "Paris".to_string(),
            currency: "EUR".to_string(),
            start_date: None,
            end_date: None,
            business: BusinessConfig::default(),
            pricing: PricingConfig::default(),
            open_meteo: OpenMeteoSettings::default(),
            synthetic: RainfallModel::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        QuoteConfig::from_toml_str(&text)
    }

    pub fn business_parameters(&self) -> Result<BusinessParameters, ModelError> {
        BusinessParameters::new(
            self.business.max_daily_revenue,
            self.business.fixed_daily_cost,
            self.business.pivot_rainfall_mm,
        )
    }

    pub fn estimator(&self) -> Result<PremiumEstimator, ModelError> {
        PremiumEstimator::new(self.pricing.safety_factor, self.pricing.annualization_days)
    }

    /// Resolve the look-back window, filling unset ends relative to `today`.
    pub fn date_range(&self, today: NaiveDate) -> Result<DateRange, ModelError> {
        let end = self.end_date.unwrap_or(today);
        match self.start_date {
            Some(start) => DateRange::new(start, end),
            None => DateRange::trailing_years(end, DEFAULT_HISTORY_YEARS),
        }
    }

    pub fn date_range_to_today(&self) -> Result<DateRange, ModelError> {
        self.date_range(Local::now().date_naive())
    }
}
