//! Error types for rainshield.
//!
//! The model itself only ever fails with [`ModelError`]. Rainfall retrieval
//! fails with [`ProviderError`], and configuration loading with
//! [`ConfigError`]. [`Error`] composes the three for callers that drive the
//! whole pipeline.

use chrono::NaiveDate;
use thiserror::Error;

/// A specialized Result type for end-to-end rainshield operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Input-contract violations raised by the model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A scalar input is outside its domain (negative, non-finite, zero pivot).
    #[error("invalid {field}: {value} ({reason})")]
    InvalidInput {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A rainfall value inside a series was rejected.
    #[error("invalid observation on {date}: {source}")]
    InvalidObservation {
        date: NaiveDate,
        #[source]
        source: Box<ModelError>,
    },

    /// Observations are not one-per-day in chronological order.
    #[error("series is not contiguous: expected {expected}, found {found}")]
    NonContiguousSeries { expected: NaiveDate, found: NaiveDate },

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

impl ModelError {
    pub(crate) fn invalid(field: &'static str, value: f64, reason: &'static str) -> Self {
        ModelError::InvalidInput { field, value, reason }
    }

    pub(crate) fn at(self, date: NaiveDate) -> Self {
        ModelError::InvalidObservation { date, source: Box::new(self) }
    }
}

/// Failures of a [`crate::provider::WeatherDataProvider`].
///
/// A provider never reports failure as an empty series; every variant here
/// must reach the caller before any premium is computed.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("location not found: {location}")]
    LocationNotFound { location: String },

    #[error("no daily rainfall data for {location}")]
    MissingRainfall { location: String },

    /// The provider returned a different number of days than requested.
    #[error("incomplete series: expected {expected} days, got {got}")]
    Incomplete { expected: usize, got: usize },

    #[error("malformed rainfall data: {0}")]
    Malformed(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The provider returned values the model refuses.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Transport(e.to_string())
    }
}

impl From<csv::Error> for ProviderError {
    fn from(e: csv::Error) -> Self {
        ProviderError::Malformed(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level error for a full quote run.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_observation_names_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let err = ModelError::invalid("rainfall_mm", -1.0, "must be non-negative").at(date);
        let msg = err.to_string();
        assert!(msg.contains("2024-03-01"), "message should carry the date: {msg}");
        assert!(msg.contains("rainfall_mm"), "message should carry the field: {msg}");
    }

    #[test]
    fn model_error_lifts_into_top_level_error() {
        let err: Error = ModelError::invalid("pivot_rainfall_mm", 0.0, "must be positive").into();
        assert!(matches!(err, Error::Model(ModelError::InvalidInput { .. })));
    }
}
