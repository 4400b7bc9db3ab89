//! Open-Meteo geocoding + historical archive.
//!
//! Two blocking requests per fetch: resolve the location name to
//! coordinates, then pull `daily=precipitation_sum` for the window.
//! One attempt each; no retry and no caching.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use super::{WeatherDataProvider, ensure_covers};
use crate::config::OpenMeteoSettings;
use crate::error::ProviderError;
use crate::types::{DateRange, HistoricalSeries, RainfallObservation};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingHit>,
}

#[derive(Deserialize)]
struct GeocodingHit {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct ArchiveResponse {
    daily: Option<ArchiveDaily>,
}

#[derive(Deserialize)]
struct ArchiveDaily {
    #[serde(default)]
    time: Vec<NaiveDate>,
    precipitation_sum: Option<Vec<Option<f64>>>,
}

/// First hit of a geocoding response body.
pub fn parse_geocoding(body: &str, location: &str) -> Result<Coordinates, ProviderError> {
    let resp: GeocodingResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;
    resp.results
        .first()
        .map(|hit| Coordinates { latitude: hit.latitude, longitude: hit.longitude })
        .ok_or_else(|| ProviderError::LocationNotFound { location: location.to_string() })
}

/// Daily precipitation sums from an archive response body; `null` days become 0.0.
pub fn parse_archive(
    body: &str,
    location: &str,
    range: DateRange,
) -> Result<HistoricalSeries, ProviderError> {
    let resp: ArchiveResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;
    let missing = || ProviderError::MissingRainfall { location: location.to_string() };
    let daily = resp.daily.ok_or_else(missing)?;
    let sums = daily.precipitation_sum.ok_or_else(missing)?;

    let values = sums.into_iter().map(|v| v.unwrap_or(0.0));
    let series = if daily.time.is_empty() {
        HistoricalSeries::from_daily(range.start(), values)
    } else {
        if daily.time.len() != values.len() {
            return Err(ProviderError::Malformed(format!(
                "{} dates but {} precipitation values",
                daily.time.len(),
                values.len()
            )));
        }
        let observations = daily
            .time
            .into_iter()
            .zip(values)
            .map(|(date, rainfall_mm)| RainfallObservation { date, rainfall_mm })
            .collect();
        HistoricalSeries::new(observations)?
    };

    ensure_covers(&series, range)?;
    Ok(series)
}

pub struct OpenMeteoProvider {
    client: reqwest::blocking::Client,
    settings: OpenMeteoSettings,
}

impl OpenMeteoProvider {
    pub fn new(settings: OpenMeteoSettings) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(OpenMeteoProvider { client, settings })
    }

    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, ProviderError> {
        let resp = self.client.get(url).query(query).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Transport(format!("HTTP {status} from {url}")));
        }
        Ok(resp.text()?)
    }

    pub fn geocode(&self, location: &str) -> Result<Coordinates, ProviderError> {
        let body = self.get(
            &self.settings.geocoding_url,
            &[("name", location.to_string()), ("count", "1".to_string())],
        )?;
        let coords = parse_geocoding(&body, location)?;
        debug!(location, latitude = coords.latitude, longitude = coords.longitude, "geocoded");
        Ok(coords)
    }
}

impl WeatherDataProvider for OpenMeteoProvider {
    fn name(&self) -> &'static str {
        "open-meteo"
    }

    fn fetch_daily_rainfall(
        &self,
        location: &str,
        range: DateRange,
    ) -> Result<HistoricalSeries, ProviderError> {
        let coords = self.geocode(location)?;
        info!(location, start = %range.start(), end = %range.end(), "requesting rainfall archive");
        let body = self.get(
            &self.settings.archive_url,
            &[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("start_date", range.start().to_string()),
                ("end_date", range.end().to_string()),
                ("daily", "precipitation_sum".to_string()),
                ("timezone", self.settings.timezone.clone()),
            ],
        )?;
        parse_archive(&body, location, range)
    }
}
