//! One quote request end to end: validate, fetch once, price, replay.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::{YearStats, yearly_stats};
use crate::config::QuoteConfig;
use crate::error::Result;
use crate::premium::{PremiumEstimate, PremiumEstimator};
use crate::provider::WeatherDataProvider;
use crate::retrospective::{RetrospectiveResult, Verdict, compare};
use crate::types::{BusinessParameters, DateRange, HistoricalSeries};

/// Everything computed for one location and window.
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub location: String,
    pub source: &'static str,
    pub range: DateRange,
    pub params: BusinessParameters,
    #[serde(skip)]
    pub estimator: PremiumEstimator,
    #[serde(skip)]
    pub series: HistoricalSeries,
    pub estimate: PremiumEstimate,
    pub retrospective: RetrospectiveResult,
    pub verdict: Verdict,
    pub years: Vec<YearStats>,
}

/// Price `config` against rainfall from `provider`, windowed relative to `today`.
///
/// Inputs are validated before any request is made. The series is fetched
/// once and shared by the premium and the retrospective; a provider failure
/// returns before either is computed.
pub fn run(
    config: &QuoteConfig,
    provider: &dyn WeatherDataProvider,
    today: NaiveDate,
) -> Result<Quote> {
    let params = config.business_parameters()?;
    let estimator = config.estimator()?;
    let range = config.date_range(today)?;

    let series = provider.fetch_daily_rainfall(&config.location, range)?;
    info!(
        location = %config.location,
        source = provider.name(),
        days = series.len(),
        "rainfall series loaded"
    );

    let estimate = estimator.estimate_annual_premium(&series, &params)?;
    if estimate.is_no_data() {
        warn!("rainfall series is empty; premium is undefined");
    }
    let retrospective = compare(&series, &params)?;
    let years = yearly_stats(&series, &params)?;

    Ok(Quote {
        location: config.location.clone(),
        source: provider.name(),
        range,
        params,
        estimator,
        series,
        estimate,
        verdict: retrospective.verdict(),
        retrospective,
        years,
    })
}
