//! Sources of historical daily rainfall.
//!
//! Every provider hands back either a complete [`HistoricalSeries`] covering
//! the requested window, one value per day with missing source values already
//! set to 0.0, or a [`ProviderError`]. An empty series is never used to signal
//! failure.

pub mod csv_file;
pub mod open_meteo;
pub mod synthetic;

use crate::error::ProviderError;
use crate::types::{DateRange, HistoricalSeries};

pub use csv_file::CsvFileProvider;
pub use open_meteo::OpenMeteoProvider;
pub use synthetic::SyntheticProvider;

pub trait WeatherDataProvider {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    fn fetch_daily_rainfall(
        &self,
        location: &str,
        range: DateRange,
    ) -> Result<HistoricalSeries, ProviderError>;
}

/// Reject a series that does not cover `range` exactly.
pub(crate) fn ensure_covers(
    series: &HistoricalSeries,
    range: DateRange,
) -> Result<(), ProviderError> {
    let expected = range.days();
    if series.len() != expected || series.range() != Some(range) {
        return Err(ProviderError::Incomplete { expected, got: series.len() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn ensure_covers_rejects_short_and_shifted_series() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let range = DateRange::new(start, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()).unwrap();

        let exact = HistoricalSeries::from_daily(start, [0.0, 1.0, 2.0]);
        assert!(ensure_covers(&exact, range).is_ok());

        let short = HistoricalSeries::from_daily(start, [0.0, 1.0]);
        assert!(matches!(
            ensure_covers(&short, range),
            Err(ProviderError::Incomplete { expected: 3, got: 2 })
        ));

        let shifted = HistoricalSeries::from_daily(start.succ_opt().unwrap(), [0.0, 1.0, 2.0]);
        assert!(ensure_covers(&shifted, range).is_err());

        assert!(ensure_covers(&HistoricalSeries::empty(), range).is_err());
    }
}
