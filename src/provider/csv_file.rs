use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use super::{WeatherDataProvider, ensure_covers};
use crate::error::ProviderError;
use crate::types::{DateRange, HistoricalSeries, RainfallObservation};

#[derive(Deserialize)]
struct Row {
    date: NaiveDate,
    rainfall_mm: Option<f64>,
}

/// Parse `date,rainfall_mm` rows and keep those inside `range`.
///
/// Blank rainfall cells are read as 0.0; anything else that is not a number
/// fails the whole read.
pub fn read_series<R: Read>(reader: R, range: DateRange) -> Result<HistoricalSeries, ProviderError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut observations = Vec::with_capacity(range.days());
    for row in rdr.deserialize::<Row>() {
        let row = row?;
        if range.contains(row.date) {
            observations.push(RainfallObservation {
                date: row.date,
                rainfall_mm: row.rainfall_mm.unwrap_or(0.0),
            });
        }
    }
    let series = HistoricalSeries::new(observations)?;
    ensure_covers(&series, range)?;
    Ok(series)
}

/// Rainfall from a local CSV export. The location name is not used.
pub struct CsvFileProvider {
    path: PathBuf,
}

impl CsvFileProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        CsvFileProvider { path: path.as_ref().to_path_buf() }
    }
}

impl WeatherDataProvider for CsvFileProvider {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn fetch_daily_rainfall(
        &self,
        location: &str,
        range: DateRange,
    ) -> Result<HistoricalSeries, ProviderError> {
        info!(path = %self.path.display(), location, "reading rainfall csv");
        let file = File::open(&self.path)?;
        read_series(file, range)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn range(from: u32, to: u32) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, from).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, to).unwrap(),
        )
        .unwrap()
    }

    const CSV: &str = "date,rainfall_mm\n\
                       2024-03-01,0.0\n\
                       2024-03-02, 4.2\n\
                       2024-03-03,\n\
                       2024-03-04,11.0\n";

    #[test]
    fn filters_to_range_and_fills_blanks() {
        let s = read_series(CSV.as_bytes(), range(2, 3)).unwrap();
        let values: Vec<f64> = s.iter().map(|o| o.rainfall_mm).collect();
        assert_eq!(values, vec![4.2, 0.0]);
    }

    #[test]
    fn range_beyond_file_is_incomplete() {
        let err = read_series(CSV.as_bytes(), range(1, 6)).unwrap_err();
        assert!(matches!(err, ProviderError::Incomplete { expected: 6, got: 4 }), "{err:?}");
    }

    #[test]
    fn non_numeric_rainfall_is_malformed() {
        let bad = "date,rainfall_mm\n2024-03-01,lots\n";
        assert!(matches!(read_series(bad.as_bytes(), range(1, 1)), Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn gap_inside_range_is_rejected() {
        let gappy = "date,rainfall_mm\n2024-03-01,0\n2024-03-03,0\n";
        assert!(read_series(gappy.as_bytes(), range(1, 3)).is_err());
    }

    #[test]
    fn provider_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        let provider = CsvFileProvider::new(file.path());
        let s = provider.fetch_daily_rainfall("ignored", range(1, 4)).unwrap();
        assert_eq!(s.len(), 4);
        assert_eq!(provider.name(), "csv");
    }

    #[test]
    fn missing_file_is_io_error() {
        let provider = CsvFileProvider::new("/nonexistent/rainfall.csv");
        assert!(matches!(
            provider.fetch_daily_rainfall("x", range(1, 1)),
            Err(ProviderError::Io(_))
        ));
    }
}
