use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{DailyBar, DailySeries};

/// Required columns with the header names they may appear under. English
/// names are canonical; the Polish aliases cover stooq.com daily exports.
const COLUMNS: [(&str, [&str; 2]); 6] = [
    ("Date", ["date", "data"]),
    ("Open", ["open", "otwarcie"]),
    ("High", ["high", "najwyzszy"]),
    ("Low", ["low", "najnizszy"]),
    ("Close", ["close", "zamkniecie"]),
    ("Volume", ["volume", "wolumen"]),
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Loads a daily OHLCV series from a CSV file.
///
/// Headers are matched case-insensitively against [`COLUMNS`]; extra columns
/// are ignored. Rows must carry unique `%Y-%m-%d` dates. The rows themselves
/// are not validated here; [`crate::StockMarketAnalysis::new`] rejects
/// malformed bars.
pub fn load_ohlcv_csv<P: AsRef<Path>>(path: P) -> Result<DailySeries> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new().from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut positions = [0usize; 6];
    for (slot, (name, aliases)) in positions.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| aliases.contains(&h.as_str()))
            .ok_or_else(|| Error::Input(format!("missing required column: {name}")))?;
    }
    let [date_col, open_col, high_col, low_col, close_col, volume_col] = positions;

    let mut series = DailySeries::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        // Header row is line 1.
        let line = row + 2;

        let date_field = field(&record, date_col, "Date", line)?;
        let date = NaiveDate::parse_from_str(date_field, DATE_FORMAT)
            .map_err(|e| Error::Input(format!("line {line}: bad date {date_field:?}: {e}")))?;

        let volume = parse_number(&record, volume_col, "Volume", line)?;
        if !volume.is_finite() || volume < 0.0 {
            return Err(Error::Input(format!("line {line}: bad Volume value {volume}")));
        }

        let bar = DailyBar {
            open: parse_number(&record, open_col, "Open", line)?,
            high: parse_number(&record, high_col, "High", line)?,
            low: parse_number(&record, low_col, "Low", line)?,
            close: parse_number(&record, close_col, "Close", line)?,
            volume: volume.round() as usize,
        };

        if series.insert(date, bar).is_some() {
            return Err(Error::Input(format!("line {line}: duplicate date {date}")));
        }
    }

    debug!(rows = series.len(), path = %path.display(), "loaded OHLCV series");
    Ok(series)
}

fn field<'r>(record: &'r csv::StringRecord, col: usize, name: &str, line: usize) -> Result<&'r str> {
    record
        .get(col)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Input(format!("line {line}: missing {name} value")))
}

fn parse_number(record: &csv::StringRecord, col: usize, name: &str, line: usize) -> Result<f64> {
    let value = field(record, col, name, line)?;
    value
        .parse()
        .map_err(|e| Error::Input(format!("line {line}: bad {name} value {value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_csv(content: &str) -> eyre::Result<tempfile::NamedTempFile> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(content.as_bytes())?;
        Ok(file)
    }

    #[test]
    fn loads_canonical_headers() -> eyre::Result<()> {
        let file = write_csv(
            "Date,Open,High,Low,Close,Volume\n\
             2023-08-07,100.0,110.0,95.0,105.0,1000\n\
             2023-08-08,105.0,112.0,101.0,102.0,1500\n",
        )?;

        let series = load_ohlcv_csv(file.path())?;
        assert_eq!(series.len(), 2);

        let first = series[&NaiveDate::from_ymd_opt(2023, 8, 7).unwrap()];
        assert_eq!(first.open, 100.0);
        assert_eq!(first.volume, 1000);
        Ok(())
    }

    #[test]
    fn headers_are_case_insensitive_and_extra_columns_ignored() -> eyre::Result<()> {
        let file = write_csv(
            "DATE,open,HIGH,Low,Close,VOLUME,Adj Close\n\
             2023-08-07,100.0,110.0,95.0,105.0,1000,104.5\n",
        )?;

        let series = load_ohlcv_csv(file.path())?;
        assert_eq!(series.len(), 1);
        Ok(())
    }

    #[test]
    fn loads_stooq_polish_headers() -> eyre::Result<()> {
        let file = write_csv(
            "Data,Otwarcie,Najwyzszy,Najnizszy,Zamkniecie,Wolumen\n\
             2023-08-07,2101.5,2133.0,2097.0,2127.5,43000000\n",
        )?;

        let series = load_ohlcv_csv(file.path())?;
        let bar = series[&NaiveDate::from_ymd_opt(2023, 8, 7).unwrap()];
        assert_eq!(bar.close, 2127.5);
        assert_eq!(bar.volume, 43_000_000);
        Ok(())
    }

    #[test]
    fn missing_column_is_an_input_error() -> eyre::Result<()> {
        let file = write_csv("Date,Open,High,Low,Close\n2023-08-07,1.0,2.0,0.5,1.5\n")?;

        match load_ohlcv_csv(file.path()) {
            Err(Error::Input(msg)) => assert!(msg.contains("Volume"), "{msg}"),
            other => panic!("expected input error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn duplicate_date_is_an_input_error() -> eyre::Result<()> {
        let file = write_csv(
            "Date,Open,High,Low,Close,Volume\n\
             2023-08-07,100.0,110.0,95.0,105.0,1000\n\
             2023-08-07,105.0,112.0,101.0,102.0,1500\n",
        )?;

        assert!(matches!(load_ohlcv_csv(file.path()), Err(Error::Input(_))));
        Ok(())
    }

    #[test]
    fn negative_volume_is_an_input_error() -> eyre::Result<()> {
        let file = write_csv(
            "Date,Open,High,Low,Close,Volume\n\
             2023-08-07,100.0,110.0,95.0,105.0,-5\n",
        )?;

        assert!(matches!(load_ohlcv_csv(file.path()), Err(Error::Input(_))));
        Ok(())
    }

    #[test]
    fn unparsable_field_is_an_input_error() -> eyre::Result<()> {
        let file = write_csv(
            "Date,Open,High,Low,Close,Volume\n\
             2023-08-07,abc,110.0,95.0,105.0,1000\n",
        )?;

        match load_ohlcv_csv(file.path()) {
            Err(Error::Input(msg)) => assert!(msg.contains("Open"), "{msg}"),
            other => panic!("expected input error, got {other:?}"),
        }
        Ok(())
    }
}
