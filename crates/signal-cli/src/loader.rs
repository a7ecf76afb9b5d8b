use analysis_core::{Bar, FundamentalSnapshot};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date", alias = "date")]
    date: String,
    #[serde(rename = "Open", alias = "open")]
    open: f64,
    #[serde(rename = "High", alias = "high")]
    high: f64,
    #[serde(rename = "Low", alias = "low")]
    low: f64,
    #[serde(rename = "Close", alias = "close")]
    close: f64,
    #[serde(rename = "Volume", alias = "volume")]
    volume: f64,
}

/// Accepts `YYYY-MM-DD` with an optional time suffix
fn parse_date(raw: &str) -> Result<NaiveDate> {
    let day = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(day, "%Y-%m-%d").with_context(|| format!("invalid date {:?}", raw))
}

/// Read bars from CSV and sort them chronologically. Extra columns are ignored.
pub fn read_bars(reader: impl Read) -> Result<Vec<Bar>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut bars = Vec::new();
    for (i, record) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = record.with_context(|| format!("malformed price row {}", i + 1))?;
        bars.push(Bar {
            date: parse_date(&row.date).with_context(|| format!("price row {}", i + 1))?,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

pub fn load_bars(path: &Path) -> Result<Vec<Bar>> {
    let file = std::fs::File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    read_bars(file).with_context(|| format!("cannot read prices from {}", path.display()))
}

pub fn load_fundamentals(path: &Path) -> Result<FundamentalSnapshot> {
    let text = std::fs::read_to_string(path).with_context(|| format!("cannot open {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid fundamentals JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bars_sorts_and_ignores_extra_columns() {
        let csv = "Date,Open,High,Low,Close,Adj Close,Volume\n\
                   2024-01-03,11,12,10,11.5,11.5,2000\n\
                   2024-01-02 00:00:00-05:00,10,11,9,10.5,10.5,1000\n";
        let bars = read_bars(csv.as_bytes()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, 10.5);
        assert_eq!(bars[1].volume, 2000.0);
    }

    #[test]
    fn test_lowercase_headers() {
        let csv = "date,open,high,low,close,volume\n2024-02-01,1,2,0.5,1.5,10\n";
        let bars = read_bars(csv.as_bytes()).unwrap();
        assert_eq!(bars[0].high, 2.0);
    }

    #[test]
    fn test_malformed_row_reports_position() {
        let csv = "Date,Open,High,Low,Close,Volume\n2024-01-02,1,2,0.5,abc,10\n";
        let err = read_bars(csv.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("malformed price row 1"));
    }

    #[test]
    fn test_bad_date() {
        let csv = "Date,Open,High,Low,Close,Volume\n01/02/2024,1,2,0.5,1.5,10\n";
        assert!(read_bars(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_fundamentals_json() {
        let snapshot: FundamentalSnapshot =
            serde_json::from_str(r#"{"overall_score": 72.5, "ratios": {"debt_to_equity": 0.4}}"#).unwrap();
        assert_eq!(snapshot.overall_score, 72.5);
        assert_eq!(snapshot.ratio("debt_to_equity"), Some(0.4));
    }
}
