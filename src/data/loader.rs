use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;

use super::model::{Condition, DropReason, LoadReport, SaleRecord, VehicleDataset};

/// Columns a sales file must carry. Anything else is ignored.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "year",
    "make",
    "state",
    "condition",
    "sellingprice",
    "mmr",
    "saledate",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load and clean a vehicle sales CSV from disk.
///
/// Fails when the file cannot be opened, its header is unusable, or a row is
/// longer than the header or not UTF-8. Short rows and rows that do not
/// coerce are dropped and counted in the dataset's [`LoadReport`].
pub fn load_file(path: &Path) -> Result<VehicleDataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening sales file {}", path.display()))?;
    let dataset = load_reader(file).with_context(|| format!("reading {}", path.display()))?;
    log::info!("Loaded {}: {}", path.display(), dataset.report);
    Ok(dataset)
}

/// Load and clean CSV text from any reader.
pub fn load_reader<R: Read>(source: R) -> Result<VehicleDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers = reader.headers().context("reading CSV headers")?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            bail!("CSV missing '{column}' column");
        }
    }

    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for (row_no, result) in reader.deserialize::<RawRow>().enumerate() {
        report.rows_read += 1;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) if is_short_row(&e) => {
                log::debug!("CSV row {row_no}: {e}");
                report.record_drop(DropReason::Malformed);
                continue;
            }
            // Long rows and non-UTF-8 bytes abort the load.
            Err(e) => return Err(e).with_context(|| format!("CSV row {row_no}")),
        };

        match raw.into_record() {
            Ok(rec) => records.push(rec),
            Err(e) => {
                log::debug!("CSV row {row_no}: {e}");
                report.record_drop(e.reason());
            }
        }
    }

    report.rows_kept = records.len();
    Ok(VehicleDataset::from_records(records, report))
}

/// A record with fewer fields than the header: truncated, so it is dropped.
fn is_short_row(err: &csv::Error) -> bool {
    matches!(
        err.kind(),
        csv::ErrorKind::UnequalLengths { expected_len, len, .. } if len < expected_len
    )
}

// ---------------------------------------------------------------------------
// Per-field coercion
// ---------------------------------------------------------------------------

/// A field that could not be coerced; the row it belongs to is dropped.
#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("missing value for `{0}`")]
    Missing(DropReason),
    #[error("`{field}`: {value:?} is not a number")]
    NotNumeric { field: DropReason, value: String },
    #[error("`saledate`: {0:?} is not a recognised timestamp")]
    BadTimestamp(String),
}

impl FieldError {
    pub fn reason(&self) -> DropReason {
        match self {
            FieldError::Missing(field) | FieldError::NotNumeric { field, .. } => *field,
            FieldError::BadTimestamp(_) => DropReason::SaleDate,
        }
    }
}

/// One CSV row before coercion. Every column is optional text so that a bad
/// cell becomes a drop instead of aborting the whole load.
#[derive(Debug, Deserialize)]
struct RawRow {
    year: Option<String>,
    make: Option<String>,
    state: Option<String>,
    condition: Option<String>,
    sellingprice: Option<String>,
    mmr: Option<String>,
    saledate: Option<String>,
}

impl RawRow {
    /// Coerce in column order; the first failing field decides the drop reason.
    fn into_record(self) -> Result<SaleRecord, FieldError> {
        let year = parse_year(required(&self.year, DropReason::Year)?)?;
        let make = required(&self.make, DropReason::Make)?.to_string();
        let state = required(&self.state, DropReason::State)?.to_string();
        let condition = Condition::new(required(&self.condition, DropReason::Condition)?);
        let sellingprice = parse_price(
            required(&self.sellingprice, DropReason::SellingPrice)?,
            DropReason::SellingPrice,
        )?;
        let mmr = parse_price(required(&self.mmr, DropReason::Mmr)?, DropReason::Mmr)?;
        let raw_date = required(&self.saledate, DropReason::SaleDate)?;
        let saledate =
            parse_saledate(raw_date).ok_or_else(|| FieldError::BadTimestamp(raw_date.into()))?;

        Ok(SaleRecord {
            year,
            make,
            state,
            condition,
            sellingprice,
            mmr,
            saledate,
        })
    }
}

fn required(value: &Option<String>, field: DropReason) -> Result<&str, FieldError> {
    match value.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(FieldError::Missing(field)),
    }
}

/// Accepts `2014` and integral floats such as `2014.0`.
fn parse_year(s: &str) -> Result<i32, FieldError> {
    if let Ok(year) = s.parse::<i32>() {
        return Ok(year);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() <= i32::MAX as f64 => Ok(v as i32),
        _ => Err(FieldError::NotNumeric {
            field: DropReason::Year,
            value: s.to_string(),
        }),
    }
}

fn parse_price(s: &str, field: DropReason) -> Result<f64, FieldError> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FieldError::NotNumeric {
            field,
            value: s.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Zone-aware layouts, tried in order after the RFC parsers.
const OFFSET_FORMATS: [&str; 3] = [
    // JavaScript `Date.toString()`, as exported in the auction dataset.
    "%a %b %d %Y %H:%M:%S GMT%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
];

/// Layouts without an offset; read as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a sale timestamp, convert it to UTC, and drop the zone.
pub fn parse_saledate(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    // "Tue Dec 16 2014 12:30:00 GMT-0800 (PST)": the zone name adds nothing.
    let s = match s.rfind(" (") {
        Some(i) if s.ends_with(')') => &s[..i],
        _ => s,
    };

    parse_with_offset(s)
        .map(|dt| dt.naive_utc())
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_with_offset(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .ok()
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "year,make,model,state,condition,odometer,mmr,sellingprice,saledate\n";

    fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hh, mm, 0)
            .unwrap()
    }

    fn load(body: &str) -> VehicleDataset {
        load_reader(format!("{HEADER}{body}").as_bytes()).unwrap()
    }

    #[test]
    fn javascript_dates_become_utc_naive() {
        assert_eq!(
            parse_saledate("Tue Dec 16 2014 12:30:00 GMT-0800 (PST)"),
            Some(at(2014, 12, 16, 20, 30))
        );
        assert_eq!(
            parse_saledate("Wed Jan 14 2015 04:30:00 GMT-0800"),
            Some(at(2015, 1, 14, 12, 30))
        );
    }

    #[test]
    fn iso_and_naive_dates_are_accepted() {
        assert_eq!(
            parse_saledate("2015-01-14T10:00:00-05:00"),
            Some(at(2015, 1, 14, 15, 0))
        );
        assert_eq!(
            parse_saledate("2015-01-14 10:00:00+0100"),
            Some(at(2015, 1, 14, 9, 0))
        );
        assert_eq!(parse_saledate("2015-01-14 10:00:00"), Some(at(2015, 1, 14, 10, 0)));
        assert_eq!(parse_saledate("2015-01-14"), Some(at(2015, 1, 14, 0, 0)));
    }

    #[test]
    fn garbage_dates_are_rejected() {
        assert_eq!(parse_saledate("not a date"), None);
        assert_eq!(parse_saledate("2015-13-45"), None);
        assert_eq!(parse_saledate(""), None);
    }

    #[test]
    fn year_accepts_integral_floats_only() {
        assert_eq!(parse_year("2014"), Ok(2014));
        assert_eq!(parse_year("2014.0"), Ok(2014));
        assert!(parse_year("2014.5").is_err());
        assert!(parse_year("twenty").is_err());
    }

    #[test]
    fn clean_rows_are_kept_in_order() {
        let ds = load(
            "2014,Ford,Fusion,ca,4.5,15000,10500,10000,Tue Dec 16 2014 12:30:00 GMT-0800 (PST)\n\
             2015,Ford,Focus,ca,3.0,8000,11800,12000,Wed Jan 14 2015 04:30:00 GMT-0800 (PST)\n",
        );
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].year, 2014);
        assert_eq!(ds.records[0].sellingprice, 10000.0);
        assert_eq!(ds.records[0].mmr, 10500.0);
        assert_eq!(ds.records[1].condition.as_str(), "3.0");
        assert_eq!(ds.records[1].saledate, at(2015, 1, 14, 12, 30));
        assert_eq!(ds.report.rows_read, 2);
        assert_eq!(ds.report.total_dropped(), 0);
    }

    #[test]
    fn rows_failing_coercion_are_dropped() {
        let ds = load(
            "2014,Ford,Fusion,ca,4.5,1,10500,10000,2015-01-14\n\
             abc,Ford,Fusion,ca,4.5,1,10500,10000,2015-01-14\n\
             2014,Ford,Fusion,ca,4.5,1,10500,n/a,2015-01-14\n\
             2014,Ford,Fusion,ca,4.5,1,,10000,2015-01-14\n\
             2014,Ford,Fusion,ca,4.5,1,10500,10000,someday\n\
             2014,,Fusion,ca,4.5,1,10500,10000,2015-01-14\n\
             2014,Ford,Fusion,  ,4.5,1,10500,10000,2015-01-14\n\
             2014,Ford,Fusion,ca,,1,10500,10000,2015-01-14\n\
             2014,Ford,Fusion,ca,4.5\n",
        );
        assert_eq!(ds.len(), 1);
        let report = &ds.report;
        assert_eq!(report.rows_read, 9);
        assert_eq!(report.rows_read, report.rows_kept + report.total_dropped());
        for reason in [
            DropReason::Year,
            DropReason::SellingPrice,
            DropReason::Mmr,
            DropReason::SaleDate,
            DropReason::Make,
            DropReason::State,
            DropReason::Condition,
            DropReason::Malformed,
        ] {
            assert_eq!(report.dropped.get(&reason), Some(&1), "{reason}");
        }
    }

    #[test]
    fn short_rows_are_dropped_not_fatal() {
        let ds = load(
            "2014,Ford,Fusion,ca\n\
             2014,Ford,Fusion,ca,4.5,1,10500,10000,2015-01-14\n",
        );
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.report.dropped.get(&DropReason::Malformed), Some(&1));
    }

    #[test]
    fn rows_with_extra_fields_are_fatal() {
        let err = load_reader(
            format!("{HEADER}2014,Ford,Fusion,ca,4.5,1,10500,10000,2015-01-14,extra\n").as_bytes(),
        )
        .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("CSV row 0"), "{msg}");
        assert!(matches!(
            err.downcast_ref::<csv::Error>().map(csv::Error::kind),
            Some(csv::ErrorKind::UnequalLengths { len: 10, expected_len: 9, .. })
        ));
    }

    #[test]
    fn invalid_utf8_is_fatal() {
        let mut bytes = HEADER.as_bytes().to_vec();
        bytes.extend_from_slice(b"2014,Ford,Fusion,ca,4.5,1,10500,10000,2015-01-14\n");
        bytes.extend_from_slice(b"2014,F\xffrd,Fusion,ca,4.5,1,10500,10000,2015-01-14\n");
        let err = load_reader(bytes.as_slice()).unwrap_err();
        assert!(format!("{err:#}").contains("CSV row 1"), "{err:#}");
    }

    #[test]
    fn text_fields_are_trimmed_not_case_folded() {
        let ds = load("2014, ford ,Fusion, ca ,4.5,1,10500,10000,2015-01-14\n");
        assert_eq!(ds.records[0].make, "ford");
        assert_eq!(ds.records[0].state, "ca");
    }

    #[test]
    fn missing_column_is_fatal() {
        let err = load_reader("year,make,state,condition,sellingprice,saledate\n".as_bytes())
            .unwrap_err();
        assert!(err.to_string().contains("'mmr'"), "{err:#}");
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_file(Path::new("definitely/not/here/car_prices.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("opening sales file"));
    }

    #[test]
    fn load_errors_name_the_path_once() {
        let err = load_file(Path::new("definitely/not/here/car_prices.csv")).unwrap_err();
        let msg = format!("{err:#}");
        assert_eq!(msg.matches("car_prices.csv").count(), 1, "{msg}");

        let dir = std::env::temp_dir().join(format!("vehicle_dashboard_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("no_mmr.csv");
        std::fs::write(&path, "year,make,state,condition,sellingprice,saledate\n").unwrap();
        let err = load_file(&path).unwrap_err();
        std::fs::remove_dir_all(&dir).ok();
        let msg = format!("{err:#}");
        assert_eq!(msg.matches("no_mmr.csv").count(), 1, "{msg}");
    }
}
