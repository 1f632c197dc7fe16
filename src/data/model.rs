use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Condition – ordinal grade of a vehicle
// ---------------------------------------------------------------------------

/// Condition grade as written in the source file.
///
/// The public auction dataset stores grades as numbers (`"4.5"`, `"35"`), but
/// nothing guarantees it, so the text is kept and ordering is numeric
/// whenever both sides parse as numbers. Numeric grades sort before text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Condition(String);

impl Condition {
    pub fn new(label: impl Into<String>) -> Self {
        Condition(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the grade, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl PartialOrd for Condition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Condition {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            // Tie-break on the text so "4" and "4.0" stay distinct and Ord agrees with Eq.
            (Some(a), Some(b)) => a.total_cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SaleRecord – one cleaned row of the CSV
// ---------------------------------------------------------------------------

/// A single vehicle sale. Every field is present; rows that failed coercion
/// never become a `SaleRecord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    pub year: i32,
    pub make: String,
    pub state: String,
    pub condition: Condition,
    pub sellingprice: f64,
    /// Market-reference value for the same vehicle.
    pub mmr: f64,
    /// UTC instant of the sale with the zone stripped.
    pub saledate: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// Load accounting
// ---------------------------------------------------------------------------

/// Why a row was left out of the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DropReason {
    /// The CSV record had fewer fields than the header.
    Malformed,
    Year,
    Make,
    State,
    Condition,
    SellingPrice,
    Mmr,
    SaleDate,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DropReason::Malformed => "malformed row",
            DropReason::Year => "year",
            DropReason::Make => "make",
            DropReason::State => "state",
            DropReason::Condition => "condition",
            DropReason::SellingPrice => "sellingprice",
            DropReason::Mmr => "mmr",
            DropReason::SaleDate => "saledate",
        };
        write!(f, "{name}")
    }
}

/// Summary of one load: how many rows were seen, kept, and dropped per reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub dropped: BTreeMap<DropReason, usize>,
}

impl LoadReport {
    pub fn record_drop(&mut self, reason: DropReason) {
        *self.dropped.entry(reason).or_default() += 1;
    }

    pub fn total_dropped(&self) -> usize {
        self.dropped.values().sum()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} rows kept", self.rows_kept, self.rows_read)?;
        if !self.dropped.is_empty() {
            let parts: Vec<String> = self
                .dropped
                .iter()
                .map(|(reason, n)| format!("{reason}: {n}"))
                .collect();
            write!(f, " (dropped {})", parts.join(", "))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// VehicleDataset – the complete cleaned dataset
// ---------------------------------------------------------------------------

/// The cleaned records, in input order, with the filter option lists.
#[derive(Debug, Clone)]
pub struct VehicleDataset {
    pub records: Vec<SaleRecord>,
    /// Sorted unique model years.
    pub years: BTreeSet<i32>,
    /// Sorted unique makes.
    pub makes: BTreeSet<String>,
    /// Sorted unique state codes, as written in the file.
    pub states: BTreeSet<String>,
    /// Sum of every selling price, fixed for the life of the dataset.
    pub total_sales: f64,
    pub report: LoadReport,
}

impl VehicleDataset {
    /// Build the option indices from the cleaned records.
    pub fn from_records(records: Vec<SaleRecord>, report: LoadReport) -> Self {
        let mut years = BTreeSet::new();
        let mut makes = BTreeSet::new();
        let mut states = BTreeSet::new();
        let mut total_sales = 0.0;

        for rec in &records {
            years.insert(rec.year);
            makes.insert(rec.make.clone());
            states.insert(rec.state.clone());
            total_sales += rec.sellingprice;
        }

        VehicleDataset {
            records,
            years,
            makes,
            states,
            total_sales,
            report,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow the records at `indices`, in the order given.
    pub fn view(&self, indices: &[usize]) -> Vec<&SaleRecord> {
        indices.iter().filter_map(|&i| self.records.get(i)).collect()
    }

    /// Borrow every record, in input order.
    pub fn all(&self) -> Vec<&SaleRecord> {
        self.records.iter().collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Build a record with a fixed condition and an mmr equal to the price.
    pub(crate) fn sale(year: i32, make: &str, state: &str, price: f64, day: u32) -> SaleRecord {
        SaleRecord {
            year,
            make: make.to_string(),
            state: state.to_string(),
            condition: Condition::new("4.0"),
            sellingprice: price,
            mmr: price,
            saledate: NaiveDate::from_ymd_opt(2015, 1, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn condition_orders_numerically_before_text() {
        let mut grades = vec![
            Condition::new("unknown"),
            Condition::new("45"),
            Condition::new("4.5"),
            Condition::new("10"),
        ];
        grades.sort();
        let labels: Vec<&str> = grades.iter().map(Condition::as_str).collect();
        assert_eq!(labels, vec!["4.5", "10", "45", "unknown"]);
    }

    #[test]
    fn condition_keeps_distinct_spellings_apart() {
        let a = Condition::new("4");
        let b = Condition::new("4.0");
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn dataset_indexes_unique_options() {
        let ds = VehicleDataset::from_records(
            vec![
                sale(2015, "Ford", "ca", 1.0, 1),
                sale(2014, "Kia", "ca", 2.0, 2),
                sale(2014, "Ford", "tx", 3.0, 3),
            ],
            LoadReport::default(),
        );
        assert_eq!(ds.years.iter().copied().collect::<Vec<_>>(), vec![2014, 2015]);
        assert_eq!(ds.makes.iter().cloned().collect::<Vec<_>>(), vec!["Ford", "Kia"]);
        assert_eq!(ds.states.len(), 2);
        assert_eq!(ds.total_sales, 6.0);
        let prices: Vec<f64> = ds.view(&[2, 0]).iter().map(|r| r.sellingprice).collect();
        assert_eq!(prices, vec![3.0, 1.0]);
    }

    #[test]
    fn report_formats_drop_reasons() {
        let mut report = LoadReport {
            rows_read: 5,
            rows_kept: 2,
            ..Default::default()
        };
        report.record_drop(DropReason::SaleDate);
        report.record_drop(DropReason::Mmr);
        report.record_drop(DropReason::Mmr);
        assert_eq!(report.total_dropped(), 3);
        assert_eq!(
            report.to_string(),
            "2 of 5 rows kept (dropped mmr: 2, saledate: 1)"
        );
    }
}
