use std::collections::{BTreeMap, VecDeque};

use chrono::NaiveDateTime;
use serde::Serialize;

use super::model::{Condition, SaleRecord, VehicleDataset};

// ---------------------------------------------------------------------------
// Scalar metrics
// ---------------------------------------------------------------------------

/// Number of records in the unfiltered dataset.
pub fn total_count(dataset: &VehicleDataset) -> usize {
    dataset.len()
}

/// Mean selling price; `NaN` for an empty view.
pub fn mean_selling_price(view: &[&SaleRecord]) -> f64 {
    mean(view.iter().map(|r| r.sellingprice), view.len())
}

/// Mean market-reference value; `NaN` for an empty view.
pub fn mean_mmr(view: &[&SaleRecord]) -> f64 {
    mean(view.iter().map(|r| r.mmr), view.len())
}

/// Sum of selling prices.
pub fn total_sales(view: &[&SaleRecord]) -> f64 {
    view.iter().map(|r| r.sellingprice).sum()
}

fn mean(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    values.sum::<f64>() / n as f64
}

// ---------------------------------------------------------------------------
// Rolling price per make
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub saledate: NaiveDateTime,
    pub rolling_avg_price: f64,
}

/// Smoothed price series of one make, in sale order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MakeTrend {
    pub make: String,
    pub points: Vec<TrendPoint>,
}

/// Trailing mean of the last `window` prices within each make.
///
/// The view is sorted by sale date first; ties keep their view order. The
/// first rows of a make average whatever is available (minimum one row).
pub fn rolling_price_by_make(view: &[&SaleRecord], window: usize) -> Vec<MakeTrend> {
    let window = window.max(1);
    let mut sorted = view.to_vec();
    sorted.sort_by_key(|r| r.saledate);

    let mut groups: BTreeMap<&str, (VecDeque<f64>, Vec<TrendPoint>)> = BTreeMap::new();
    for rec in sorted {
        let (recent, points) = groups.entry(rec.make.as_str()).or_default();
        if recent.len() == window {
            recent.pop_front();
        }
        recent.push_back(rec.sellingprice);
        points.push(TrendPoint {
            saledate: rec.saledate,
            rolling_avg_price: recent.iter().sum::<f64>() / recent.len() as f64,
        });
    }

    groups
        .into_iter()
        .map(|(make, (_, points))| MakeTrend {
            make: make.to_string(),
            points,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Grouped sums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MakeTotal {
    pub make: String,
    pub count: usize,
    pub total_sales: f64,
}

/// Sales volume per make, sorted by make.
pub fn sales_by_make(view: &[&SaleRecord]) -> Vec<MakeTotal> {
    let mut totals: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for rec in view {
        let entry = totals.entry(rec.make.as_str()).or_default();
        entry.0 += 1;
        entry.1 += rec.sellingprice;
    }
    totals
        .into_iter()
        .map(|(make, (count, total_sales))| MakeTotal {
            make: make.to_string(),
            count,
            total_sales,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTotal {
    /// Upper-case state code.
    pub state: String,
    pub total_sales: f64,
}

/// Sales volume per state for the choropleth.
///
/// Codes are trimmed and upper-cased before grouping, so `ca` and `CA` land
/// in one bucket.
pub fn sales_by_state(view: &[&SaleRecord]) -> Vec<StateTotal> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for rec in view {
        *totals.entry(rec.state.trim().to_uppercase()).or_default() += rec.sellingprice;
    }
    totals
        .into_iter()
        .map(|(state, total_sales)| StateTotal { state, total_sales })
        .collect()
}

// ---------------------------------------------------------------------------
// Price distribution per condition
// ---------------------------------------------------------------------------

/// Box-and-whisker summary of selling prices for one condition grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionBox {
    pub condition: Condition,
    pub count: usize,
    pub mean: f64,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

/// One box per condition grade, in grade order.
///
/// Whiskers reach the furthest prices within 1.5 × IQR of the quartiles.
pub fn price_by_condition(view: &[&SaleRecord]) -> Vec<ConditionBox> {
    let mut groups: BTreeMap<&Condition, Vec<f64>> = BTreeMap::new();
    for rec in view {
        groups.entry(&rec.condition).or_default().push(rec.sellingprice);
    }

    groups
        .into_iter()
        .map(|(condition, mut prices)| {
            prices.sort_by(f64::total_cmp);
            let q1 = quantile(&prices, 0.25);
            let median = quantile(&prices, 0.5);
            let q3 = quantile(&prices, 0.75);
            let fence = 1.5 * (q3 - q1);
            let lower_whisker = prices
                .iter()
                .copied()
                .find(|&p| p >= q1 - fence)
                .unwrap_or(q1)
                .min(q1);
            // Interpolated quartiles can sit past the last in-fence sample, so the
            // whiskers are clamped to never end inside the box.
            let upper_whisker = prices
                .iter()
                .rev()
                .copied()
                .find(|&p| p <= q3 + fence)
                .unwrap_or(q3)
                .max(q3);
            ConditionBox {
                condition: condition.clone(),
                count: prices.len(),
                mean: prices.iter().sum::<f64>() / prices.len() as f64,
                lower_whisker,
                q1,
                median,
                q3,
                upper_whisker,
            }
        })
        .collect()
}

/// Linear interpolation between order statistics of a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// Dashboard summary – everything the charts need for one view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Unfiltered record count.
    pub total_cars_sold: usize,
    pub visible_count: usize,
    pub avg_selling_price: f64,
    pub avg_mmr: f64,
    /// Sum over the filtered view.
    pub total_sales_filtered: f64,
    /// Sum over the whole dataset, cached on the dataset at load.
    pub total_sales_all: f64,
    pub price_trends: Vec<MakeTrend>,
    pub sales_by_make: Vec<MakeTotal>,
    pub price_by_condition: Vec<ConditionBox>,
    pub sales_by_state: Vec<StateTotal>,
}

impl DashboardSummary {
    pub fn compute(dataset: &VehicleDataset, indices: &[usize], rolling_window: usize) -> Self {
        let view = dataset.view(indices);
        DashboardSummary {
            total_cars_sold: total_count(dataset),
            visible_count: view.len(),
            avg_selling_price: mean_selling_price(&view),
            avg_mmr: mean_mmr(&view),
            total_sales_filtered: total_sales(&view),
            total_sales_all: dataset.total_sales,
            price_trends: rolling_price_by_make(&view, rolling_window),
            sales_by_make: sales_by_make(&view),
            price_by_condition: price_by_condition(&view),
            sales_by_state: sales_by_state(&view),
        }
    }
}
