/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///   car_prices.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + coerce rows → VehicleDataset (bad rows dropped)
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ VehicleDataset │  Vec<SaleRecord>, option sets, LoadReport
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year / make / state selections → visible indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  KPIs, rolling trends, grouped sums → DashboardSummary
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
