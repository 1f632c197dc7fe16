//! Runtime configuration for the dashboard.
//!
//! The app takes no command-line flags; defaults can be overridden through
//! environment variables.

use std::path::PathBuf;
use std::str::FromStr;

pub const APP_TITLE: &str = "Vehicle Sales and Market Trends Dashboard";
pub const WINDOW_SIZE: [f32; 2] = [1400.0, 900.0];
pub const MIN_WINDOW_SIZE: [f32; 2] = [800.0, 500.0];

pub const DEFAULT_DATA_PATH: &str = "car_prices.csv";
/// Trailing rows per make used to smooth the price trend chart.
pub const DEFAULT_ROLLING_WINDOW: usize = 30;
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

pub const ENV_DATA_PATH: &str = "VEHICLE_DASHBOARD_CSV";
pub const ENV_ROLLING_WINDOW: &str = "VEHICLE_DASHBOARD_ROLLING_WINDOW";
pub const ENV_PREVIEW_ROWS: &str = "VEHICLE_DASHBOARD_PREVIEW_ROWS";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// CSV loaded at startup.
    pub data_path: PathBuf,
    pub rolling_window: usize,
    /// Rows shown in the sidebar preview table.
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            rolling_window: DEFAULT_ROLLING_WINDOW,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl DashboardConfig {
    /// Defaults with any environment overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparsable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let data_path = lookup(ENV_DATA_PATH)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);
        let rolling_window = parse_override(&lookup, ENV_ROLLING_WINDOW, defaults.rolling_window)
            .max(1);
        let preview_rows = parse_override(&lookup, ENV_PREVIEW_ROWS, defaults.preview_rows);

        Self {
            data_path,
            rolling_window,
            preview_rows,
        }
    }
}

fn parse_override<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring {key}={raw:?}: not a valid value");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        assert_eq!(DashboardConfig::from_lookup(lookup(&[])), DashboardConfig::default());
    }

    #[test]
    fn overrides_apply() {
        let cfg = DashboardConfig::from_lookup(lookup(&[
            (ENV_DATA_PATH, "/data/sales.csv"),
            (ENV_ROLLING_WINDOW, " 7 "),
            (ENV_PREVIEW_ROWS, "12"),
        ]));
        assert_eq!(cfg.data_path, PathBuf::from("/data/sales.csv"));
        assert_eq!(cfg.rolling_window, 7);
        assert_eq!(cfg.preview_rows, 12);
    }

    #[test]
    fn bad_overrides_fall_back() {
        let cfg = DashboardConfig::from_lookup(lookup(&[
            (ENV_ROLLING_WINDOW, "thirty"),
            (ENV_PREVIEW_ROWS, "-1"),
            (ENV_DATA_PATH, "  "),
        ]));
        assert_eq!(cfg, DashboardConfig::default());
    }

    #[test]
    fn zero_window_is_raised_to_one() {
        let cfg = DashboardConfig::from_lookup(lookup(&[(ENV_ROLLING_WINDOW, "0")]));
        assert_eq!(cfg.rolling_window, 1);
    }
}
