use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::aggregate::DashboardSummary;
use crate::data::filter::{Selection, filtered_indices};
use crate::data::model::{LoadReport, SaleRecord, VehicleDataset};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which chart fills the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartTab {
    #[default]
    PriceTrends,
    SalesByBrand,
    ConditionPrices,
    SalesByState,
}

impl ChartTab {
    pub const ALL: [ChartTab; 4] = [
        ChartTab::PriceTrends,
        ChartTab::SalesByBrand,
        ChartTab::ConditionPrices,
        ChartTab::SalesByState,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartTab::PriceTrends => "Smoothed Price Trends Over Time",
            ChartTab::SalesByBrand => "Sales Distribution by Brand",
            ChartTab::ConditionPrices => "Condition-Based Price Analysis",
            ChartTab::SalesByState => "Total Sales by State",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Cleaned dataset, loaded once at startup (or swapped via File → Open).
    pub dataset: VehicleDataset,

    /// Sidebar multiselects.
    pub selection: Selection,

    /// Indices of records passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    /// Metrics and chart series for `visible_indices`.
    pub summary: DashboardSummary,

    /// One colour per make, shared by every chart.
    pub make_colors: ColorMap,

    pub active_tab: ChartTab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig, dataset: VehicleDataset) -> Self {
        let visible_indices: Vec<usize> = (0..dataset.len()).collect();
        let summary = DashboardSummary::compute(&dataset, &visible_indices, config.rolling_window);
        let make_colors = ColorMap::new(&dataset.makes);
        Self {
            config,
            dataset,
            selection: Selection::default(),
            visible_indices,
            summary,
            make_colors,
            active_tab: ChartTab::default(),
            status_message: None,
        }
    }

    /// Swap in a newly loaded dataset, keeping picks that still apply.
    pub fn set_dataset(&mut self, dataset: VehicleDataset) {
        self.make_colors = ColorMap::new(&dataset.makes);
        self.selection.retain_available(&dataset);
        self.dataset = dataset;
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the view and every aggregate after a selection change.
    pub fn refilter(&mut self) {
        self.visible_indices = filtered_indices(&self.dataset, &self.selection);
        if self.visible_indices.is_empty() && !self.dataset.is_empty() {
            log::warn!("Selection {:?} matches no records", self.selection);
        }
        self.summary = DashboardSummary::compute(
            &self.dataset,
            &self.visible_indices,
            self.config.rolling_window,
        );
    }

    pub fn toggle_year(&mut self, year: i32) {
        self.selection.toggle_year(year);
        self.refilter();
    }

    pub fn toggle_make(&mut self, make: &str) {
        self.selection.toggle_make(make);
        self.refilter();
    }

    pub fn toggle_state(&mut self, state: &str) {
        self.selection.toggle_state(state);
        self.refilter();
    }

    pub fn clear_years(&mut self) {
        self.selection.years.clear();
        self.refilter();
    }

    pub fn clear_makes(&mut self) {
        self.selection.makes.clear();
        self.refilter();
    }

    pub fn clear_states(&mut self) {
        self.selection.states.clear();
        self.refilter();
    }

    pub fn clear_all(&mut self) {
        self.selection.clear();
        self.refilter();
    }

    /// First rows of the filtered view, for the preview table.
    pub fn preview(&self) -> Vec<&SaleRecord> {
        let n = self.visible_indices.len().min(self.config.preview_rows);
        self.dataset.view(&self.visible_indices[..n])
    }

    /// Write the current summary as pretty-printed JSON, together with the
    /// selection and load report it was computed from.
    pub fn export_summary(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let export = SummaryExport {
            selection: &self.selection,
            load_report: &self.dataset.report,
            summary: &self.summary,
        };
        serde_json::to_writer_pretty(BufWriter::new(file), &export)
            .context("writing dashboard summary")?;
        log::info!(
            "Exported summary of {} records to {}",
            self.summary.visible_count,
            path.display()
        );
        Ok(())
    }
}

/// What the summary was computed from, alongside the summary itself.
#[derive(Serialize)]
struct SummaryExport<'a> {
    selection: &'a Selection,
    load_report: &'a LoadReport,
    summary: &'a DashboardSummary,
}
