use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{AppState, ChartTab};
use crate::ui::format;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// What the user did inside one multiselect this frame.
enum SelectAction<T> {
    Toggle(T),
    Clear,
}

/// Render the left filter panel and the dataset preview.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let action = multiselect(
                ui,
                "Select Model Year",
                &state.dataset.years,
                &state.selection.years,
                |_| None,
            );
            match action {
                Some(SelectAction::Toggle(year)) => state.toggle_year(year),
                Some(SelectAction::Clear) => state.clear_years(),
                None => {}
            }

            let colors = &state.make_colors;
            let action = multiselect(
                ui,
                "Select Brand",
                &state.dataset.makes,
                &state.selection.makes,
                |make: &String| Some(colors.color_for(make)),
            );
            match action {
                Some(SelectAction::Toggle(make)) => state.toggle_make(&make),
                Some(SelectAction::Clear) => state.clear_makes(),
                None => {}
            }

            let action = multiselect(
                ui,
                "Select State",
                &state.dataset.states,
                &state.selection.states,
                |_| None,
            );
            match action {
                Some(SelectAction::Toggle(code)) => state.toggle_state(&code),
                Some(SelectAction::Clear) => state.clear_states(),
                None => {}
            }

            ui.separator();
            ui.strong("Dataset Preview");
            preview_table(ui, state);
        });
}

/// A collapsible checkbox list. Nothing checked means no constraint.
fn multiselect<T: Ord + Clone + ToString>(
    ui: &mut Ui,
    title: &str,
    options: &BTreeSet<T>,
    selected: &BTreeSet<T>,
    color_of: impl Fn(&T) -> Option<Color32>,
) -> Option<SelectAction<T>> {
    let mut action = None;
    let header_text = if selected.is_empty() {
        format!("{title}  (all {})", options.len())
    } else {
        format!("{title}  ({}/{})", selected.len(), options.len())
    };

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui
                .add_enabled(!selected.is_empty(), egui::Button::new("Clear").small())
                .clicked()
            {
                action = Some(SelectAction::Clear);
            }

            ScrollArea::vertical()
                .id_salt(format!("{title}_options"))
                .max_height(220.0)
                .show(ui, |ui: &mut Ui| {
                    for val in options {
                        let mut text = RichText::new(val.to_string());
                        if let Some(c) = color_of(val) {
                            text = text.color(c);
                        }
                        let mut checked = selected.contains(val);
                        if ui.checkbox(&mut checked, text).changed() {
                            action = Some(SelectAction::Toggle(val.clone()));
                        }
                    }
                });
        });

    action
}

/// First rows of the filtered view.
fn preview_table(ui: &mut Ui, state: &AppState) {
    let rows = state.preview();
    if rows.is_empty() {
        ui.label("No rows.");
        return;
    }

    ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto(), 7)
                .header(18.0, |mut header| {
                    for name in [
                        "year",
                        "make",
                        "state",
                        "condition",
                        "sellingprice",
                        "mmr",
                        "saledate",
                    ] {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for rec in rows {
                        body.row(18.0, |mut row| {
                            row.col(|ui: &mut Ui| {
                                ui.label(rec.year.to_string());
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(rec.make.as_str());
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(rec.state.as_str());
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(rec.condition.as_str());
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(format::thousands(rec.sellingprice, 0));
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(format::thousands(rec.mmr, 0));
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(rec.saledate.format("%Y-%m-%d %H:%M").to_string());
                            });
                        });
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Central panel header – KPIs and chart tabs
// ---------------------------------------------------------------------------

/// Headline metrics for the current view.
pub fn kpi_row(ui: &mut Ui, state: &AppState) {
    let s = &state.summary;
    ui.columns(4, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Total Cars Sold", format::count(s.total_cars_sold), None);
        metric(&mut cols[1], "Average Selling Price", format::money(s.avg_selling_price), None);
        metric(&mut cols[2], "Average MMR Value", format::money(s.avg_mmr), None);
        metric(
            &mut cols[3],
            "Total Sales (Filtered)",
            format::money(s.total_sales_filtered),
            Some(format!("All records: {}", format::money(s.total_sales_all))),
        );
    });
}

fn metric(ui: &mut Ui, label: &str, value: String, hover: Option<String>) {
    let response = ui
        .vertical(|ui: &mut Ui| {
            ui.label(RichText::new(label).small());
            ui.label(RichText::new(value).size(24.0).strong());
        })
        .response;
    if let Some(text) = hover {
        response.on_hover_text(text);
    }
}

pub fn chart_tabs(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in ChartTab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, tab.title());
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export summary…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} records loaded, {} visible",
            format::count(state.dataset.len()),
            format::count(state.visible_indices.len())
        ));

        let report = &state.dataset.report;
        if report.total_dropped() > 0 {
            ui.label(
                RichText::new(format!("{} rows dropped", format::count(report.total_dropped())))
                    .color(Color32::YELLOW),
            )
            .on_hover_text(report.to_string());
        }

        ui.separator();

        if ui
            .add_enabled(!state.selection.is_empty(), egui::Button::new("Clear filters"))
            .clicked()
        {
            state.clear_all();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open vehicle sales CSV")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Switched to {} ({} records, {} makes)",
                    path.display(),
                    dataset.len(),
                    dataset.makes.len()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export dashboard summary")
        .set_file_name("dashboard_summary.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match state.export_summary(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export summary: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
