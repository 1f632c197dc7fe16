use chrono::DateTime;
use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints};

use crate::color::generate_palette;
use crate::state::{AppState, ChartTab};
use crate::ui::choropleth;

// ---------------------------------------------------------------------------
// Chart area (central panel)
// ---------------------------------------------------------------------------

/// Render whichever chart tab is active.
pub fn active_chart(ui: &mut Ui, state: &AppState) {
    ui.heading(state.active_tab.title());

    if state.visible_indices.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No sales match the current filters");
        });
        return;
    }

    match state.active_tab {
        ChartTab::PriceTrends => price_trend_plot(ui, state),
        ChartTab::SalesByBrand => brand_bar_chart(ui, state),
        ChartTab::ConditionPrices => condition_box_plot(ui, state),
        ChartTab::SalesByState => choropleth::state_map(ui, &state.summary.sales_by_state),
    }
}

/// One smoothed line per make, x = sale time in seconds since the epoch.
fn price_trend_plot(ui: &mut Ui, state: &AppState) {
    Plot::new("price_trends")
        .legend(Legend::default())
        .x_axis_label("Sale date")
        .y_axis_label("Rolling average price")
        .x_axis_formatter(|mark, _range| date_label(mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for trend in &state.summary.price_trends {
                let points: PlotPoints = trend
                    .points
                    .iter()
                    .map(|p| [p.saledate.and_utc().timestamp() as f64, p.rolling_avg_price])
                    .collect();

                let line = Line::new(points)
                    .name(&trend.make)
                    .color(state.make_colors.color_for(&trend.make))
                    .width(1.5);

                plot_ui.line(line);
            }
        });
}

/// Total selling price per make; one chart per make so the legend lists them.
fn brand_bar_chart(ui: &mut Ui, state: &AppState) {
    let makes = &state.summary.sales_by_make;
    let labels: Vec<String> = makes.iter().map(|m| m.make.clone()).collect();

    Plot::new("sales_by_brand")
        .legend(Legend::default())
        .y_axis_label("Total selling price")
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for (i, m) in makes.iter().enumerate() {
                let color = state.make_colors.color_for(&m.make);
                let bar = Bar::new(i as f64, m.total_sales)
                    .name(format!("{} ({} sold)", m.make, m.count))
                    .fill(color)
                    .width(0.7);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(&m.make).color(color));
            }
        });
}

/// Price distribution per condition grade.
fn condition_box_plot(ui: &mut Ui, state: &AppState) {
    let boxes = &state.summary.price_by_condition;
    let labels: Vec<String> = boxes.iter().map(|b| b.condition.to_string()).collect();
    let colors = generate_palette(boxes.len());

    Plot::new("price_by_condition")
        .legend(Legend::default())
        .x_axis_label("Condition")
        .y_axis_label("Selling price")
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for (i, (b, color)) in boxes.iter().zip(colors).enumerate() {
                let spread = BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker);
                let elem = BoxElem::new(i as f64, spread)
                    .name(format!("{} (n = {})", b.condition, b.count))
                    .box_width(0.6);
                plot_ui.box_plot(
                    BoxPlot::new(vec![elem])
                        .name(b.condition.to_string())
                        .color(color),
                );
            }
        });
}

fn date_label(epoch_secs: f64) -> String {
    DateTime::from_timestamp(epoch_secs as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Axis label for a categorical x position; blank between categories.
fn category_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_only_on_whole_positions() {
        let labels = vec!["Ford".to_string(), "Kia".to_string()];
        assert_eq!(category_label(&labels, 1.0), "Kia");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(category_label(&labels, 7.0), "");
    }

    #[test]
    fn date_labels_are_utc_days() {
        assert_eq!(date_label(1_418_761_800.0), "2014-12-16");
    }
}
