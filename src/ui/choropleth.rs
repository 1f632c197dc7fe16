use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{Plot, PlotPoint, PlotPoints, Polygon, Text};

use crate::color::blue_scale;
use crate::data::aggregate::StateTotal;
use crate::ui::format;

// ---------------------------------------------------------------------------
// US tile-grid map
// ---------------------------------------------------------------------------

pub const GRID_COLUMNS: u8 = 12;
pub const GRID_ROWS: u8 = 8;
const LEGEND_STEPS: usize = 8;

/// (code, column, row) of every state plus DC on a 12 × 8 tile grid.
#[rustfmt::skip]
pub const STATE_TILES: [(&str, u8, u8); 51] = [
    ("AK", 0, 0), ("ME", 11, 0),
    ("VT", 10, 1), ("NH", 11, 1),
    ("WA", 1, 2), ("ID", 2, 2), ("MT", 3, 2), ("ND", 4, 2), ("MN", 5, 2), ("IL", 6, 2),
    ("WI", 7, 2), ("MI", 8, 2), ("NY", 9, 2), ("RI", 10, 2), ("MA", 11, 2),
    ("OR", 1, 3), ("NV", 2, 3), ("WY", 3, 3), ("SD", 4, 3), ("IA", 5, 3), ("IN", 6, 3),
    ("OH", 7, 3), ("PA", 8, 3), ("NJ", 9, 3), ("CT", 10, 3),
    ("CA", 1, 4), ("UT", 2, 4), ("CO", 3, 4), ("NE", 4, 4), ("MO", 5, 4), ("KY", 6, 4),
    ("WV", 7, 4), ("VA", 8, 4), ("MD", 9, 4), ("DE", 10, 4),
    ("AZ", 2, 5), ("NM", 3, 5), ("KS", 4, 5), ("AR", 5, 5), ("TN", 6, 5), ("NC", 7, 5),
    ("SC", 8, 5), ("DC", 9, 5),
    ("OK", 4, 6), ("LA", 5, 6), ("MS", 6, 6), ("AL", 7, 6), ("GA", 8, 6),
    ("HI", 0, 7), ("TX", 4, 7), ("FL", 9, 7),
];

/// Grid cell of an upper-case state code.
pub fn tile_position(code: &str) -> Option<(u8, u8)> {
    STATE_TILES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|&(_, col, row)| (col, row))
}

/// Shade each state tile by its share of the largest state total.
pub fn state_map(ui: &mut Ui, totals: &[StateTotal]) {
    let max = totals
        .iter()
        .map(|t| t.total_sales)
        .fold(0.0_f64, f64::max);
    let mut hovered: Option<(&str, f64)> = None;

    Plot::new("sales_by_state")
        .data_aspect(1.0)
        .include_x(0.0)
        .include_x(GRID_COLUMNS as f64)
        .include_y(0.0)
        .include_y(-(GRID_ROWS as f64))
        .height((ui.available_height() - 60.0).max(200.0))
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            let pointer = plot_ui.pointer_coordinate();
            for &(code, col, row) in &STATE_TILES {
                // Rows run downwards on the grid, upwards in plot space.
                let x_min = col as f64 + 0.05;
                let x_max = col as f64 + 0.95;
                let y_max = -(row as f64) - 0.05;
                let y_min = -(row as f64) - 0.95;
                let total = totals
                    .iter()
                    .find(|t| t.state == code)
                    .map(|t| t.total_sales);
                let share = match total {
                    Some(v) if max > 0.0 => Some((v / max) as f32),
                    _ => None,
                };

                let fill = share.map_or(Color32::from_gray(60), blue_scale);
                let is_hovered = pointer.is_some_and(|p| {
                    p.x >= x_min && p.x <= x_max && p.y >= y_min && p.y <= y_max
                });
                let stroke = if is_hovered {
                    Stroke::new(2.0, Color32::YELLOW)
                } else {
                    Stroke::new(1.0, Color32::from_gray(30))
                };

                let points = PlotPoints::new(vec![
                    [x_min, y_min],
                    [x_max, y_min],
                    [x_max, y_max],
                    [x_min, y_max],
                ]);
                plot_ui.polygon(Polygon::new(points).fill_color(fill).stroke(stroke));

                let text_color = match share {
                    Some(s) if s > 0.5 => Color32::WHITE,
                    Some(_) => Color32::BLACK,
                    None => Color32::GRAY,
                };
                let center = PlotPoint::new((x_min + x_max) / 2.0, (y_min + y_max) / 2.0);
                plot_ui.text(Text::new(center, RichText::new(code).color(text_color).strong()));

                if is_hovered {
                    hovered = Some((code, total.unwrap_or(0.0)));
                }
            }
        });

    ui.horizontal(|ui: &mut Ui| {
        ui.label("$0");
        for step in 0..=LEGEND_STEPS {
            let t = step as f32 / LEGEND_STEPS as f32;
            ui.label(RichText::new("■").size(18.0).color(blue_scale(t)));
        }
        ui.label(format::money(max));
    });

    match hovered {
        Some((code, total)) => ui.label(format!("{code}: {}", format::money(total))),
        None => ui.weak("Hover a state for its total"),
    };

    let outside: Vec<String> = totals
        .iter()
        .filter(|t| tile_position(&t.state).is_none())
        .map(|t| format!("{} {}", t.state, format::money(t.total_sales)))
        .collect();
    if !outside.is_empty() {
        ui.label(format!("Outside the map: {}", outside.join(", ")));
    }
}
