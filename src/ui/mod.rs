//! egui rendering: panels, charts, and the state map.

pub mod choropleth;
pub mod format;
pub mod panels;
pub mod plot;
