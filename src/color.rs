use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Sequential blue scale for the state map
// ---------------------------------------------------------------------------

/// Colour for `t` in `[0, 1]`, from pale to deep blue. Mixed in linear light.
pub fn blue_scale(t: f32) -> Color32 {
    let pale: LinSrgb = Srgb::new(0.94, 0.96, 1.0).into_linear();
    let deep: LinSrgb = Srgb::new(0.03, 0.19, 0.42).into_linear();
    let mixed = pale.mix(deep, t.clamp(0.0, 1.0));
    to_color32(Srgb::from_linear(mixed))
}

// ---------------------------------------------------------------------------
// Color mapping: make → Color32
// ---------------------------------------------------------------------------

/// Maps each make to a distinct colour so every chart agrees on it.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the sorted set of makes.
    pub fn new(makes: &BTreeSet<String>) -> Self {
        let palette = generate_palette(makes.len());
        let mapping: BTreeMap<String, Color32> = makes.iter().cloned().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given make.
    pub fn color_for(&self, make: &str) -> Color32 {
        self.mapping
            .get(make)
            .copied()
            .unwrap_or(self.default_color)
    }
}
