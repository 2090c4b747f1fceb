use std::collections::BTreeMap;

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
// Sequential scale for the heatmap
// ---------------------------------------------------------------------------

/// White-to-deep-blue scale; `t` is clamped to `[0, 1]`.
pub fn sequential_blue(t: f32) -> Color32 {
    let light: LinSrgb = Srgb::new(0.969, 0.984, 1.0).into_linear();
    let dark: LinSrgb = Srgb::new(0.031, 0.188, 0.420).into_linear();
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    to_color32(Srgb::from_linear(light.mix(dark, t)))
}

/// Readable text colour on top of a [`sequential_blue`] cell.
pub fn text_on_blue(t: f32) -> Color32 {
    if t > 0.55 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}

// ---------------------------------------------------------------------------
// Product colours
// ---------------------------------------------------------------------------

/// Maps every product to a distinct colour so all charts agree.
#[derive(Debug, Clone, Default)]
pub struct SeriesColors {
    mapping: BTreeMap<String, Color32>,
}

impl SeriesColors {
    /// Build from the sorted product dimension.
    pub fn new(products: &[String]) -> Self {
        let mapping = products
            .iter()
            .cloned()
            .zip(generate_palette(products.len()))
            .collect();
        Self { mapping }
    }

    pub fn color_for(&self, product: &str) -> Color32 {
        self.mapping.get(product).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_sizes() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        assert_ne!(p[0], p[1]);
    }

    #[test]
    fn blue_scale_darkens_with_value() {
        let lo = sequential_blue(0.0);
        let hi = sequential_blue(1.0);
        let luminance = |c: Color32| c.r() as u32 + c.g() as u32 + c.b() as u32;
        assert!(luminance(lo) > luminance(sequential_blue(0.5)));
        assert!(luminance(sequential_blue(0.5)) > luminance(hi));
        assert_eq!(sequential_blue(2.0), hi);
        assert_eq!(sequential_blue(f32::NAN), lo);
    }

    #[test]
    fn products_keep_their_colour() {
        let products = vec!["A".to_string(), "B".to_string()];
        let colors = SeriesColors::new(&products);
        assert_ne!(colors.color_for("A"), colors.color_for("B"));
        assert_eq!(colors.color_for("A"), SeriesColors::new(&products).color_for("A"));
        assert_eq!(colors.color_for("Z"), Color32::GRAY);
    }
}
