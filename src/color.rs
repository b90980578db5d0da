use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::analysis::adjustment::Adjustment;
use crate::analysis::normalize::PALETTE_SIZE;

// ---------------------------------------------------------------------------
// Slope palette: white → dark red
// ---------------------------------------------------------------------------

/// Background for wells without a palette index (negative slope, no fit).
pub const NEUTRAL: Color32 = Color32::WHITE;

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Sequential red palette of `n` shades, lightest first.
///
/// Index 0 is plain white so zero-rate wells read as empty.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    let steps = (n.max(2) - 1) as f32;
    let mut colors: Vec<Color32> = (0..n)
        .map(|i| {
            let t = i as f32 / steps;
            let lightness = 0.96 - t * 0.64;
            let saturation = 0.55 + t * 0.35;
            hsl_to_color32(Hsl::new(2.0_f32, saturation, lightness))
        })
        .collect();
    colors[0] = NEUTRAL;
    colors
}

/// Maps normalized palette indices to colours.
#[derive(Debug, Clone)]
pub struct SlopePalette {
    colors: Vec<Color32>,
}

impl Default for SlopePalette {
    fn default() -> Self {
        Self {
            colors: generate_palette(PALETTE_SIZE),
        }
    }
}

impl SlopePalette {
    /// Colour for a palette index, neutral when there is none.
    pub fn color_for(&self, index: Option<usize>) -> Color32 {
        index
            .and_then(|i| self.colors.get(i))
            .copied()
            .unwrap_or(NEUTRAL)
    }
}

/// `n` visually distinct colours using evenly spaced hues (detail plot).
pub fn distinct_colors(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_to_color32(Hsl::new(hue, 0.75, 0.45))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Well border: which trims were applied
// ---------------------------------------------------------------------------

/// Gray / green / blue / orange for none / break / range / both.
pub fn border_color(adjustment: Adjustment) -> Color32 {
    match adjustment {
        Adjustment::None => Color32::from_rgb(0x63, 0x63, 0x63),
        Adjustment::BreakTrimmed => Color32::from_rgb(0x66, 0xc2, 0xa5),
        Adjustment::RangeTrimmed => Color32::from_rgb(0x8d, 0xa0, 0xcb),
        Adjustment::Both => Color32::from_rgb(0xfc, 0x8d, 0x62),
    }
}

/// Legend entries (label → colour) for the border key in the UI.
pub fn border_legend() -> Vec<(&'static str, Color32)> {
    [
        Adjustment::None,
        Adjustment::BreakTrimmed,
        Adjustment::RangeTrimmed,
        Adjustment::Both,
    ]
    .into_iter()
    .map(|a| (a.label(), border_color(a)))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brightness(c: Color32) -> u32 {
        c.r() as u32 + c.g() as u32 + c.b() as u32
    }

    #[test]
    fn palette_darkens_along_index() {
        let palette = generate_palette(PALETTE_SIZE);
        assert_eq!(palette.len(), PALETTE_SIZE);
        assert_eq!(palette[0], NEUTRAL);
        for pair in palette[1..].windows(2) {
            assert!(brightness(pair[0]) >= brightness(pair[1]));
        }
        let darkest = palette[PALETTE_SIZE - 1];
        assert!(darkest.r() > darkest.g());
    }

    #[test]
    fn missing_index_is_neutral() {
        let palette = SlopePalette::default();
        assert_eq!(palette.color_for(None), NEUTRAL);
        assert_eq!(palette.color_for(Some(PALETTE_SIZE + 5)), NEUTRAL);
        assert_ne!(palette.color_for(Some(PALETTE_SIZE - 1)), NEUTRAL);
    }

    #[test]
    fn distinct_colors_differ() {
        let colors = distinct_colors(5);
        assert_eq!(colors.len(), 5);
        assert_ne!(colors[0], colors[1]);
        assert!(distinct_colors(0).is_empty());
    }

    #[test]
    fn every_adjustment_has_its_own_border() {
        let legend = border_legend();
        assert_eq!(legend.len(), 4);
        for (i, a) in legend.iter().enumerate() {
            for b in &legend[i + 1..] {
                assert_ne!(a.1, b.1);
            }
        }
    }
}
