use std::str::FromStr;

use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Color parsing
// ---------------------------------------------------------------------------

/// Parse a CSS-style color: a named color (`"firebrick"`) or a hex triplet
/// (`"#167b7e"`, `"167b7e"`).
pub fn parse_color(s: &str) -> Option<Srgb<u8>> {
    let s = s.trim();
    palette::named::from_str(&s.to_ascii_lowercase()).or_else(|| Srgb::<u8>::from_str(s).ok())
}

pub fn to_hex(c: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
}

/// egui color for a chart color string, falling back to gray for anything
/// unparseable.
pub fn to_color32(s: &str, opacity: f32) -> Color32 {
    srgb_to_color32(parse_color(s).unwrap_or(palette::named::GRAY), opacity)
}

pub fn srgb_to_color32(c: Srgb<u8>, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(c.red, c.green, c.blue, alpha)
}

// ---------------------------------------------------------------------------
// Colorscale: numeric channel value → color
// ---------------------------------------------------------------------------

/// Piecewise-linear colorscale, serialized the Plotly way:
/// `[[0, "#167b7e"], [1, "#4b3268"]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Colorscale(pub Vec<(f32, String)>);

impl Default for Colorscale {
    fn default() -> Self {
        Colorscale(vec![(0.0, "#167b7e".into()), (1.0, "#4b3268".into())])
    }
}

impl Colorscale {
    /// Color at `value` mapped through `[cmin, cmax]`. Interpolation happens in
    /// linear RGB between the two surrounding stops.
    pub fn color_at(&self, value: f32, cmin: f32, cmax: f32) -> Srgb<u8> {
        let t = if (cmax - cmin).abs() < f32::EPSILON {
            0.0
        } else {
            ((value - cmin) / (cmax - cmin)).clamp(0.0, 1.0)
        };

        let stops: Vec<(f32, Srgb<u8>)> = self
            .0
            .iter()
            .filter_map(|(pos, c)| parse_color(c).map(|rgb| (*pos, rgb)))
            .collect();

        let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
            return palette::named::GRAY;
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        for pair in stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t >= lo.0 && t <= hi.0 {
                let span = hi.0 - lo.0;
                let local = if span <= f32::EPSILON { 0.0 } else { (t - lo.0) / span };
                let a: LinSrgb = lo.1.into_format::<f32>().into_linear();
                let b: LinSrgb = hi.1.into_format::<f32>().into_linear();
                return Srgb::<f32>::from_linear(a.mix(b, local)).into_format();
            }
        }
        last.1
    }
}
