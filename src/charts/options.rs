//! Map Options
//! Projection and color scale choices offered in the control panel.

use egui::Color32;

/// Globe to plane mapping for the choropleth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Projection {
    #[default]
    NaturalEarth,
    Orthographic,
    Mercator,
    Equirectangular,
    Robinson,
    Mollweide,
}

impl Projection {
    pub const ALL: [Projection; 6] = [
        Projection::NaturalEarth,
        Projection::Orthographic,
        Projection::Mercator,
        Projection::Equirectangular,
        Projection::Robinson,
        Projection::Mollweide,
    ];

    /// Name understood by the map renderer.
    pub fn as_str(self) -> &'static str {
        match self {
            Projection::NaturalEarth => "natural earth",
            Projection::Orthographic => "orthographic",
            Projection::Mercator => "mercator",
            Projection::Equirectangular => "equirectangular",
            Projection::Robinson => "robinson",
            Projection::Mollweide => "mollweide",
        }
    }
}

/// Continuous color scale for the choropleth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorScale {
    #[default]
    Viridis,
    Plasma,
    Magma,
    Cividis,
    Inferno,
    Turbo,
}

impl ColorScale {
    pub const ALL: [ColorScale; 6] = [
        ColorScale::Viridis,
        ColorScale::Plasma,
        ColorScale::Magma,
        ColorScale::Cividis,
        ColorScale::Inferno,
        ColorScale::Turbo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorScale::Viridis => "Viridis",
            ColorScale::Plasma => "Plasma",
            ColorScale::Magma => "Magma",
            ColorScale::Cividis => "Cividis",
            ColorScale::Inferno => "Inferno",
            ColorScale::Turbo => "Turbo",
        }
    }

    /// Evenly spaced hex stops, low to high.
    pub fn stops(self) -> &'static [&'static str] {
        match self {
            ColorScale::Viridis => &[
                "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779",
                "#6ece58", "#b5de2b", "#fde725",
            ],
            ColorScale::Plasma => &[
                "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786", "#d8576b", "#ed7953",
                "#fb9f3a", "#fdca26", "#f0f921",
            ],
            ColorScale::Magma => &[
                "#000004", "#180f3d", "#440f76", "#721f81", "#9e2f7f", "#cd4071", "#f1605d",
                "#fd9668", "#feca8d", "#fcfdbf",
            ],
            ColorScale::Cividis => &[
                "#00224e", "#123570", "#3b496c", "#575d6d", "#707173", "#8a8678", "#a59c74",
                "#c3b369", "#e1cc55", "#fee838",
            ],
            ColorScale::Inferno => &[
                "#000004", "#1b0c41", "#4a0c6b", "#781c6d", "#a52c60", "#cf4446", "#ed6925",
                "#fb9b06", "#f7d13d", "#fcffa4",
            ],
            ColorScale::Turbo => &[
                "#30123b", "#4145ab", "#4675ed", "#39a2fc", "#1bcfd4", "#24eca6", "#61fc6c",
                "#a4fc3b", "#d1e834", "#f3c63a", "#fe9b2d", "#f36315", "#d93806", "#b11901",
                "#7a0402",
            ],
        }
    }

    /// `[[position, color], ...]` pairs spanning 0.0..=1.0.
    pub fn positioned_stops(self) -> Vec<(f64, &'static str)> {
        let stops = self.stops();
        let last = (stops.len() - 1) as f64;
        stops
            .iter()
            .enumerate()
            .map(|(i, hex)| (i as f64 / last, *hex))
            .collect()
    }

    /// Color at `t` in 0.0..=1.0, interpolated between stops.
    pub fn sample(self, t: f64) -> Color32 {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (stops.len() - 1) as f64;
        let lower = scaled.floor() as usize;
        let upper = (lower + 1).min(stops.len() - 1);
        let frac = scaled - lower as f64;

        let [r0, g0, b0] = hex_to_rgb(stops[lower]);
        let [r1, g1, b1] = hex_to_rgb(stops[upper]);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        Color32::from_rgb(mix(r0, r1), mix(g0, g1), mix(b0, b1))
    }
}

/// Qualitative palette for line chart series.
pub const SERIES_COLORS: [&str; 10] = [
    "#636efa", "#EF553B", "#00cc96", "#ab63fa", "#FFA15A", "#19d3f3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

pub fn series_color(index: usize) -> &'static str {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

pub fn hex_to_color(hex: &str) -> Color32 {
    let [r, g, b] = hex_to_rgb(hex);
    Color32::from_rgb(r, g, b)
}

pub fn hex_to_rgb(hex: &str) -> [u8; 3] {
    let hex = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    [channel(0..2), channel(2..4), channel(4..6)]
}

/// Short labels for large magnitudes, used by tick labels and the color bar.
pub fn format_compact(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{:.0}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_labels_scale_by_magnitude() {
        assert_eq!(format_compact(7_900_000_000.0), "7.9B");
        assert_eq!(format_compact(-1_200_000.0), "-1.2M");
        assert_eq!(format_compact(-250_000.0), "-250.0k");
        assert_eq!(format_compact(4_500.0), "4.5k");
        assert_eq!(format_compact(12.0), "12");
    }

    #[test]
    fn projection_names() {
        let names: Vec<&str> = Projection::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            names,
            [
                "natural earth",
                "orthographic",
                "mercator",
                "equirectangular",
                "robinson",
                "mollweide"
            ]
        );
        assert_eq!(Projection::default(), Projection::NaturalEarth);
    }

    #[test]
    fn sample_hits_end_stops() {
        for scale in ColorScale::ALL {
            let stops = scale.stops();
            let [r, g, b] = hex_to_rgb(stops[0]);
            assert_eq!(scale.sample(0.0), Color32::from_rgb(r, g, b));
            let [r, g, b] = hex_to_rgb(stops[stops.len() - 1]);
            assert_eq!(scale.sample(1.0), Color32::from_rgb(r, g, b));
            assert_eq!(scale.sample(7.0), scale.sample(1.0));
        }
    }

    #[test]
    fn positioned_stops_span_unit_interval() {
        let stops = ColorScale::Turbo.positioned_stops();
        assert_eq!(stops.first().map(|s| s.0), Some(0.0));
        assert_eq!(stops.last().map(|s| s.0), Some(1.0));
        assert_eq!(stops.len(), ColorScale::Turbo.stops().len());
    }

    #[test]
    fn parses_hex() {
        assert_eq!(hex_to_rgb("#fde725"), [0xfd, 0xe7, 0x25]);
        assert_eq!(hex_to_rgb("zz"), [0, 0, 0]);
        assert_eq!(hex_to_color("#EF553B"), Color32::from_rgb(0xef, 0x55, 0x3b));
    }

    #[test]
    fn series_colors_wrap() {
        assert_eq!(series_color(0), series_color(SERIES_COLORS.len()));
        assert_ne!(series_color(0), series_color(1));
    }
}
