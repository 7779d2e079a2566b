//! Chart Plotter Module
//! Draws native previews of the charts using egui_plot.

use crate::charts::builder::{ChoroplethChart, LineChart, MapFrame};
use crate::charts::options::{format_compact, hex_to_color, series_color, ColorScale};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

/// Number of countries shown in a map frame preview.
pub const FRAME_PREVIEW_LEN: usize = 20;

/// Draws charts inside the egui window.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Position of `value` inside `range`, clamped to 0..=1.
    pub fn normalize(value: f64, range: Option<(f64, f64)>) -> f64 {
        match range {
            Some((min, max)) if max > min => ((value - min) / (max - min)).clamp(0.0, 1.0),
            _ => 0.5,
        }
    }

    /// Highest valued countries of a frame, largest first. Missing values are skipped.
    pub fn top_countries(frame: &MapFrame, limit: usize) -> Vec<(String, f64)> {
        let mut rows: Vec<(String, f64)> = frame
            .locations
            .iter()
            .zip(&frame.values)
            .filter_map(|(country, value)| value.map(|v| (country.clone(), v)))
            .filter(|(_, v)| !v.is_nan())
            .collect();
        rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        rows.truncate(limit);
        rows
    }

    /// Draw the line chart: Year on x, indicator value on y, one line per country.
    pub fn draw_line_chart(ui: &mut egui::Ui, chart: &LineChart, height: f32) {
        Plot::new(format!("line_{}", chart.value_column))
            .height(height)
            .legend(Legend::default())
            .x_axis_label(chart.x_title)
            .y_axis_label(chart.y_title.clone())
            .allow_scroll(false)
            .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
            .show(ui, |plot_ui| {
                for (i, series) in chart.series.iter().enumerate() {
                    let color = hex_to_color(series_color(i));

                    // One line per run of present values; same name keeps one legend entry.
                    let mut run: Vec<[f64; 2]> = Vec::new();
                    let points = series.years.iter().zip(&series.values);
                    for (year, value) in points {
                        match value {
                            Some(v) => run.push([*year as f64, *v]),
                            None => {
                                if !run.is_empty() {
                                    plot_ui.line(
                                        Line::new(PlotPoints::from(std::mem::take(&mut run)))
                                            .color(color)
                                            .width(2.0)
                                            .name(&series.country),
                                    );
                                }
                            }
                        }
                    }
                    if !run.is_empty() {
                        plot_ui.line(
                            Line::new(PlotPoints::from(run))
                                .color(color)
                                .width(2.0)
                                .name(&series.country),
                        );
                    }
                }
            });
    }

    /// Draw one map frame as horizontal bars colored by the map's color scale.
    pub fn draw_map_frame(ui: &mut egui::Ui, chart: &ChoroplethChart, frame: &MapFrame, height: f32) {
        let rows = Self::top_countries(frame, FRAME_PREVIEW_LEN);
        let labels: Vec<String> = rows.iter().rev().map(|(c, _)| c.clone()).collect();

        let bars: Vec<Bar> = rows
            .iter()
            .rev()
            .enumerate()
            .map(|(i, (country, value))| {
                let t = Self::normalize(*value, chart.value_range);
                Bar::new(i as f64, *value)
                    .width(0.8)
                    .fill(chart.color_scale.sample(t))
                    .name(country)
            })
            .collect();

        Plot::new(format!("map_frame_{}", chart.value_column))
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show_grid([true, false])
            .x_axis_label(chart.legend_label)
            .y_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .y_axis_min_width(140.0)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).horizontal());
            });

        ui.add_space(4.0);
        Self::draw_color_bar(ui, chart.color_scale, chart.value_range, chart.legend_label);
    }

    /// Gradient strip with the range endpoints.
    pub fn draw_color_bar(
        ui: &mut egui::Ui,
        scale: ColorScale,
        range: Option<(f64, f64)>,
        label: &str,
    ) {
        const STEPS: usize = 64;

        ui.horizontal(|ui| {
            if let Some((min, _)) = range {
                ui.label(RichText::new(format_compact(min)).size(11.0));
            }

            let (rect, _) = ui.allocate_exact_size(egui::vec2(240.0, 14.0), egui::Sense::hover());
            let step_width = rect.width() / STEPS as f32;
            for i in 0..STEPS {
                let x = rect.left() + i as f32 * step_width;
                let cell = egui::Rect::from_min_size(
                    egui::pos2(x, rect.top()),
                    egui::vec2(step_width + 0.5, rect.height()),
                );
                let t = i as f64 / (STEPS - 1) as f64;
                ui.painter().rect_filled(cell, 0.0, scale.sample(t));
            }
            ui.painter()
                .rect_stroke(rect, 0.0, egui::Stroke::new(1.0, Color32::BLACK));

            if let Some((_, max)) = range {
                ui.label(RichText::new(format_compact(max)).size(11.0));
            }
            ui.add_space(8.0);
            ui.label(RichText::new(label).size(11.0));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_handles_degenerate_ranges() {
        assert_eq!(ChartPlotter::normalize(5.0, Some((0.0, 10.0))), 0.5);
        assert_eq!(ChartPlotter::normalize(50.0, Some((0.0, 10.0))), 1.0);
        assert_eq!(ChartPlotter::normalize(-5.0, Some((0.0, 10.0))), 0.0);
        assert_eq!(ChartPlotter::normalize(3.0, Some((3.0, 3.0))), 0.5);
        assert_eq!(ChartPlotter::normalize(3.0, None), 0.5);
    }

    #[test]
    fn top_countries_sorted_and_skip_missing() {
        let frame = MapFrame {
            year: 2000,
            locations: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            values: vec![Some(1.0), None, Some(9.0), Some(4.0)],
        };
        let top = ChartPlotter::top_countries(&frame, 2);
        assert_eq!(top, vec![("C".to_string(), 9.0), ("D".to_string(), 4.0)]);
    }
}
