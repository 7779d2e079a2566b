//! Static Chart Renderer
//! Renders the line chart to PNG with plotters, using the same fixed styling
//! as the interactive figure: white background, black text, 18pt title.

use crate::charts::builder::LineChart;
use crate::charts::export::ExportError;
use crate::charts::options::{format_compact, hex_to_rgb, series_color};
use crate::data::{FIRST_YEAR, LAST_YEAR};
use plotters::prelude::{
    BitMapBackend, ChartBuilder as PlotBuilder, Color, IntoDrawingArea, IntoFont,
    LineSeries as PlotLineSeries, PathElement, RGBColor, BLACK, WHITE,
};
use std::io::Cursor;
use std::path::Path;
use tracing::info;

const FONT: &str = "sans-serif";

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the chart into in-memory PNG bytes.
    pub fn render_line_chart_to_bytes(
        chart: &LineChart,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ExportError> {
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        Self::draw_line_chart(chart, &mut buffer, width, height)?;

        let img = image::RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| ExportError::Render("pixel buffer size mismatch".to_string()))?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| ExportError::Render(e.to_string()))?;
        Ok(bytes)
    }

    pub fn save_line_chart_png(
        chart: &LineChart,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), ExportError> {
        let bytes = Self::render_line_chart_to_bytes(chart, width, height)?;
        std::fs::write(path, bytes).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = ?path, "wrote line chart image");
        Ok(())
    }

    fn draw_line_chart(
        chart: &LineChart,
        buffer: &mut [u8],
        width: u32,
        height: u32,
    ) -> Result<(), ExportError> {
        let render_err = |e: &dyn std::fmt::Display| ExportError::Render(e.to_string());

        let root = BitMapBackend::with_buffer(buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| render_err(&e))?;

        let (x_range, y_range) = Self::get_ranges(chart);
        let title_size = chart.style.title_size as f64;
        let font_size = chart.style.font_size as f64;

        let mut ctx = PlotBuilder::on(&root)
            .caption(&chart.title, (FONT, title_size).into_font().color(&BLACK))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
            .map_err(|e| render_err(&e))?;

        ctx.configure_mesh()
            .x_desc(chart.x_title)
            .y_desc(&chart.y_title)
            .x_label_formatter(&|x| format!("{:.0}", x))
            .y_label_formatter(&|y| format_compact(*y))
            .label_style((FONT, font_size).into_font().color(&BLACK))
            .axis_desc_style((FONT, font_size).into_font().color(&BLACK))
            .light_line_style(WHITE)
            .draw()
            .map_err(|e| render_err(&e))?;

        for (i, series) in chart.series.iter().enumerate() {
            let [r, g, b] = hex_to_rgb(series_color(i));
            let color = RGBColor(r, g, b);

            // Missing values break the line, as in the interactive chart.
            let mut labelled = false;
            for segment in segments(&series.years, &series.values) {
                let anno = ctx
                    .draw_series(PlotLineSeries::new(segment, color.stroke_width(2)))
                    .map_err(|e| render_err(&e))?;
                if !labelled {
                    anno.label(series.country.as_str()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
                    labelled = true;
                }
            }
        }

        if !chart.series.is_empty() {
            ctx.configure_series_labels()
                .background_style(WHITE)
                .border_style(BLACK)
                .label_font((FONT, font_size).into_font().color(&BLACK))
                .draw()
                .map_err(|e| render_err(&e))?;
        }

        root.present().map_err(|e| render_err(&e))?;
        Ok(())
    }

    fn get_ranges(chart: &LineChart) -> ((f64, f64), (f64, f64)) {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for series in &chart.series {
            for (year, value) in series.years.iter().zip(&series.values) {
                if let Some(v) = value {
                    x_min = x_min.min(*year as f64);
                    x_max = x_max.max(*year as f64);
                    y_min = y_min.min(*v);
                    y_max = y_max.max(*v);
                }
            }
        }

        if x_min.is_infinite() {
            return ((FIRST_YEAR as f64, LAST_YEAR as f64), (0.0, 1.0));
        }
        if x_min == x_max {
            x_min -= 1.0;
            x_max += 1.0;
        }
        let pad = if y_min == y_max {
            y_min.abs().max(1.0) * 0.1
        } else {
            (y_max - y_min) * 0.05
        };
        ((x_min, x_max), (y_min - pad, y_max + pad))
    }
}

/// Split a series into runs of consecutive present values.
fn segments(years: &[i32], values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (year, value) in years.iter().zip(values) {
        match value {
            Some(v) => current.push((*year as f64, *v)),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::builder::{LineSeries, CHART_STYLE, YEAR_AXIS_TITLE};
    use crate::data::Indicator;

    fn chart(series: Vec<LineSeries>) -> LineChart {
        LineChart {
            indicator: Indicator::TotalPopulation,
            value_column: "total_population",
            title: "Total Population Over Time".to_string(),
            x_title: YEAR_AXIS_TITLE,
            y_title: "Total Population".to_string(),
            series,
            style: CHART_STYLE,
        }
    }

    #[test]
    fn segments_break_on_missing_values() {
        let years = [2000, 2001, 2002, 2003, 2004];
        let values = [Some(1.0), None, Some(3.0), Some(4.0), None];
        assert_eq!(
            segments(&years, &values),
            vec![vec![(2000.0, 1.0)], vec![(2002.0, 3.0), (2003.0, 4.0)]]
        );
        assert!(segments(&[2000], &[None]).is_empty());
    }

    #[test]
    fn ranges_default_without_data() {
        let ((x0, x1), (y0, y1)) = StaticChartRenderer::get_ranges(&chart(Vec::new()));
        assert_eq!((x0, x1), (1960.0, 2023.0));
        assert_eq!((y0, y1), (0.0, 1.0));
    }

    #[test]
    fn ranges_pad_single_point() {
        let c = chart(vec![LineSeries {
            country: "Peru".into(),
            years: vec![2000],
            values: vec![Some(10.0)],
        }]);
        let ((x0, x1), (y0, y1)) = StaticChartRenderer::get_ranges(&c);
        assert_eq!((x0, x1), (1999.0, 2001.0));
        assert!(y0 < 10.0 && y1 > 10.0);
    }
}
