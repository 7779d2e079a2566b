//! Chart Builder Module
//! Turns the observation table and the current map options into chart
//! descriptions. Every build is a pure function of its inputs.

use crate::charts::options::{ColorScale, Projection};
use crate::data::{Indicator, IndicatorRecord, LoaderError, ObservationTable};
use rayon::prelude::*;
use std::collections::HashMap;

/// Styling shared by both charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    pub background: &'static str,
    pub text: &'static str,
    pub title_size: f32,
    pub font_size: f32,
}

pub const CHART_STYLE: ChartStyle = ChartStyle {
    background: "white",
    text: "black",
    title_size: 18.0,
    font_size: 12.0,
};

/// Horizontal axis title of the line chart.
pub const YEAR_AXIS_TITLE: &str = "Year";

/// One animation frame of the choropleth.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFrame {
    pub year: i32,
    pub locations: Vec<String>,
    pub values: Vec<Option<f64>>,
}

/// Animated choropleth keyed by country, one frame per year.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethChart {
    pub indicator: Indicator,
    pub projection: Projection,
    pub color_scale: ColorScale,
    pub value_column: &'static str,
    pub title: &'static str,
    pub legend_label: &'static str,
    /// Shared color range so every frame uses the same scale.
    pub value_range: Option<(f64, f64)>,
    pub frames: Vec<MapFrame>,
    pub style: ChartStyle,
}

impl ChoroplethChart {
    /// Index of the first frame at or after `year`.
    pub fn frame_at_or_after(&self, year: i32) -> Option<usize> {
        self.frames.iter().position(|f| f.year >= year)
    }

    pub fn years(&self) -> Vec<i32> {
        self.frames.iter().map(|f| f.year).collect()
    }
}

/// One country's trace on the line chart.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub country: String,
    pub years: Vec<i32>,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub indicator: Indicator,
    pub value_column: &'static str,
    pub title: String,
    pub x_title: &'static str,
    pub y_title: String,
    pub series: Vec<LineSeries>,
    pub style: ChartStyle,
}

impl LineChart {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Builds chart descriptions from the observation table.
pub struct ChartBuilder;

impl ChartBuilder {
    pub fn build_map(
        table: &ObservationTable,
        indicator: Indicator,
        projection: Projection,
        color_scale: ColorScale,
    ) -> Result<ChoroplethChart, LoaderError> {
        let records = table.records(indicator)?;

        // Table is sorted by year, so each year's rows are contiguous.
        let groups: Vec<&[IndicatorRecord]> = records.chunk_by(|a, b| a.year == b.year).collect();
        let frames: Vec<MapFrame> = groups
            .par_iter()
            .map(|rows| MapFrame {
                year: rows[0].year,
                locations: rows.iter().map(|r| r.country.clone()).collect(),
                values: rows.iter().map(|r| r.value).collect(),
            })
            .collect();

        Ok(ChoroplethChart {
            indicator,
            projection,
            color_scale,
            value_column: indicator.field(),
            title: indicator.map_title(),
            legend_label: indicator.legend_label(),
            value_range: table.value_range(indicator),
            frames,
            style: CHART_STYLE,
        })
    }

    /// Line chart for the selected countries. An empty selection yields a
    /// chart with no series.
    pub fn build_line(
        table: &ObservationTable,
        indicator: Indicator,
        selected: &[String],
    ) -> Result<LineChart, LoaderError> {
        let records = if selected.is_empty() {
            Vec::new()
        } else {
            table.records_for(indicator, selected)?
        };

        let mut series: Vec<LineSeries> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in records {
            let slot = *index.entry(record.country.clone()).or_insert_with(|| {
                series.push(LineSeries {
                    country: record.country.clone(),
                    years: Vec::new(),
                    values: Vec::new(),
                });
                series.len() - 1
            });
            series[slot].years.push(record.year);
            series[slot].values.push(record.value);
        }

        Ok(LineChart {
            indicator,
            value_column: indicator.field(),
            title: format!("{} Over Time", indicator.display_name()),
            x_title: YEAR_AXIS_TITLE,
            y_title: axis_title(indicator.field()),
            series,
            style: CHART_STYLE,
        })
    }
}

/// Field name as an axis title: underscores to spaces, words capitalized.
pub fn axis_title(field: &str) -> String {
    title_case(&field.replace('_', " "))
}

/// Capitalize the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
