//! Plotly Figure Module
//! Serializes chart descriptions into plotly.js figure JSON
//! (`{"data": [...], "layout": {...}, "frames": [...]}`).

use crate::charts::builder::{ChartStyle, ChoroplethChart, LineChart, MapFrame};
use crate::charts::options::series_color;
use serde::Serialize;
use serde_json::{json, Value};

const LOCATION_MODE: &str = "country names";
const COLOR_AXIS: &str = "coloraxis";
const PLAY_FRAME_MS: u32 = 500;

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<Frame>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Choropleth(ChoroplethTrace),
    Scatter(ScatterTrace),
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethTrace {
    pub name: String,
    pub locations: Vec<String>,
    pub z: Vec<Option<f64>>,
    pub locationmode: &'static str,
    pub coloraxis: &'static str,
    pub hovertext: Vec<String>,
    pub hovertemplate: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterTrace {
    pub name: String,
    pub legendgroup: String,
    pub x: Vec<i32>,
    pub y: Vec<Option<f64>>,
    pub mode: &'static str,
    pub line: LineStyle,
    pub hovertemplate: String,
    pub showlegend: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub name: String,
    pub data: Vec<Trace>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Font {
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
}

impl Font {
    fn colored(style: &ChartStyle) -> Self {
        Self {
            color: style.text,
            size: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
    pub font: Font,
}

#[derive(Debug, Clone, Serialize)]
pub struct Legend {
    pub title: Title,
    pub font: Font,
    pub tracegroupgap: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Geo {
    pub projection: GeoProjection,
    pub showframe: bool,
    pub showcoastlines: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeoProjection {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorAxis {
    pub colorscale: Vec<(f64, &'static str)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmax: Option<f64>,
    pub colorbar: ColorBar,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorBar {
    pub title: Title,
    pub tickfont: Font,
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub title: Title,
    pub tickfont: Font,
}

#[derive(Debug, Clone, Serialize)]
pub struct Slider {
    pub active: usize,
    pub currentvalue: Value,
    pub len: f32,
    pub pad: Value,
    pub x: f32,
    pub xanchor: &'static str,
    pub y: f32,
    pub yanchor: &'static str,
    pub steps: Vec<SliderStep>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SliderStep {
    pub args: Value,
    pub label: String,
    pub method: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateMenu {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub buttons: Vec<MenuButton>,
    pub direction: &'static str,
    pub pad: Value,
    pub showactive: bool,
    pub x: f32,
    pub xanchor: &'static str,
    pub y: f32,
    pub yanchor: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuButton {
    pub args: Value,
    pub label: &'static str,
    pub method: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
    pub font: Font,
    pub plot_bgcolor: &'static str,
    pub paper_bgcolor: &'static str,
    pub autosize: bool,
    pub legend: Legend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coloraxis: Option<ColorAxis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sliders: Vec<Slider>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub updatemenus: Vec<UpdateMenu>,
}

impl Layout {
    /// Fixed styling shared by every figure.
    fn styled(style: &ChartStyle, title: &str, legend_title: &str) -> Self {
        Self {
            title: Title {
                text: title.to_string(),
                font: Font {
                    color: style.text,
                    size: Some(style.title_size),
                },
            },
            font: Font {
                color: style.text,
                size: Some(style.font_size),
            },
            plot_bgcolor: style.background,
            paper_bgcolor: style.background,
            autosize: true,
            legend: Legend {
                title: Title {
                    text: legend_title.to_string(),
                    font: Font::colored(style),
                },
                font: Font::colored(style),
                tracegroupgap: 0,
            },
            geo: None,
            coloraxis: None,
            xaxis: None,
            yaxis: None,
            sliders: Vec::new(),
            updatemenus: Vec::new(),
        }
    }
}

impl Figure {
    /// Animated choropleth: first year in `data`, every year in `frames`.
    pub fn from_map(chart: &ChoroplethChart) -> Self {
        let frames: Vec<Frame> = chart
            .frames
            .iter()
            .map(|frame| Frame {
                name: frame.year.to_string(),
                data: vec![Trace::Choropleth(choropleth_trace(chart, frame))],
            })
            .collect();

        let data = frames
            .first()
            .map(|f| f.data.clone())
            .unwrap_or_default();

        let mut layout = Layout::styled(&chart.style, chart.title, "");
        layout.geo = Some(Geo {
            projection: GeoProjection {
                kind: chart.projection.as_str(),
            },
            showframe: false,
            showcoastlines: true,
        });
        layout.coloraxis = Some(ColorAxis {
            colorscale: chart.color_scale.positioned_stops(),
            cmin: chart.value_range.map(|r| r.0),
            cmax: chart.value_range.map(|r| r.1),
            colorbar: ColorBar {
                title: Title {
                    text: chart.legend_label.to_string(),
                    font: Font::colored(&chart.style),
                },
                tickfont: Font::colored(&chart.style),
            },
        });
        if !frames.is_empty() {
            layout.sliders = vec![year_slider(&frames)];
            layout.updatemenus = vec![play_buttons()];
        }

        Self {
            data,
            layout,
            frames,
        }
    }

    /// Multi-series line chart, one trace per country.
    pub fn from_line(chart: &LineChart) -> Self {
        let data = chart
            .series
            .iter()
            .enumerate()
            .map(|(i, series)| {
                Trace::Scatter(ScatterTrace {
                    name: series.country.clone(),
                    legendgroup: series.country.clone(),
                    x: series.years.clone(),
                    y: series.values.clone(),
                    mode: "lines",
                    line: LineStyle {
                        color: series_color(i),
                    },
                    hovertemplate: format!(
                        "Country={}<br>{}=%{{x}}<br>{}=%{{y}}<extra></extra>",
                        series.country, chart.x_title, chart.value_column
                    ),
                    showlegend: true,
                })
            })
            .collect();

        let mut layout = Layout::styled(&chart.style, &chart.title, "Country");
        layout.xaxis = Some(axis(&chart.style, chart.x_title));
        layout.yaxis = Some(axis(&chart.style, &chart.y_title));

        Self {
            data,
            layout,
            frames: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn choropleth_trace(chart: &ChoroplethChart, frame: &MapFrame) -> ChoroplethTrace {
    ChoroplethTrace {
        name: String::new(),
        locations: frame.locations.clone(),
        z: frame.values.clone(),
        locationmode: LOCATION_MODE,
        coloraxis: COLOR_AXIS,
        hovertext: frame.locations.clone(),
        hovertemplate: format!(
            "<b>%{{hovertext}}</b><br><br>Year={}<br>Country=%{{location}}<br>{}=%{{z}}<extra></extra>",
            frame.year, chart.legend_label
        ),
    }
}

fn axis(style: &ChartStyle, title: &str) -> Axis {
    Axis {
        title: Title {
            text: title.to_string(),
            font: Font::colored(style),
        },
        tickfont: Font::colored(style),
    }
}

fn animate_args(frame: Value, duration: u32) -> Value {
    json!([
        frame,
        {
            "frame": {"duration": duration, "redraw": true},
            "mode": "immediate",
            "fromcurrent": true,
            "transition": {"duration": duration, "easing": "linear"}
        }
    ])
}

fn year_slider(frames: &[Frame]) -> Slider {
    Slider {
        active: 0,
        currentvalue: json!({"prefix": "Year="}),
        len: 0.9,
        pad: json!({"b": 10, "t": 60}),
        x: 0.1,
        xanchor: "left",
        y: 0.0,
        yanchor: "top",
        steps: frames
            .iter()
            .map(|f| SliderStep {
                args: animate_args(json!([f.name]), 0),
                label: f.name.clone(),
                method: "animate",
            })
            .collect(),
    }
}

fn play_buttons() -> UpdateMenu {
    UpdateMenu {
        kind: "buttons",
        buttons: vec![
            MenuButton {
                args: animate_args(Value::Null, PLAY_FRAME_MS),
                label: "&#9654;",
                method: "animate",
            },
            MenuButton {
                args: animate_args(json!([null]), 0),
                label: "&#9724;",
                method: "animate",
            },
        ],
        direction: "left",
        pad: json!({"r": 10, "t": 70}),
        showactive: false,
        x: 0.1,
        xanchor: "right",
        y: 0.0,
        yanchor: "top",
    }
}
