//! Charts module - chart construction, figure export and rendering

mod builder;
mod export;
mod options;
mod plotly;
mod plotter;
mod renderer;

pub use builder::{ChartBuilder, ChoroplethChart, LineChart, MapFrame, CHART_STYLE};
pub use export::{open_in_browser, write_page, ExportError};
pub use options::{ColorScale, Projection};
pub use plotly::Figure;
pub use plotter::ChartPlotter;
pub use renderer::StaticChartRenderer;
