//! HTML Export Module
//! Writes figures as standalone pages rendered by plotly.js in a browser.

use crate::charts::plotly::Figure;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize figure: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to render chart: {0}")]
    Render(String),
    #[error("Failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Standalone HTML document for one figure, sized to the window.
pub fn render_page(title: &str, figure: &Figure) -> Result<String, ExportError> {
    // A literal "</" inside the inline script would end it early.
    let json = figure.to_json()?.replace("</", "<\\/");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{cdn}" charset="utf-8"></script>
<style>
html, body {{ margin: 0; height: 100%; background: white; }}
#chart {{ width: 100%; height: 100vh; }}
</style>
</head>
<body>
<div id="chart"></div>
<script>
const figure = {json};
Plotly.newPlot("chart", figure.data, figure.layout, {{ responsive: true }}).then(function (gd) {{
  if (figure.frames) {{ Plotly.addFrames(gd, figure.frames); }}
}});
</script>
</body>
</html>
"#,
        title = escape_html(title),
        cdn = PLOTLY_CDN,
        json = json,
    ))
}

pub fn write_page(path: &Path, title: &str, figure: &Figure) -> Result<(), ExportError> {
    let page = render_page(title, figure)?;
    fs::write(path, page).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = ?path, "wrote chart page");
    Ok(())
}

/// Write the page to the temp directory and hand it to the system browser.
pub fn open_in_browser(title: &str, figure: &Figure) -> Result<PathBuf, ExportError> {
    let path = std::env::temp_dir().join(format!("global-trends-{}.html", slug(title)));
    write_page(&path, title, figure)?;
    open::that(&path).map_err(|source| ExportError::Open {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn slug(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::builder::{LineChart, LineSeries, CHART_STYLE, YEAR_AXIS_TITLE};
    use crate::data::Indicator;

    fn figure(country: &str) -> Figure {
        Figure::from_line(&LineChart {
            indicator: Indicator::Gdp,
            value_column: "gdp_per_capita",
            title: "GDP Over Time".to_string(),
            x_title: YEAR_AXIS_TITLE,
            y_title: "Gdp Per Capita".to_string(),
            series: vec![LineSeries {
                country: country.to_string(),
                years: vec![2000],
                values: vec![Some(1.0)],
            }],
            style: CHART_STYLE,
        })
    }

    #[test]
    fn page_embeds_figure_and_plotly() {
        let page = render_page("GDP Over Time", &figure("Peru")).unwrap();
        assert!(page.contains(PLOTLY_CDN));
        assert!(page.contains("<title>GDP Over Time</title>"));
        assert!(page.contains(r#""name":"Peru""#));
        assert!(page.contains("responsive: true"));
    }

    #[test]
    fn script_terminators_are_escaped() {
        let page = render_page("x < y", &figure("</script>")).unwrap();
        assert!(!page.contains(r#""</script>""#));
        assert!(page.contains("<title>x &lt; y</title>"));
    }

    #[test]
    fn write_page_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("line.html");
        write_page(&path, "GDP Over Time", &figure("Peru")).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn slug_is_file_safe() {
        assert_eq!(slug("GDP from 1960 to 2023"), "gdp-from-1960-to-2023");
    }
}
