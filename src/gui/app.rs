//! Global Trends Main Application
//! Main window with control panel and chart viewer.

use crate::charts::{
    open_in_browser, write_page, ChartBuilder, ExportError, Figure, StaticChartRenderer,
};
use crate::data::{Indicator, IndicatorSource, ObservationTable, TableCache};
use crate::gui::{
    ChartViewer, ControlPanel, ControlPanelAction, CountrySelector, UserSettings, ViewerAction,
};
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

const PNG_WIDTH: u32 = 1400;
const PNG_HEIGHT: u32 = 800;

/// Table loading result from background thread
enum LoadResult {
    Complete(Arc<ObservationTable>),
    Error(String),
}

/// Main application window.
pub struct GlobalTrendsApp {
    source: Arc<dyn IndicatorSource>,
    cache: Arc<TableCache>,
    table: Option<Arc<ObservationTable>>,

    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    countries: CountrySelector,

    // Inputs the current charts were built from
    built_map: Option<UserSettings>,
    built_line: Option<(Indicator, Vec<String>)>,

    // Async table loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl GlobalTrendsApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        source: Arc<dyn IndicatorSource>,
    ) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let mut app = Self {
            source,
            cache: Arc::new(TableCache::new()),
            table: None,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            countries: CountrySelector::new(),
            built_map: None,
            built_line: None,
            load_rx: None,
            is_loading: false,
        };
        app.start_loading();
        app
    }

    /// Prepare the observation table in a background thread
    fn start_loading(&mut self) {
        if self.is_loading {
            return;
        }

        self.control_panel.load_failed = false;
        self.control_panel.set_status("Loading World Bank data...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let cache = Arc::clone(&self.cache);
        let source = Arc::clone(&self.source);

        thread::spawn(move || {
            let result = match cache.get_or_load(source.as_ref()) {
                Ok(table) => LoadResult::Complete(table),
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete(table)) => {
                let countries = table.countries();
                let years = table.years();
                self.control_panel.set_status(&format!(
                    "Loaded {} rows, {} countries, {} years",
                    table.height(),
                    countries.len(),
                    years.len()
                ));
                self.countries.set_available(countries);
                self.table = Some(table);
                self.is_loading = false;
            }
            Ok(LoadResult::Error(e)) => {
                error!("failed to load indicator data: {}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
                self.control_panel.load_failed = true;
                self.is_loading = false;
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => {
                self.load_rx = Some(rx);
            }
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.control_panel
                    .set_status("Error: loader thread stopped unexpectedly");
                self.control_panel.load_failed = true;
                self.is_loading = false;
            }
        }
    }

    /// Rebuild whichever chart has stale inputs.
    fn refresh_charts(&mut self) {
        let Some(table) = self.table.clone() else {
            return;
        };
        let settings = self.control_panel.settings;

        if self.built_map != Some(settings) {
            match ChartBuilder::build_map(
                &table,
                settings.indicator,
                settings.projection,
                settings.color_scale,
            ) {
                Ok(chart) => {
                    info!(
                        indicator = settings.indicator.field(),
                        frames = chart.frames.len(),
                        "built map"
                    );
                    self.chart_viewer.set_map(chart);
                }
                Err(e) => {
                    error!("failed to build map: {}", e);
                    self.chart_viewer.clear_map();
                    self.control_panel.set_status(&format!("Error: {}", e));
                }
            }
            self.built_map = Some(settings);
        }

        let line_inputs = (settings.indicator, self.countries.selected().to_vec());
        if self.built_line.as_ref() != Some(&line_inputs) {
            match ChartBuilder::build_line(&table, line_inputs.0, &line_inputs.1) {
                Ok(chart) => self.chart_viewer.set_line(chart),
                Err(e) => {
                    error!("failed to build line chart: {}", e);
                    self.chart_viewer.clear_line();
                    self.control_panel.set_status(&format!("Error: {}", e));
                }
            }
            self.built_line = Some(line_inputs);
        }

        self.control_panel.charts_ready =
            self.chart_viewer.map.is_some() && self.chart_viewer.line.is_some();
    }

    fn handle_open_map(&mut self) {
        let Some(map) = &self.chart_viewer.map else {
            return;
        };
        let result = open_in_browser(map.title, &Figure::from_map(map));
        self.report_export("Opened interactive map", result.map(|_| ()));
    }

    fn handle_export(&mut self, action: ControlPanelAction) {
        let (default_name, extension) = match action {
            ControlPanelAction::ExportMapHtml => ("global_trends_map.html", "html"),
            ControlPanelAction::ExportLineHtml => ("global_trends_line.html", "html"),
            ControlPanelAction::ExportLinePng => ("global_trends_line.png", "png"),
            _ => return,
        };

        let Some(path) = Self::ask_save_path(default_name, extension) else {
            return; // User cancelled
        };

        let result = match action {
            ControlPanelAction::ExportMapHtml => match &self.chart_viewer.map {
                Some(map) => write_page(&path, map.title, &Figure::from_map(map)),
                None => return,
            },
            ControlPanelAction::ExportLineHtml => match &self.chart_viewer.line {
                Some(line) => write_page(&path, &line.title, &Figure::from_line(line)),
                None => return,
            },
            ControlPanelAction::ExportLinePng => match &self.chart_viewer.line {
                Some(line) => {
                    StaticChartRenderer::save_line_chart_png(line, &path, PNG_WIDTH, PNG_HEIGHT)
                }
                None => return,
            },
            _ => return,
        };

        self.report_export(&format!("Saved {}", path.display()), result);
    }

    fn ask_save_path(default_name: &str, extension: &str) -> Option<PathBuf> {
        let filter = if extension == "png" { "PNG Image" } else { "HTML Page" };
        rfd::FileDialog::new()
            .add_filter(filter, &[extension])
            .set_file_name(default_name)
            .save_file()
    }

    fn report_export(&mut self, success: &str, result: Result<(), ExportError>) {
        match result {
            Ok(()) => self.control_panel.set_status(success),
            Err(e) => {
                error!("export failed: {}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for GlobalTrendsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::OpenMap => self.handle_open_map(),
                        ControlPanelAction::Retry => self.start_loading(),
                        ControlPanelAction::None => {}
                        export => self.handle_export(export),
                    }
                });
            });

        self.refresh_charts();

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.is_loading {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
                return;
            }

            match self.chart_viewer.show(ctx, ui, &mut self.countries) {
                ViewerAction::OpenMap => self.handle_open_map(),
                ViewerAction::SelectionChanged => self.refresh_charts(),
                ViewerAction::None => {}
            }
        });
    }
}
