//! Chart Viewer Widget
//! Central panel: the map section with its year animation, then the line
//! chart section with the country selector.

use crate::charts::{ChartPlotter, ChoroplethChart, LineChart};
use crate::gui::CountrySelector;
use egui::{Color32, RichText, ScrollArea};
use std::time::Duration;

const SECTION_SPACING: f32 = 20.0;
const MAP_HEIGHT: f32 = 420.0;
const LINE_HEIGHT: f32 = 380.0;
/// Delay between animation frames.
const FRAME_INTERVAL: f64 = 0.5;

/// Actions triggered from the central panel
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerAction {
    None,
    SelectionChanged,
    OpenMap,
}

#[derive(Default)]
pub struct ChartViewer {
    pub map: Option<ChoroplethChart>,
    pub line: Option<LineChart>,
    frame_index: usize,
    playing: bool,
    last_step: f64,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the map, staying on the current year or the next one present.
    pub fn set_map(&mut self, chart: ChoroplethChart) {
        let current_year = self
            .map
            .as_ref()
            .and_then(|m| m.frames.get(self.frame_index))
            .map(|f| f.year);
        self.frame_index = current_year
            .and_then(|year| chart.frame_at_or_after(year))
            .unwrap_or(0);
        self.map = Some(chart);
    }

    pub fn set_line(&mut self, chart: LineChart) {
        self.line = Some(chart);
    }

    /// Drop the map after a failed rebuild so a stale one is never shown.
    pub fn clear_map(&mut self) {
        self.map = None;
        self.frame_index = 0;
        self.playing = false;
    }

    pub fn clear_line(&mut self) {
        self.line = None;
    }

    /// Advance to the next frame, stopping at the last one.
    fn step(&mut self) {
        let Some(map) = &self.map else {
            self.playing = false;
            return;
        };
        if self.frame_index + 1 < map.frames.len() {
            self.frame_index += 1;
        } else {
            self.playing = false;
        }
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        ui: &mut egui::Ui,
        countries: &mut CountrySelector,
    ) -> ViewerAction {
        let mut action = ViewerAction::None;

        if self.playing {
            let now = ctx.input(|i| i.time);
            if now - self.last_step >= FRAME_INTERVAL {
                self.last_step = now;
                self.step();
            }
            ctx.request_repaint_after(Duration::from_secs_f64(FRAME_INTERVAL));
        }

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new("Global Trends Explorer").size(26.0).strong());
                ui.label(
                    "Dynamic choropleth maps and line charts based on World Bank data. \
                     Use the side panel to choose the map type, projection, and color scale.",
                );
                ui.separator();
                ui.add_space(SECTION_SPACING);

                if self.draw_map_section(ctx, ui) {
                    action = ViewerAction::OpenMap;
                }

                ui.add_space(SECTION_SPACING);
                ui.separator();
                ui.add_space(SECTION_SPACING);

                ui.label(RichText::new("Line Chart Analysis").size(18.0).strong());
                ui.label(
                    "Select one or more countries to view the trend over time for the selected indicator.",
                );
                ui.add_space(8.0);
                if countries.show(ui) {
                    action = ViewerAction::SelectionChanged;
                }
                ui.add_space(8.0);
                self.draw_line_section(ui);
            });

        action
    }

    /// Returns true when the user asked for the interactive map.
    fn draw_map_section(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) -> bool {
        let Some(map) = &self.map else {
            ui.label(RichText::new("No Data").size(20.0));
            return false;
        };
        let frame_count = map.frames.len();
        let mut open_requested = false;

        ui.horizontal(|ui| {
            ui.label(RichText::new(map.title).size(18.0).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🌐 Open Interactive Map").clicked() {
                    open_requested = true;
                }
                ui.label(
                    RichText::new(format!("projection: {}", map.projection.as_str()))
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            });
        });

        if frame_count == 0 {
            return open_requested;
        }
        self.frame_index = self.frame_index.min(frame_count - 1);

        let years = map.years();
        let first_year = years[0];
        let last_year = years[frame_count - 1];
        let mut playing = self.playing;
        let mut index = self.frame_index;

        ui.horizontal(|ui| {
            let label = if playing { "⏸" } else { "▶" };
            if ui.button(label).clicked() {
                playing = !playing;
                if playing && index + 1 >= frame_count {
                    index = 0;
                }
            }
            let year = map.frames[index].year;
            let mut slider_year = year;
            ui.add(
                egui::Slider::new(&mut slider_year, first_year..=last_year)
                    .text("Year")
                    .step_by(1.0),
            );
            if slider_year != year {
                if let Some(pos) = map.frame_at_or_after(slider_year) {
                    index = pos;
                }
                playing = false;
            }
        });

        if let Some(frame) = map.frames.get(index) {
            ui.label(
                RichText::new(format!("Year = {}", frame.year))
                    .size(12.0)
                    .color(Color32::GRAY),
            );
            ChartPlotter::draw_map_frame(ui, map, frame, MAP_HEIGHT);
        }

        if playing && !self.playing {
            self.last_step = ctx.input(|i| i.time);
        }
        self.playing = playing;
        self.frame_index = index;

        open_requested
    }

    fn draw_line_section(&self, ui: &mut egui::Ui) {
        let Some(line) = &self.line else {
            return;
        };
        ui.label(RichText::new(&line.title).size(18.0).strong());
        if line.is_empty() {
            ui.label(
                RichText::new("No countries selected")
                    .size(12.0)
                    .color(Color32::GRAY),
            );
        }
        ChartPlotter::draw_line_chart(ui, line, LINE_HEIGHT);
    }
}
