//! Control Panel Widget
//! Left side panel with map options, exports and load status.

use crate::charts::{ColorScale, Projection};
use crate::data::Indicator;
use egui::{Color32, ComboBox, RichText};

/// Map options chosen by the user.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct UserSettings {
    pub indicator: Indicator,
    pub projection: Projection,
    pub color_scale: ColorScale,
}

/// Left side control panel.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub status: String,
    pub charts_ready: bool,
    pub load_failed: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            status: "Ready".to_string(),
            charts_ready: false,
            load_failed: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🌍 Global Trends")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("World Bank Indicators")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);

        egui::CollapsingHeader::new("About this App").show(ui, |ui| {
            ui.label(
                "Visualizes global economic and demographic trends (1960–2023) \
                 with an animated choropleth map and line charts based on World Bank data.",
            );
        });

        ui.add_space(5.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Map Options =====
        ui.label(RichText::new("🗺 Map Options").size(14.0).strong());
        ui.add_space(5.0);

        ui.label(RichText::new("Select Map to Display").strong());
        for indicator in Indicator::DISPLAY_ORDER {
            ui.radio_value(
                &mut self.settings.indicator,
                indicator,
                indicator.display_name(),
            );
        }

        ui.add_space(8.0);

        let label_width = 110.0;
        let combo_width = 150.0;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Projection:"));
            ComboBox::from_id_salt("projection")
                .width(combo_width)
                .selected_text(self.settings.projection.as_str())
                .show_ui(ui, |ui| {
                    for projection in Projection::ALL {
                        ui.selectable_value(
                            &mut self.settings.projection,
                            projection,
                            projection.as_str(),
                        );
                    }
                });
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Color Scale:"));
            ComboBox::from_id_salt("color_scale")
                .width(combo_width)
                .selected_text(self.settings.color_scale.name())
                .show_ui(ui, |ui| {
                    for scale in ColorScale::ALL {
                        ui.selectable_value(&mut self.settings.color_scale, scale, scale.name());
                    }
                });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Buttons =====
        ui.label(RichText::new("📄 Export").size(14.0).strong());
        ui.add_space(5.0);

        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.charts_ready, |ui| {
                let size = egui::vec2(200.0, 28.0);
                if ui
                    .add(egui::Button::new("🌐 Open Interactive Map").min_size(size))
                    .clicked()
                {
                    action = ControlPanelAction::OpenMap;
                }
                if ui
                    .add(egui::Button::new("Save Map HTML").min_size(size))
                    .clicked()
                {
                    action = ControlPanelAction::ExportMapHtml;
                }
                if ui
                    .add(egui::Button::new("Save Line Chart HTML").min_size(size))
                    .clicked()
                {
                    action = ControlPanelAction::ExportLineHtml;
                }
                if ui
                    .add(egui::Button::new("Save Line Chart PNG").min_size(size))
                    .clicked()
                {
                    action = ControlPanelAction::ExportLinePng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.charts_ready {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        if self.load_failed {
            ui.add_space(5.0);
            if ui.button("↻ Retry").clicked() {
                action = ControlPanelAction::Retry;
            }
        }

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    OpenMap,
    ExportMapHtml,
    ExportLineHtml,
    ExportLinePng,
    Retry,
}
