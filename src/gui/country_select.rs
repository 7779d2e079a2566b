//! Country Multi-select Widget
//! Searchable checkbox list over the countries present in the table.

use egui::{RichText, ScrollArea};

#[derive(Default)]
pub struct CountrySelector {
    available: Vec<String>,
    /// Selection in the order the user picked.
    selected: Vec<String>,
    filter: String,
}

impl CountrySelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the choices; selections that are no longer available are dropped.
    pub fn set_available(&mut self, countries: Vec<String>) {
        self.available = countries;
        let available = &self.available;
        self.selected.retain(|c| available.contains(c));
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, country: &str) -> bool {
        self.selected.iter().any(|c| c == country)
    }

    pub fn toggle(&mut self, country: &str) {
        if let Some(pos) = self.selected.iter().position(|c| c == country) {
            self.selected.remove(pos);
        } else if self.available.iter().any(|c| c == country) {
            self.selected.push(country.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Available countries containing the filter text, case-insensitively.
    pub fn matching(&self) -> Vec<&str> {
        let needle = self.filter.trim().to_lowercase();
        self.available
            .iter()
            .filter(|c| needle.is_empty() || c.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    /// Draw the selector. Returns true when the selection changed.
    pub fn show(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;

        ui.horizontal(|ui| {
            ui.label("Select Countries");
            ui.add(
                egui::TextEdit::singleline(&mut self.filter)
                    .hint_text("Search...")
                    .desired_width(200.0),
            );
            if ui.small_button("Clear").clicked() && !self.selected.is_empty() {
                self.clear();
                changed = true;
            }
        });

        // Chips for the current selection; clicking one removes it.
        if !self.selected.is_empty() {
            let mut removed: Option<String> = None;
            ui.horizontal_wrapped(|ui| {
                for country in &self.selected {
                    if ui
                        .small_button(RichText::new(format!("{} ✕", country)))
                        .clicked()
                    {
                        removed = Some(country.clone());
                    }
                }
            });
            if let Some(country) = removed {
                self.toggle(&country);
                changed = true;
            }
        }

        let mut toggled: Option<String> = None;
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("country_list")
                    .max_height(160.0)
                    .show(ui, |ui| {
                        for country in self.matching() {
                            let mut checked = self.is_selected(country);
                            if ui.checkbox(&mut checked, country).changed() {
                                toggled = Some(country.to_string());
                            }
                        }
                    });
            });
        if let Some(country) = toggled {
            self.toggle(&country);
            changed = true;
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> CountrySelector {
        let mut s = CountrySelector::new();
        s.set_available(vec!["Chad".into(), "Chile".into(), "Peru".into()]);
        s
    }

    #[test]
    fn toggle_keeps_pick_order() {
        let mut s = selector();
        s.toggle("Peru");
        s.toggle("Chad");
        assert_eq!(s.selected(), ["Peru", "Chad"]);
        s.toggle("Peru");
        assert_eq!(s.selected(), ["Chad"]);
    }

    #[test]
    fn unknown_country_is_ignored() {
        let mut s = selector();
        s.toggle("Atlantis");
        assert!(s.selected().is_empty());
    }

    #[test]
    fn filter_is_case_insensitive() {
        let mut s = selector();
        s.filter = "CH".into();
        assert_eq!(s.matching(), vec!["Chad", "Chile"]);
        s.filter.clear();
        assert_eq!(s.matching().len(), 3);
    }

    #[test]
    fn shrinking_choices_drops_stale_selection() {
        let mut s = selector();
        s.toggle("Chile");
        s.toggle("Peru");
        s.set_available(vec!["Peru".into()]);
        assert_eq!(s.selected(), ["Peru"]);
    }
}
