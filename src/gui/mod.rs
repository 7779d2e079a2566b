//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;
mod country_select;

pub use app::GlobalTrendsApp;
pub use chart_viewer::{ChartViewer, ViewerAction};
pub use control_panel::{ControlPanel, ControlPanelAction, UserSettings};
pub use country_select::CountrySelector;
