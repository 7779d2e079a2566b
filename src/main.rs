//! Global Trends Explorer - World Bank Indicator Dashboard
//!
//! Animated choropleth maps and line charts of population, GDP per capita
//! and net migration from 1960 to 2023.

mod charts;
mod config;
mod data;
mod gui;

use std::sync::Arc;

use config::AppConfig;
use data::{CachedSource, IndicatorSource, ResponseCache, WorldBankClient};
use eframe::egui;
use gui::GlobalTrendsApp;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::discover()?;
    let cache = config
        .cache
        .resolved_dir()
        .map(|dir| ResponseCache::new(dir, config.cache.ttl()));
    match &cache {
        Some(cache) => info!(dir = %cache.dir().display(), "response cache enabled"),
        None => info!("response cache disabled"),
    }

    let client = WorldBankClient::new(&config.source)?;
    let source: Arc<dyn IndicatorSource> = Arc::new(CachedSource::new(client, cache));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Global Trends Explorer"),
        ..Default::default()
    };

    eframe::run_native(
        "Global Trends Explorer",
        options,
        Box::new(move |cc| Ok(Box::new(GlobalTrendsApp::new(cc, source)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
