mod app;
mod binder;
mod color;
mod config;
mod data;
mod regions;
mod selection;
mod ui;
mod views;

#[cfg(test)]
mod testutil;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use eframe::egui;

use app::TourismApp;
use binder::Dashboard;
use config::Config;

fn main() -> Result<()> {
    let config = Config::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let path = config
        .data
        .clone()
        .or_else(ui::panels::pick_dataset_file)
        .context("no dataset selected")?;

    let dataset = data::loader::load_file(&path).inspect_err(|e| log::error!("{e:#}"))?;
    let selection = config.initial_selection(&dataset);
    log::info!(
        "Starting with {} / {} / {} in {}",
        selection.mode,
        selection.purpose,
        selection.year,
        selection.region
    );
    let dashboard = Dashboard::new(dataset, selection, config.marker_scale)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "London Tourism",
        options,
        Box::new(|_cc| Ok(Box::new(TourismApp::new(dashboard)))),
    )
    .map_err(|e| anyhow!("running the dashboard window: {e}"))
}
