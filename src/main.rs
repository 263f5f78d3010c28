#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod config;
mod schedule;
mod timer;
mod ui;

use eframe::egui;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("shuukan starting");

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([420.0, 860.0])
        .with_min_inner_size([320.0, 560.0])
        .with_title("Shuukan");

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Shuukan",
        options,
        Box::new(|cc| Ok(Box::new(ui::ShuukanApp::new(cc)))),
    )
}
