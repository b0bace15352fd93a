// src/bin/gui.rs
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]
use urnik_scrape::{config::{consts::LOG_FILE, state::GuiState}, gui, log};
use eframe::egui::ViewportBuilder;

fn main() {
    log::init(LOG_FILE);

    let size = GuiState::default();
    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title("Urnik ŠC Kranj")
            .with_inner_size([size.window_w as f32, size.window_h as f32])
            .with_min_inner_size([800.0, 480.0]),
        ..Default::default()
    };

    if let Err(e) = gui::run(options) {
        eprintln!("GUI failed: {}", e);
        std::process::exit(1);
    }
}
