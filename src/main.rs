// main.rs
mod app;
mod utils;

use app::App;
use eframe::NativeOptions;

fn main() {
    let native_options = NativeOptions {
        initial_window_size: Some(egui::Vec2::new(900.0, 650.0)),
        resizable: true,
        drag_and_drop_support: true,
        ..Default::default()
    };
    eframe::run_native(
        "AVIF to JPG Converter",
        native_options,
        Box::new(|_cc| Box::new(App::default())),
    );
}
