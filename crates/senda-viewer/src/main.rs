#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use senda_viewer::SendaViewerApp;

fn main() {
    // The enrichment pipeline spawns onto this runtime from the UI loop
    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to start async runtime: {err}");
            std::process::exit(1);
        }
    };

    rt.block_on(async {
        tracing_subscriber::fmt::init();

        let native_options = eframe::NativeOptions {
            viewport: eframe::egui::ViewportBuilder::default()
                .with_inner_size([1280.0, 720.0])
                .with_title("Senda Viewer"),
            ..Default::default()
        };

        let _ = eframe::run_native(
            "Senda Viewer",
            native_options,
            Box::new(|cc| Ok(Box::new(SendaViewerApp::new(cc)))),
        );
    });
}
