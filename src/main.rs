use eframe::egui;

use constella::app::WeaverApp;

fn main() {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([480.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Constella — Weave Your Constellation",
        options,
        Box::new(|_cc| Ok(Box::new(WeaverApp::default()))),
    )
    .expect("Failed to start Constella");
}
