use std::path::PathBuf;

use eframe::egui;

use galleria::gui::GalleryApp;

fn main() -> Result<(), eframe::Error> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    // galleria-gui [MANIFEST] [QUERY]
    // QUERY is an optional deep-link query string, e.g. "?slide=black-widow".
    let manifest = std::env::args().nth(1).map(PathBuf::from);
    let query = std::env::args().nth(2);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Galleria",
        options,
        Box::new(move |_cc| Ok(Box::new(GalleryApp::new(manifest, query)))),
    )
}
