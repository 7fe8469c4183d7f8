//! Application entry point for the liquid blob viewer.
//!
//! This binary sets up logging and eframe/egui, then hands the engine and
//! all drawing over to [`Viewer`].

mod viewer;

use blob_core::config::EngineConfig;
use viewer::Viewer;

/// Starts the native eframe application.
///
/// An optional first argument names a TOML file with engine settings. A
/// missing or malformed file is logged and the defaults are used.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(&path).unwrap_or_else(|err| {
            tracing::warn!(%err, "using default engine config");
            EngineConfig::default()
        }),
        None => EngineConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 720.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Liquid Blob",
        options,
        Box::new(|cc| Ok(Box::new(Viewer::new(cc.egui_ctx.clone(), config)))),
    )
}
