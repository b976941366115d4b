//! Application entry point: MusicGen Desk.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Create the event channel and the empty model slot.
//! 5. Spawn the model lifecycle worker.
//! 6. Build the translator, WAV sink, generation worker and dispatcher.
//! 7. Run [`eframe::run_native`], which blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use eframe::egui;
use musicgen_desk::{
    app::MusicApp,
    audio::WavSink,
    config::AppConfig,
    model::{CommandModelLoader, ModelSlot},
    pipeline::{event_channel, Dispatcher, GenerationWorker, ModelLifecycleWorker},
    translate,
};

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let vp = egui::ViewportBuilder::default()
        .with_title("MusicGen Desk")
        .with_inner_size([width, height])
        .with_min_inner_size([320.0, 240.0]);

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("MusicGen Desk starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (model load and generation each take one worker)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Channel + model slot
    let (event_tx, event_rx) = event_channel();
    let slot = ModelSlot::new();

    // 5. Model load starts immediately; the splash screen covers it.
    let loader = Arc::new(CommandModelLoader::from_config(&config.model));
    let _load = ModelLifecycleWorker::new(loader, slot.clone(), &config.model)
        .spawn(rt.handle(), event_tx.clone());

    // 6. Generation wiring
    let worker = GenerationWorker::new(
        translate::from_config(&config.translation),
        slot,
        Arc::new(WavSink),
        &config.translation,
    );
    let dispatcher = Dispatcher::new(event_rx, event_tx, worker, rt.handle().clone(), &config.ui);

    // 7. UI (blocks until the window is closed)
    let options = native_options(&config);
    let result = eframe::run_native(
        "MusicGen Desk",
        options,
        Box::new(move |cc| Ok(Box::new(MusicApp::new(cc, dispatcher, &config)))),
    );

    rt.shutdown_background();
    result
}
