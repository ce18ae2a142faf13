mod app;
mod config;
mod error;
mod session;
mod upload;
mod utils;

use anyhow::{anyhow, Context};
use app::BlinkyApp;
use clap::Parser;
use config::Config;
use eframe::CreationContext;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use upload::HttpAnimationService;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let base_url = config.base_url()?;
    tracing::info!(server = %base_url, "starting");
    let service = Arc::new(HttpAnimationService::new(base_url));
    let server_label = service.base_url().to_string();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([640.0, 720.0])
            .with_min_inner_size([420.0, 520.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let startup_error: Arc<std::sync::Mutex<Option<std::io::Error>>> = Arc::default();
    let startup_slot = startup_error.clone();

    let outcome = eframe::run_native(
        "Blinky Animation Maker",
        options,
        Box::new(move |cc: &CreationContext| -> Box<dyn eframe::App> {
            match BlinkyApp::new(cc, service, server_label) {
                Ok(app) => Box::new(app),
                Err(e) => {
                    tracing::error!(error = %e, "could not start session worker");
                    if let Ok(mut slot) = startup_slot.lock() {
                        *slot = Some(e);
                    }
                    cc.egui_ctx.send_viewport_cmd(eframe::egui::ViewportCommand::Close);
                    Box::new(StartupFailed)
                }
            }
        }),
    );

    if let Some(e) = startup_error.lock().ok().and_then(|mut slot| slot.take()) {
        return Err(e).context("failed to spawn session worker");
    }
    outcome.map_err(|e| anyhow!("window error: {e}"))
}

/// Placeholder app shown for the single frame before the window closes.
struct StartupFailed;

impl eframe::App for StartupFailed {
    fn update(&mut self, _ctx: &eframe::egui::Context, _frame: &mut eframe::Frame) {}
}
