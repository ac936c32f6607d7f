mod api;
mod app;
mod backend;
mod confirm;
mod controller;
mod event;
mod resources;
mod session;
mod theme;
mod ui;

use api::ApiClient;
use app::OpsDeskApp;
use backend::BackendProcess;
use eframe::egui;
use log::warn;
use std::path::PathBuf;
use std::sync::mpsc;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let base_url =
        std::env::var("OPSDESK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

    let backend = match std::env::var_os("OPSDESK_BACKEND_BIN") {
        Some(bin) => {
            let path = PathBuf::from(bin);
            match BackendProcess::launch(&path) {
                Ok(process) => process,
                Err(err) => {
                    warn!("failed to launch backend {}: {err}", path.display());
                    BackendProcess::unmanaged()
                }
            }
        }
        None => BackendProcess::unmanaged(),
    };

    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("opsdesk-runtime")
        .build()?;

    let (initial_session, session_warning) = session::store::load();
    if let Some(session_warning) = session_warning {
        warn!("{session_warning}");
    }

    let api = ApiClient::new(
        base_url,
        tx.clone(),
        runtime.handle().clone(),
        initial_session.clone(),
    );
    let app = OpsDeskApp::new(rx, api, backend, initial_session);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1024.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "OpsDesk",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(app))),
    )?;

    Ok(())
}
