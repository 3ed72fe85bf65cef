mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{load_settings, ClientSettings};
use crossbeam_channel::bounded;
use eframe::egui;

use crate::{
    backend_bridge::{commands::BackendCommand, runtime::spawn_backend_thread},
    controller::events::{UiError, UiErrorContext, UiEvent},
    ui::ScoreTrackerApp,
};

#[derive(Parser, Debug)]
#[command(name = "score-tracker-gui", about = "Desktop score tracker")]
struct Args {
    /// Overrides the gateway URL from settings and environment.
    #[arg(long)]
    gateway_url: Option<String>,
}

fn resolve_settings(args: &Args) -> anyhow::Result<ClientSettings> {
    let settings = load_settings()?;
    match &args.gateway_url {
        Some(raw) => settings.with_gateway_url(raw),
        None => Ok(settings),
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);

    match resolve_settings(&args) {
        Ok(settings) => spawn_backend_thread(settings, cmd_rx, ui_tx),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "failed to load settings");
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("invalid settings: {err:#}"),
            )));
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Score Tracker")
            .with_inner_size([720.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Score Tracker",
        options,
        Box::new(move |_cc| Ok(Box::new(ScoreTrackerApp::new(cmd_tx, ui_rx)))),
    )
}
