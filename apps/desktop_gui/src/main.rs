mod backend_bridge;
mod controller;
mod ui;

use anyhow::{anyhow, Context};
use clap::Parser;
use client_core::{config::parse_service_url, load_settings, QaController};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{QaApp, APP_TITLE};

#[derive(Parser, Debug)]
#[command(name = "paper-qa-gui", about = "Desktop front-end for the paper Q&A service")]
struct Args {
    /// Overrides the configured service base address.
    #[arg(long)]
    service_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(url) = &args.service_url {
        settings.service_url = parse_service_url(url)?;
    }
    let controller =
        QaController::from_settings(&settings).context("failed to build http client")?;

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(controller, cmd_rx, ui_tx);

    let service_url = settings.service_url.to_string();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([760.0, 560.0])
            .with_min_inner_size([520.0, 420.0]),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(QaApp::new(cmd_tx, ui_rx, service_url)))),
    )
    .map_err(|err| anyhow!("desktop ui exited with error: {err}"))
}
