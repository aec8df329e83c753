//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{FlowError, QaController, SelectedFile};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    controller: Arc<QaController>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let forwarder = tokio::spawn(forward_controller_events(
                controller.subscribe_events(),
                ui_tx.clone(),
            ));
            let _ = ui_tx.try_send(UiEvent::Info("Ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "backend command received");
                match cmd {
                    BackendCommand::SelectFile { path } => {
                        match SelectedFile::from_path(&path).await {
                            Ok(file) => {
                                controller.select_file(file).await;
                            }
                            Err(err) => {
                                tracing::warn!(path = %path.display(), "file selection failed: {err:#}");
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                    UiErrorContext::SelectFile,
                                    format!("{err:#}"),
                                )));
                            }
                        }
                    }
                    BackendCommand::ClearSelection => {
                        controller.clear_selection().await;
                    }
                    BackendCommand::SetQuery { text } => {
                        controller.set_query(text).await;
                    }
                    BackendCommand::SubmitUpload => {
                        let controller = Arc::clone(&controller);
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            if let Err(err) = controller.submit_upload().await {
                                report_rejection(&ui_tx, &err);
                            }
                        });
                    }
                    BackendCommand::SubmitAsk => {
                        let controller = Arc::clone(&controller);
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            if let Err(err) = controller.submit_ask().await {
                                report_rejection(&ui_tx, &err);
                            }
                        });
                    }
                }
            }

            tracing::info!("ui command channel closed; backend worker stopping");
            forwarder.abort();
        });
    });
}

async fn forward_controller_events(
    mut events: tokio::sync::broadcast::Receiver<client_core::ControllerEvent>,
    ui_tx: Sender<UiEvent>,
) {
    loop {
        match events.recv().await {
            Ok(event) => match ui_tx.try_send(UiEvent::from(event)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!("ui event queue full; dropping controller event");
                }
                Err(TrySendError::Disconnected(_)) => break,
            },
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "controller event stream lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

// The missing-file case already arrives as a notice from the controller.
fn report_rejection(ui_tx: &Sender<UiEvent>, err: &FlowError) {
    if let FlowError::Busy(_) = err {
        let _ = ui_tx.try_send(UiEvent::Info(err.to_string()));
    }
}
