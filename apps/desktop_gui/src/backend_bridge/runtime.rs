//! Backend worker thread: owns the tokio runtime and the score tracker.

use std::{sync::Arc, thread, time::Duration};

use client_core::{ClientSettings, HttpGateway, ScoreTracker, SelectedFile, TrackerError};
use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::{UiError, UiErrorContext, UiEvent},
};

const FORWARD_RETRY: Duration = Duration::from_millis(50);

pub fn spawn_backend_thread(
    settings: ClientSettings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("failed to build backend runtime: {err}"),
                )));
                return;
            }
        };

        runtime.block_on(async move {
            let gateway = match HttpGateway::from_settings(&settings) {
                Ok(gateway) => gateway,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("{err:#}"),
                    )));
                    return;
                }
            };
            let tracker = ScoreTracker::over_http(gateway);
            forward_tracker_state(&tracker, ui_tx.clone());
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Using gateway {}",
                settings.gateway_url
            )));

            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "backend command received");
                match cmd {
                    BackendCommand::Mount | BackendCommand::Reload => {
                        let tracker = Arc::clone(&tracker);
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            if let Err(err) = tracker.reload().await {
                                report_workflow_error(&ui_tx, UiErrorContext::Refresh, &err);
                            }
                        });
                    }
                    BackendCommand::FileSelected { path } => {
                        let file = SelectedFile::from_path(path);
                        let filename = file.filename().to_string();
                        tracker.file_selected(file).await;
                        let _ = ui_tx.try_send(UiEvent::FileSelected { filename });
                    }
                    BackendCommand::SubmitRequested => {
                        let tracker = Arc::clone(&tracker);
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            match tracker.submit_requested().await {
                                Ok(outcome) => {
                                    let notice = match outcome.receipt.scores_found {
                                        Some(found) => {
                                            format!("Processed upload: {found} score(s) found")
                                        }
                                        None => "Processed upload".to_string(),
                                    };
                                    let _ = ui_tx.try_send(UiEvent::Info(notice));
                                }
                                Err(err) => {
                                    report_workflow_error(&ui_tx, UiErrorContext::Upload, &err)
                                }
                            }
                        });
                    }
                }
            }
        });
    });
}

/// Result of handing one snapshot to the UI queue without blocking.
#[derive(Debug, PartialEq, Eq)]
enum Offer {
    Sent,
    Deferred,
    Closed,
}

fn offer(ui_tx: &Sender<UiEvent>, event: UiEvent) -> Offer {
    match ui_tx.try_send(event) {
        Ok(()) => Offer::Sent,
        Err(TrySendError::Full(_)) => Offer::Deferred,
        Err(TrySendError::Disconnected(_)) => Offer::Closed,
    }
}

/// Pushes status and score snapshot changes to the UI queue until either the
/// tracker or the UI goes away. A full queue defers the push; the latest
/// snapshot is re-read on retry, so only stale intermediate states are lost.
fn forward_tracker_state(tracker: &ScoreTracker, ui_tx: Sender<UiEvent>) {
    let mut status_rx = tracker.subscribe_status();
    let mut scores_rx = tracker.subscribe_scores();
    status_rx.mark_changed();
    scores_rx.mark_changed();

    tokio::spawn(async move {
        let mut status_pending = false;
        let mut scores_pending = false;
        loop {
            tokio::select! {
                changed = status_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    status_pending = true;
                }
                changed = scores_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    scores_pending = true;
                }
                _ = tokio::time::sleep(FORWARD_RETRY), if status_pending || scores_pending => {}
            }

            if status_pending {
                let snapshot = status_rx.borrow_and_update().clone();
                match offer(&ui_tx, UiEvent::StatusChanged(snapshot)) {
                    Offer::Sent => status_pending = false,
                    Offer::Deferred => {}
                    Offer::Closed => break,
                }
            }
            if scores_pending {
                let snapshot = scores_rx.borrow_and_update().clone();
                match offer(&ui_tx, UiEvent::ScoresReplaced(snapshot)) {
                    Offer::Sent => scores_pending = false,
                    Offer::Deferred => {}
                    Offer::Closed => break,
                }
            }
        }
    });
}

/// The status line already carries the user-facing message for workflow
/// failures; only rejected submits need their own event.
fn report_workflow_error(ui_tx: &Sender<UiEvent>, context: UiErrorContext, err: &TrackerError) {
    tracing::debug!(error = %err, "workflow finished with error");
    if err.is_busy() {
        let _ = ui_tx.try_send(UiEvent::Error(UiError::from_tracker_error(context, err)));
    }
}
