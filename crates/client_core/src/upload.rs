use std::sync::Arc;

use shared::{domain::ScoreId, protocol::UpdateScoreRequest};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::{
    error::TrackerError,
    score_store::{ScoreSnapshot, ScoreStore},
    status::{StatusEvent, StatusReporter},
    transport::ImageProcessor,
    types::{SelectedFile, SubmitOutcome},
};

/// Owns the selected file and runs the single-flight upload workflow.
///
/// Only one operation that may write the score history (submit, reload,
/// amend) runs at a time; a second one started meanwhile is rejected with
/// [`TrackerError::OperationInProgress`] and leaves all state untouched.
pub struct UploadController {
    processor: Arc<dyn ImageProcessor>,
    store: Arc<ScoreStore>,
    status: Arc<StatusReporter>,
    selected: Mutex<Option<SelectedFile>>,
    flight: Mutex<()>,
}

impl UploadController {
    pub fn new(
        processor: Arc<dyn ImageProcessor>,
        store: Arc<ScoreStore>,
        status: Arc<StatusReporter>,
    ) -> Self {
        Self {
            processor,
            store,
            status,
            selected: Mutex::new(None),
            flight: Mutex::new(()),
        }
    }

    pub async fn file_selected(&self, file: SelectedFile) {
        info!(filename = file.filename(), "file selected");
        *self.selected.lock().await = Some(file);
    }

    pub async fn selected_file(&self) -> Option<SelectedFile> {
        self.selected.lock().await.clone()
    }

    /// Submits whatever file is currently selected. The selection is kept
    /// afterwards so the same file can be sent again.
    pub async fn submit_requested(&self) -> Result<SubmitOutcome, TrackerError> {
        let file = self.selected_file().await;
        self.submit(file.as_ref()).await
    }

    pub async fn submit(&self, file: Option<&SelectedFile>) -> Result<SubmitOutcome, TrackerError> {
        // Needs neither the network nor the store, so it is not gated by the
        // flight lock.
        let Some(file) = file else {
            self.status.apply(StatusEvent::NoFileSelected);
            return Err(TrackerError::NoFileSelected);
        };

        let _flight = self.begin_flight("submit")?;
        self.status.apply(StatusEvent::SubmitStarted);
        info!(
            filename = file.filename(),
            mime_type = file.mime_type().unwrap_or("unknown"),
            "submitting image for processing"
        );

        let receipt = match self.processor.process_image(file).await {
            Ok(receipt) => receipt,
            Err(source) => {
                warn!(filename = file.filename(), "image upload failed: {source:#}");
                self.status.apply(StatusEvent::TransmitFailed);
                return Err(TrackerError::Transmit { source });
            }
        };
        self.status.apply(StatusEvent::TransmitSucceeded);
        info!(
            scores_found = ?receipt.scores_found,
            "image accepted; refreshing score history"
        );

        match self.store.refresh().await {
            Ok(scores) => {
                self.status.apply(StatusEvent::RefreshSucceeded);
                Ok(SubmitOutcome { receipt, scores })
            }
            Err(err) => {
                self.status.apply(StatusEvent::RefreshFailed);
                Err(err)
            }
        }
    }

    /// Reloads the score history outside of a submit, e.g. on mount.
    pub async fn refresh_history(&self) -> Result<ScoreSnapshot, TrackerError> {
        let _flight = self.begin_flight("refresh")?;
        match self.store.refresh().await {
            Ok(scores) => Ok(scores),
            Err(err) => {
                self.status.apply(StatusEvent::HistoryRefreshFailed);
                Err(err)
            }
        }
    }

    /// Updates one record on the backend, then reloads the whole history.
    pub async fn amend_score(
        &self,
        id: ScoreId,
        scenario: impl Into<String>,
        score: i64,
    ) -> Result<ScoreSnapshot, TrackerError> {
        let _flight = self.begin_flight("amend")?;
        self.status.apply(StatusEvent::AmendStarted);

        let update = UpdateScoreRequest {
            scenario: scenario.into(),
            score,
        };
        info!(id = id.0, scenario = %update.scenario, score, "amending score");
        if let Err(err) = self.store.push_update(id, &update).await {
            warn!(id = id.0, "score update failed: {err}");
            self.status.apply(StatusEvent::AmendFailed);
            return Err(err);
        }

        match self.store.refresh().await {
            Ok(scores) => Ok(scores),
            Err(err) => {
                self.status.apply(StatusEvent::HistoryRefreshFailed);
                Err(err)
            }
        }
    }

    fn begin_flight(&self, operation: &'static str) -> Result<MutexGuard<'_, ()>, TrackerError> {
        self.flight.try_lock().map_err(|_| {
            info!(operation, "rejecting operation while another is in flight");
            TrackerError::OperationInProgress
        })
    }
}

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod tests;
