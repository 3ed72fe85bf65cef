use std::sync::Arc;

use shared::domain::ScoreId;
use tokio::sync::watch;
use tracing::info;

pub mod config;
pub mod error;
pub mod score_store;
pub mod status;
pub mod transport;
pub mod types;
pub mod upload;
pub mod view;

pub use config::{load_settings, ClientSettings};
pub use error::TrackerError;
pub use score_store::{ScoreSnapshot, ScoreStore};
pub use status::{Status, StatusEvent, StatusReporter, StatusSnapshot};
pub use transport::{HttpGateway, ImageProcessor, ScoreQuery};
pub use types::{SelectedFile, SubmitOutcome, UploadReceipt};
pub use upload::UploadController;

/// Wires the store, status reporter and upload controller together and is
/// the surface view binders talk to.
///
/// Inbound intents are `file_selected` and `submit_requested`; outbound
/// observables are the score snapshot and the status snapshot, each readable
/// directly or through a subscription.
pub struct ScoreTracker {
    store: Arc<ScoreStore>,
    status: Arc<StatusReporter>,
    uploads: UploadController,
}

impl ScoreTracker {
    pub fn new(processor: Arc<dyn ImageProcessor>, query: Arc<dyn ScoreQuery>) -> Arc<Self> {
        let store = Arc::new(ScoreStore::new(query));
        let status = Arc::new(StatusReporter::new());
        let uploads = UploadController::new(processor, Arc::clone(&store), Arc::clone(&status));
        Arc::new(Self {
            store,
            status,
            uploads,
        })
    }

    pub fn over_http(gateway: HttpGateway) -> Arc<Self> {
        info!(gateway = gateway.base_url(), "score tracker using http gateway");
        let gateway = Arc::new(gateway);
        Self::new(gateway.clone(), gateway)
    }

    /// Initial fetch performed when a view first shows the history.
    pub async fn mount(&self) -> Result<ScoreSnapshot, TrackerError> {
        self.uploads.refresh_history().await
    }

    pub async fn reload(&self) -> Result<ScoreSnapshot, TrackerError> {
        self.uploads.refresh_history().await
    }

    pub async fn file_selected(&self, file: SelectedFile) {
        self.uploads.file_selected(file).await;
    }

    pub async fn selected_file(&self) -> Option<SelectedFile> {
        self.uploads.selected_file().await
    }

    pub async fn submit_requested(&self) -> Result<SubmitOutcome, TrackerError> {
        self.uploads.submit_requested().await
    }

    pub async fn amend_score(
        &self,
        id: ScoreId,
        scenario: impl Into<String>,
        score: i64,
    ) -> Result<ScoreSnapshot, TrackerError> {
        self.uploads.amend_score(id, scenario, score).await
    }

    pub fn scores(&self) -> ScoreSnapshot {
        self.store.snapshot()
    }

    pub fn status(&self) -> StatusSnapshot {
        self.status.snapshot()
    }

    pub fn subscribe_scores(&self) -> watch::Receiver<ScoreSnapshot> {
        self.store.subscribe()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<StatusSnapshot> {
        self.status.subscribe()
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &ScoreStore {
        &self.store
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
