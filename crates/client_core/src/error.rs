use thiserror::Error;

/// Failure taxonomy of the upload/refresh workflow.
///
/// Every variant is also reflected on the status reporter as a user-facing
/// message; callers receive the typed error for logging and tests.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("another upload or refresh is already in progress")]
    OperationInProgress,
    #[error("image upload failed: {source}")]
    Transmit { source: anyhow::Error },
    #[error("score fetch failed: {source}")]
    Fetch { source: anyhow::Error },
    #[error("score update failed: {source}")]
    Amend { source: anyhow::Error },
}

impl TrackerError {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::OperationInProgress)
    }
}
