use std::fmt;

use tokio::sync::watch;
use tracing::{debug, warn};

pub const NO_FILE_MESSAGE: &str = "Please select a file first.";
pub const UPLOAD_FAILED_MESSAGE: &str = "An error occurred during upload.";
pub const REFRESH_AFTER_UPLOAD_FAILED_MESSAGE: &str =
    "Upload succeeded, but the score history could not be refreshed.";
pub const FETCH_FAILED_MESSAGE: &str = "Could not fetch scores.";
pub const AMEND_FAILED_MESSAGE: &str = "Could not update score.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Ready,
    Uploading,
    Refreshing,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Uploading => "Uploading and processing...",
            Self::Refreshing => "Upload successful! Refreshing scores...",
        }
    }

    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inputs driving the status machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    SubmitStarted,
    NoFileSelected,
    TransmitSucceeded,
    TransmitFailed,
    RefreshSucceeded,
    RefreshFailed,
    /// A reload outside of a submit (mount, manual, post-amend) failed.
    HistoryRefreshFailed,
    AmendStarted,
    AmendFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub status: Status,
    pub error: Option<String>,
}

impl StatusSnapshot {
    fn with(status: Status, error: Option<&str>) -> Self {
        Self {
            status,
            error: error.map(str::to_string),
        }
    }

    /// Next snapshot for `event`, or `None` when the event is not valid in
    /// the current state.
    pub fn next(&self, event: StatusEvent) -> Option<Self> {
        use Status::*;
        use StatusEvent::*;

        let next = match (self.status, event) {
            (Ready, SubmitStarted) => Self::with(Uploading, None),
            (Ready, NoFileSelected) => Self::with(Ready, Some(NO_FILE_MESSAGE)),
            (Uploading, TransmitSucceeded) => Self::with(Refreshing, None),
            (Uploading, TransmitFailed) => Self::with(Ready, Some(UPLOAD_FAILED_MESSAGE)),
            (Refreshing, RefreshSucceeded) => Self::with(Ready, None),
            (Refreshing, RefreshFailed) => {
                Self::with(Ready, Some(REFRESH_AFTER_UPLOAD_FAILED_MESSAGE))
            }
            (Ready, HistoryRefreshFailed) => Self::with(Ready, Some(FETCH_FAILED_MESSAGE)),
            (Ready, AmendStarted) => Self::with(Ready, None),
            (Ready, AmendFailed) => Self::with(Ready, Some(AMEND_FAILED_MESSAGE)),
            _ => return None,
        };
        Some(next)
    }
}

/// Sole writer of the status string and error message.
pub struct StatusReporter {
    state: watch::Sender<StatusSnapshot>,
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter {
    pub fn new() -> Self {
        let (state, _) = watch::channel(StatusSnapshot::default());
        Self { state }
    }

    /// Applies `event`; returns whether a transition happened.
    pub fn apply(&self, event: StatusEvent) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|current| match current.next(event) {
            Some(next) => {
                debug!(from = %current.status, to = %next.status, ?event, "status transition");
                applied = true;
                let changed = *current != next;
                *current = next;
                changed
            }
            None => {
                warn!(status = %current.status, ?event, "ignoring status event invalid in current state");
                false
            }
        });
        applied
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> Status {
        self.state.borrow().status
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.state.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/status_tests.rs"]
mod tests;
