//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

pub enum BackendCommand {
    /// First fetch of the score history when the window opens.
    Mount,
    Reload,
    FileSelected { path: PathBuf },
    SubmitRequested,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mount => "mount",
            Self::Reload => "reload",
            Self::FileSelected { .. } => "file_selected",
            Self::SubmitRequested => "submit_requested",
        }
    }
}
