use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use shared::{domain::ScoreRecord, protocol::UploadResponse};

const FALLBACK_FILENAME: &str = "upload";

#[derive(Debug, Clone)]
enum FileSource {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

/// Handle to the single file a user picked for upload.
///
/// Path-backed handles are read lazily when a transmit starts, so a file that
/// disappears after selection surfaces as a transmit failure.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    filename: String,
    mime_type: Option<String>,
    source: FileSource,
}

impl SelectedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_FILENAME.to_string());
        Self {
            mime_type: guess_mime_type(&filename),
            filename,
            source: FileSource::Path(path),
        }
    }

    pub fn from_bytes(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let filename = filename.into();
        Self {
            mime_type: guess_mime_type(&filename),
            filename,
            source: FileSource::Memory(Arc::from(bytes.into())),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Path(path) => Some(path),
            FileSource::Memory(_) => None,
        }
    }

    pub async fn read(&self) -> Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read selected file '{}'", path.display())),
            FileSource::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }
}

fn guess_mime_type(filename: &str) -> Option<String> {
    mime_guess::from_path(filename)
        .first_raw()
        .map(str::to_string)
}

/// What the image-processing backend reported about an accepted upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReceipt {
    pub scores_found: Option<usize>,
    pub message: Option<String>,
}

impl UploadReceipt {
    /// The backend owes no body contract; anything that fails to parse is an
    /// empty receipt rather than an error.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str::<UploadResponse>(body)
            .map(|response| Self {
                scores_found: response.scores_found,
                message: response.message,
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub receipt: UploadReceipt,
    pub scores: Arc<Vec<ScoreRecord>>,
}
