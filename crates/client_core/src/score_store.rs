use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use anyhow::anyhow;
use shared::{
    domain::{ScoreId, ScoreRecord},
    protocol::UpdateScoreRequest,
};
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::{error::TrackerError, transport::ScoreQuery};

pub type ScoreSnapshot = Arc<Vec<ScoreRecord>>;

/// Client-side copy of the score history.
///
/// The collection is only ever replaced as a whole by `refresh`; readers
/// always observe a complete snapshot.
pub struct ScoreStore {
    query: Arc<dyn ScoreQuery>,
    records: watch::Sender<ScoreSnapshot>,
    writer: Mutex<()>,
    replacements: AtomicU64,
}

impl ScoreStore {
    pub fn new(query: Arc<dyn ScoreQuery>) -> Self {
        let (records, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            query,
            records,
            writer: Mutex::new(()),
            replacements: AtomicU64::new(0),
        }
    }

    /// Fetches the full history and swaps it in. On failure the previous
    /// snapshot stays in place.
    pub async fn refresh(&self) -> Result<ScoreSnapshot, TrackerError> {
        let _writer = self.writer.lock().await;

        let records = self.query.fetch_scores().await.map_err(|source| {
            warn!("score history fetch failed: {source:#}");
            TrackerError::Fetch { source }
        })?;

        if let Some(duplicate) = first_duplicate_id(&records) {
            warn!(id = duplicate.0, "score history contains duplicate ids");
            return Err(TrackerError::Fetch {
                source: anyhow!("backend returned duplicate score id {}", duplicate.0),
            });
        }

        let snapshot: ScoreSnapshot = Arc::new(records);
        self.records.send_replace(Arc::clone(&snapshot));
        self.replacements.fetch_add(1, Ordering::SeqCst);
        info!(count = snapshot.len(), "score history replaced");
        Ok(snapshot)
    }

    /// Sends an update for one record to the backend. The local collection is
    /// left alone; callers refresh afterwards.
    pub async fn push_update(
        &self,
        id: ScoreId,
        update: &UpdateScoreRequest,
    ) -> Result<(), TrackerError> {
        if update.scenario.trim().is_empty() {
            return Err(TrackerError::Amend {
                source: anyhow!("scenario must not be empty"),
            });
        }
        self.query
            .update_score(id, update)
            .await
            .map_err(|source| TrackerError::Amend { source })
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        self.records.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScoreSnapshot> {
        self.records.subscribe()
    }

    /// Number of successful wholesale replacements so far.
    pub fn replacements(&self) -> u64 {
        self.replacements.load(Ordering::SeqCst)
    }
}

fn first_duplicate_id(records: &[ScoreRecord]) -> Option<ScoreId> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .map(|record| record.id)
        .find(|id| !seen.insert(*id))
}

#[cfg(test)]
#[path = "tests/score_store_tests.rs"]
mod tests;
