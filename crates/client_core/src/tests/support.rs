//! Scripted backends shared by the workflow tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{ScoreId, ScoreRecord},
    protocol::UpdateScoreRequest,
};
use tokio::sync::{Mutex, Notify};

use crate::{
    transport::{ImageProcessor, ScoreQuery},
    types::{SelectedFile, UploadReceipt},
    ScoreTracker,
};

pub(crate) fn record(id: i64, scenario: &str, score: i64, processed_at: &str) -> ScoreRecord {
    ScoreRecord {
        id: ScoreId(id),
        scenario: scenario.to_string(),
        score,
        processed_at: processed_at.parse().expect("timestamp"),
    }
}

pub(crate) fn range_one() -> ScoreRecord {
    record(1, "Range 1", 87, "2024-01-01T10:00:00Z")
}

/// Holds a backend call open until the test releases it.
#[derive(Default)]
pub(crate) struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }

    pub(crate) async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub(crate) fn open(&self) {
        self.release.notify_one();
    }
}

pub(crate) type Journal = Arc<Mutex<Vec<&'static str>>>;

pub(crate) struct FakeProcessor {
    failure: Mutex<Option<String>>,
    gate: Mutex<Option<Arc<Gate>>>,
    journal: Journal,
    pub(crate) calls: AtomicUsize,
    pub(crate) filenames: Mutex<Vec<String>>,
}

impl FakeProcessor {
    fn new(journal: Journal) -> Self {
        Self {
            failure: Mutex::new(None),
            gate: Mutex::new(None),
            journal,
            calls: AtomicUsize::new(0),
            filenames: Mutex::new(Vec::new()),
        }
    }

    pub(crate) async fn fail_with(&self, err: impl Into<String>) {
        *self.failure.lock().await = Some(err.into());
    }

    pub(crate) async fn succeed(&self) {
        *self.failure.lock().await = None;
    }

    pub(crate) async fn gate_next_call(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.gate.lock().await = Some(Arc::clone(&gate));
        gate
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProcessor for FakeProcessor {
    async fn process_image(&self, file: &SelectedFile) -> Result<UploadReceipt> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().await.push("transmit");
        self.filenames.lock().await.push(file.filename().to_string());

        let gate = self.gate.lock().await.take();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        if let Some(err) = self.failure.lock().await.clone() {
            return Err(anyhow!(err));
        }
        Ok(UploadReceipt {
            scores_found: Some(1),
            message: Some("File processed successfully".to_string()),
        })
    }
}

pub(crate) struct FakeQuery {
    scores: Mutex<Vec<ScoreRecord>>,
    fetch_failure: Mutex<Option<String>>,
    update_failure: Mutex<Option<String>>,
    gate: Mutex<Option<Arc<Gate>>>,
    journal: Journal,
    in_flight: AtomicUsize,
    pub(crate) max_in_flight: AtomicUsize,
    pub(crate) fetch_calls: AtomicUsize,
    pub(crate) updates: Mutex<Vec<(ScoreId, UpdateScoreRequest)>>,
}

impl FakeQuery {
    fn new(initial: Vec<ScoreRecord>, journal: Journal) -> Self {
        Self {
            scores: Mutex::new(initial),
            fetch_failure: Mutex::new(None),
            update_failure: Mutex::new(None),
            gate: Mutex::new(None),
            journal,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub(crate) async fn set_scores(&self, scores: Vec<ScoreRecord>) {
        *self.scores.lock().await = scores;
    }

    pub(crate) async fn fail_fetches_with(&self, err: impl Into<String>) {
        *self.fetch_failure.lock().await = Some(err.into());
    }

    pub(crate) async fn heal_fetches(&self) {
        *self.fetch_failure.lock().await = None;
    }

    pub(crate) async fn fail_updates_with(&self, err: impl Into<String>) {
        *self.update_failure.lock().await = Some(err.into());
    }

    pub(crate) async fn gate_next_fetch(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.gate.lock().await = Some(Arc::clone(&gate));
        gate
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoreQuery for FakeQuery {
    async fn fetch_scores(&self) -> Result<Vec<ScoreRecord>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
        self.journal.lock().await.push("fetch");

        let gate = self.gate.lock().await.take();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        let result = match self.fetch_failure.lock().await.clone() {
            Some(err) => Err(anyhow!(err)),
            None => Ok(self.scores.lock().await.clone()),
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn update_score(&self, id: ScoreId, update: &UpdateScoreRequest) -> Result<()> {
        self.journal.lock().await.push("update");
        if let Some(err) = self.update_failure.lock().await.clone() {
            return Err(anyhow!(err));
        }
        self.updates.lock().await.push((id, update.clone()));

        let mut scores = self.scores.lock().await;
        if let Some(existing) = scores.iter_mut().find(|record| record.id == id) {
            existing.scenario = update.scenario.clone();
            existing.score = update.score;
        }
        Ok(())
    }
}

pub(crate) struct Backends {
    pub(crate) processor: Arc<FakeProcessor>,
    pub(crate) query: Arc<FakeQuery>,
    pub(crate) journal: Journal,
}

impl Backends {
    pub(crate) fn with_scores(initial: Vec<ScoreRecord>) -> Self {
        let journal: Journal = Arc::new(Mutex::new(Vec::new()));
        Self {
            processor: Arc::new(FakeProcessor::new(Arc::clone(&journal))),
            query: Arc::new(FakeQuery::new(initial, Arc::clone(&journal))),
            journal,
        }
    }

    pub(crate) fn tracker(&self) -> Arc<ScoreTracker> {
        ScoreTracker::new(self.processor.clone(), self.query.clone())
    }

    pub(crate) async fn journal(&self) -> Vec<&'static str> {
        self.journal.lock().await.clone()
    }
}
