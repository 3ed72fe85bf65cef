use super::*;
use crate::{
    status::NO_FILE_MESSAGE,
    test_support::{range_one, record, Backends},
};
use std::sync::atomic::Ordering;

#[tokio::test]
async fn mount_loads_backend_history() {
    let backends = Backends::with_scores(vec![range_one()]);
    let tracker = backends.tracker();

    let scores = tracker.mount().await.expect("mount");

    assert_eq!(scores.len(), 1);
    let only = &tracker.scores()[0];
    assert_eq!(only.id, ScoreId(1));
    assert_eq!(only.scenario, "Range 1");
    assert_eq!(only.score, 87);
    assert_eq!(only.processed_at.to_rfc3339(), "2024-01-01T10:00:00+00:00");
    assert_eq!(tracker.status(), StatusSnapshot::default());
}

#[tokio::test]
async fn upload_grows_history_and_keeps_first_record() {
    let backends = Backends::with_scores(vec![range_one()]);
    let tracker = backends.tracker();
    tracker.mount().await.expect("mount");

    let second = record(2, "Range 2", 93, "2024-01-01T11:00:00Z");
    backends
        .query
        .set_scores(vec![range_one(), second.clone()])
        .await;
    tracker
        .file_selected(SelectedFile::from_bytes("range2.jpg", vec![0xff, 0xd8, 0xff]))
        .await;
    tracker.submit_requested().await.expect("submit");

    let scores = tracker.scores();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0], range_one());
    assert_eq!(scores[1], second);
    assert_eq!(tracker.status().status, Status::Ready);
    assert_eq!(tracker.status().error, None);
}

#[tokio::test]
async fn submit_without_selection_makes_no_network_calls() {
    let backends = Backends::with_scores(vec![range_one()]);
    let tracker = backends.tracker();
    let mut status_rx = tracker.subscribe_status();

    let err = tracker.submit_requested().await.expect_err("no file");

    assert!(matches!(err, TrackerError::NoFileSelected));
    assert!(backends.journal().await.is_empty());
    assert!(tracker.scores().is_empty());

    status_rx.changed().await.expect("error published");
    let observed = status_rx.borrow_and_update().clone();
    assert_eq!(observed.status, Status::Ready);
    assert_eq!(observed.error.as_deref(), Some(NO_FILE_MESSAGE));
}

#[tokio::test]
async fn reload_twice_yields_same_collection() {
    let backends = Backends::with_scores(vec![
        record(3, "VT Angleshot VALORANT", 677, "2024-01-03T10:00:00Z"),
        range_one(),
    ]);
    let tracker = backends.tracker();

    let first = tracker.reload().await.expect("first reload");
    let second = tracker.reload().await.expect("second reload");

    assert_eq!(first, second);
    assert_eq!(tracker.scores().len(), 2);
    assert_eq!(tracker.store().replacements(), 2);
}

#[tokio::test]
async fn concurrent_submit_never_interleaves_store_writes() {
    let backends = Backends::with_scores(vec![range_one()]);
    let tracker = backends.tracker();
    tracker.mount().await.expect("mount");
    tracker
        .file_selected(SelectedFile::from_bytes("a.png", vec![1]))
        .await;

    let gate = backends.processor.gate_next_call().await;
    let mut scores_rx = tracker.subscribe_scores();
    let replacements_before = tracker.store().replacements();

    let first = tokio::spawn({
        let tracker = Arc::clone(&tracker);
        async move { tracker.submit_requested().await }
    });
    gate.wait_entered().await;

    let status_during = tracker.status();
    let rejected = tracker.submit_requested().await.expect_err("busy");
    assert!(rejected.is_busy());
    assert_eq!(tracker.status(), status_during);
    assert!(!scores_rx.has_changed().expect("store alive"));

    gate.open();
    first.await.expect("join").expect("first submit");

    assert_eq!(tracker.store().replacements(), replacements_before + 1);
    assert_eq!(backends.processor.call_count(), 1);
    assert_eq!(backends.query.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(backends.journal().await, vec!["fetch", "transmit", "fetch"]);
}

#[tokio::test]
async fn mount_failure_keeps_empty_history_and_reports() {
    let backends = Backends::with_scores(vec![range_one()]);
    backends.query.fail_fetches_with("connection refused").await;
    let tracker = backends.tracker();

    tracker.mount().await.expect_err("mount fails");

    assert!(tracker.scores().is_empty());
    assert_eq!(tracker.status().status, Status::Ready);
    assert_eq!(
        tracker.status().error.as_deref(),
        Some(status::FETCH_FAILED_MESSAGE)
    );
}

#[tokio::test]
async fn amend_round_trips_through_backend() {
    let backends = Backends::with_scores(vec![range_one()]);
    let tracker = backends.tracker();
    tracker.mount().await.expect("mount");

    tracker
        .amend_score(ScoreId(1), "Range 1", 90)
        .await
        .expect("amend");

    assert_eq!(tracker.scores()[0].score, 90);
    let updates = backends.query.updates.lock().await.clone();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, ScoreId(1));
}

#[tokio::test]
async fn submit_without_selection_during_mount_reports_missing_file() {
    let backends = Backends::with_scores(vec![range_one()]);
    let tracker = backends.tracker();
    let gate = backends.query.gate_next_fetch().await;

    let mount = tokio::spawn({
        let tracker = Arc::clone(&tracker);
        async move { tracker.mount().await }
    });
    gate.wait_entered().await;

    let err = tracker.submit_requested().await.expect_err("no file");
    assert!(matches!(err, TrackerError::NoFileSelected));
    assert_eq!(tracker.status().status, Status::Ready);
    assert_eq!(tracker.status().error.as_deref(), Some(NO_FILE_MESSAGE));
    assert_eq!(backends.processor.call_count(), 0);

    gate.open();
    mount.await.expect("join").expect("mount");
    assert_eq!(*tracker.scores(), vec![range_one()]);
    assert_eq!(backends.journal().await, vec!["fetch"]);
}
