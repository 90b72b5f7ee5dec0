mod common;

use std::sync::Arc;
use std::time::Duration;

use bookpicks::enrichment::{
    self, EnrichmentMessage, EnrichmentQueue, KeywordWorker, OutboxRelay, QueueError, WorkerError,
};
use bookpicks::generator::{LocalGenerator, TextGenerator};
use bookpicks::service::{BookService, ServiceConfig, ServiceError};
use bookpicks::storage::{keywords, outbox, Database};
use common::{create_book, FailingGenerator, FixedGenerator, FixedLookup};
use uuid::Uuid;

fn keyword_generator() -> Arc<dyn TextGenerator> {
    Arc::new(FixedGenerator {
        topics: vec!["science".to_string()],
        keywords: vec!["orbit".to_string(), "gravity".to_string()],
    })
}

fn service_with_channel(
    db: &Database,
    capacity: usize,
) -> (
    Arc<BookService>,
    tokio::sync::mpsc::Receiver<EnrichmentMessage>,
) {
    let (queue, receiver) = enrichment::channel(capacity);
    let service = Arc::new(BookService::new(
        db.clone(),
        Arc::new(queue),
        keyword_generator(),
        Arc::new(FixedLookup(Some(""))),
        ServiceConfig::default(),
    ));
    (service, receiver)
}

fn test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    (dir, db)
}

/// Poll `condition` until it holds, failing after five seconds
async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn stored_keywords(db: &Database, pick_id: u64) -> Vec<String> {
    db.read(|view| keywords::pick_keywords(view, pick_id))
        .unwrap()
        .into_iter()
        .map(|k| k.keyword)
        .collect()
}

#[tokio::test]
async fn test_channel_queue_full_and_closed() {
    let (queue, receiver) = enrichment::channel(1);
    let message = EnrichmentMessage {
        pick_id: 1,
        user_id: Uuid::new_v4(),
        text: "text".to_string(),
    };

    queue.send(message.clone()).await.unwrap();
    assert!(matches!(
        queue.send(message.clone()).await,
        Err(QueueError::Full)
    ));

    drop(receiver);
    assert!(matches!(queue.send(message).await, Err(QueueError::Closed)));
}

#[tokio::test]
async fn test_worker_stores_keywords() {
    let (_dir, db) = test_db();
    let (service, mut receiver) = service_with_channel(&db, 16);
    let user = Uuid::new_v4();
    create_book(&service, user, "Space", "Planets orbit stars").await;

    let message = receiver.recv().await.expect("message relayed");
    let pick_id = message.pick_id;
    let worker = KeywordWorker::new(Arc::clone(&service), keyword_generator(), receiver);

    assert_eq!(worker.process(message.clone()).await.unwrap(), 2);
    assert_eq!(stored_keywords(&db, pick_id), vec!["orbit", "gravity"]);

    // At-least-once delivery: a redelivered message adds nothing
    assert_eq!(worker.process(message).await.unwrap(), 0);
    assert_eq!(stored_keywords(&db, pick_id).len(), 2);
}

#[tokio::test]
async fn test_worker_message_for_deleted_pick() {
    let (_dir, db) = test_db();
    let (service, receiver) = service_with_channel(&db, 16);
    let worker = KeywordWorker::new(Arc::clone(&service), keyword_generator(), receiver);

    let orphan = EnrichmentMessage {
        pick_id: 999,
        user_id: Uuid::new_v4(),
        text: "gone".to_string(),
    };
    assert!(matches!(
        worker.process(orphan).await,
        Err(WorkerError::Service(ServiceError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_worker_generator_failure() {
    let (_dir, db) = test_db();
    let (service, mut receiver) = service_with_channel(&db, 16);
    create_book(&service, Uuid::new_v4(), "Fails", "text to enrich").await;
    let message = receiver.recv().await.unwrap();
    let pick_id = message.pick_id;

    let worker = KeywordWorker::new(Arc::clone(&service), Arc::new(FailingGenerator), receiver);
    assert!(matches!(
        worker.process(message).await,
        Err(WorkerError::Generator(_))
    ));
    assert!(stored_keywords(&db, pick_id).is_empty());
}

#[tokio::test]
async fn test_worker_run_consumes_queue() {
    let (_dir, db) = test_db();
    let (queue, receiver) = enrichment::channel(16);
    let service = Arc::new(BookService::new(
        db.clone(),
        Arc::new(queue),
        Arc::new(LocalGenerator::new()),
        Arc::new(FixedLookup(Some(""))),
        ServiceConfig::default(),
    ));
    create_book(&service, Uuid::new_v4(), "Words", "telescopes telescopes mirrors").await;

    let worker = KeywordWorker::new(
        Arc::clone(&service),
        Arc::new(LocalGenerator::new()),
        receiver,
    );
    let handle = tokio::spawn(worker.run());

    // First pick allocated in a fresh database
    let pick_id = 1;
    wait_until(|| !stored_keywords(&db, pick_id).is_empty()).await;
    handle.abort();

    assert_eq!(stored_keywords(&db, pick_id), vec!["telescopes", "mirrors"]);
}

#[tokio::test]
async fn test_outbox_relay_sweeps_pending() {
    let (_dir, db) = test_db();
    let (service, mut receiver) = service_with_channel(&db, 16);

    let message = EnrichmentMessage {
        pick_id: 42,
        user_id: Uuid::new_v4(),
        text: "left behind".to_string(),
    };
    db.write(|tx| tx.enqueue_enrichment(&message)).unwrap();

    let relay = OutboxRelay::new(Arc::clone(&service), Duration::from_millis(10));
    let handle = tokio::spawn(relay.run());

    let relayed = tokio::time::timeout(Duration::from_secs(5), receiver.recv())
        .await
        .expect("relay should deliver the pending message")
        .unwrap();
    wait_until(|| {
        db.read(|view| outbox::pending_enrichment(view, 10))
            .unwrap()
            .is_empty()
    })
    .await;
    handle.abort();

    assert_eq!(relayed, message);
}

#[tokio::test]
async fn test_duplicate_relay_enriches_once() {
    let (_dir, db) = test_db();
    let (service, mut receiver) = service_with_channel(&db, 16);
    let user = Uuid::new_v4();
    create_book(&service, user, "Twice", "sent twice").await;
    let first = receiver.recv().await.unwrap();
    let pick_id = first.pick_id;

    // The same request left in the outbox again, as when a sweep races the
    // post-commit relay
    db.write(|tx| tx.enqueue_enrichment(&first)).unwrap();
    assert_eq!(service.relay_enrichment_outbox().await.unwrap(), 1);
    let second = receiver.recv().await.unwrap();
    assert_eq!(second, first);

    let worker = KeywordWorker::new(Arc::clone(&service), keyword_generator(), receiver);
    assert_eq!(worker.process(first).await.unwrap(), 2);
    assert_eq!(worker.process(second).await.unwrap(), 0);
    assert_eq!(stored_keywords(&db, pick_id), vec!["orbit", "gravity"]);
}
