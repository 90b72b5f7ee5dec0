#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bookpicks::enrichment::{EnrichmentMessage, EnrichmentQueue, QueueError};
use bookpicks::generator::{GeneratorError, LocalGenerator, TextGenerator};
use bookpicks::lookup::{AuthorLookup, LookupError};
use bookpicks::service::{
    BookService, BookView, CreateOutcome, CreatePickParams, PickInput, PickView, ServiceConfig,
};
use bookpicks::storage::Database;
use uuid::Uuid;

/// Queue that records every message it accepts
#[derive(Default)]
pub struct RecordingQueue {
    pub sent: Mutex<Vec<EnrichmentMessage>>,
}

impl RecordingQueue {
    pub fn messages(&self) -> Vec<EnrichmentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EnrichmentQueue for RecordingQueue {
    async fn send(&self, message: EnrichmentMessage) -> Result<(), QueueError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Queue whose backend is always down
pub struct FailingQueue;

#[async_trait]
impl EnrichmentQueue for FailingQueue {
    async fn send(&self, _message: EnrichmentMessage) -> Result<(), QueueError> {
        Err(QueueError::Backend("broker unreachable".to_string()))
    }
}

/// Generator that always fails
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn topics(&self, _text: &str) -> Result<Vec<String>, GeneratorError> {
        Err(GeneratorError::Request("model offline".to_string()))
    }

    async fn keywords(&self, _text: &str) -> Result<Vec<String>, GeneratorError> {
        Err(GeneratorError::Request("model offline".to_string()))
    }
}

/// Generator returning fixed labels and keywords
pub struct FixedGenerator {
    pub topics: Vec<String>,
    pub keywords: Vec<String>,
}

#[async_trait]
impl TextGenerator for FixedGenerator {
    async fn topics(&self, _text: &str) -> Result<Vec<String>, GeneratorError> {
        Ok(self.topics.clone())
    }

    async fn keywords(&self, _text: &str) -> Result<Vec<String>, GeneratorError> {
        Ok(self.keywords.clone())
    }
}

/// Lookup answering every title with the same author, or failing
pub struct FixedLookup(pub Option<&'static str>);

#[async_trait]
impl AuthorLookup for FixedLookup {
    async fn lookup(&self, _title: &str) -> Result<String, LookupError> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| LookupError::Request("lookup service down".to_string()))
    }
}

pub struct Harness {
    pub _dir: tempfile::TempDir,
    pub db: Database,
    pub queue: Arc<RecordingQueue>,
    pub service: Arc<BookService>,
}

pub fn harness() -> Harness {
    harness_with(
        Arc::new(LocalGenerator::new()),
        Arc::new(FixedLookup(Some("Carl Sagan"))),
    )
}

pub fn harness_with(
    generator: Arc<dyn TextGenerator>,
    lookup: Arc<dyn AuthorLookup>,
) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    let queue = Arc::new(RecordingQueue::default());
    let service = Arc::new(BookService::new(
        db.clone(),
        queue.clone(),
        generator,
        lookup,
        ServiceConfig::default(),
    ));
    Harness {
        _dir: dir,
        db,
        queue,
        service,
    }
}

pub fn pick_input(text: &str) -> PickInput {
    PickInput {
        content: format!("{{\"text\":\"{text}\"}}"),
        content_text: text.to_string(),
        title: None,
        index: None,
    }
}

pub async fn create_book(service: &BookService, user: Uuid, title: &str, text: &str) -> BookView {
    let outcome = service
        .create_pick(
            user,
            CreatePickParams {
                book_id: None,
                title: Some(title.to_string()),
                author: None,
                pick: pick_input(text),
            },
        )
        .await
        .unwrap();
    match outcome {
        CreateOutcome::Book(book) => book,
        CreateOutcome::Pick(_) => panic!("expected a new book"),
    }
}

pub async fn add_pick(
    service: &BookService,
    user: Uuid,
    book_id: Uuid,
    text: &str,
    index: Option<u32>,
) -> PickView {
    let mut pick = pick_input(text);
    pick.index = index;
    let outcome = service
        .create_pick(
            user,
            CreatePickParams {
                book_id: Some(book_id),
                pick,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    match outcome {
        CreateOutcome::Pick(pick) => pick,
        CreateOutcome::Book(_) => panic!("expected a new pick"),
    }
}
