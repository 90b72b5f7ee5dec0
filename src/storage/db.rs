use redb::{Database as RedbDatabase, ReadTransaction, ReadableTableMetadata, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::tables::*;
use super::view::{ReadView, WriteView};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Commit error: {0}")]
    Commit(Box<redb::CommitError>),
    #[error("Corrupt index: {0}")]
    Corrupt(String),
    #[error("Database error: {0}")]
    Redb(Box<redb::Error>),
    #[error("Database error: {0}")]
    RedbDatabase(Box<redb::DatabaseError>),
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),
    #[error("Storage error: {0}")]
    Storage(Box<redb::StorageError>),
    #[error("Table error: {0}")]
    Table(Box<redb::TableError>),
    #[error("Transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),
}

impl From<redb::CommitError> for DatabaseError {
    fn from(e: redb::CommitError) -> Self {
        DatabaseError::Commit(Box::new(e))
    }
}

impl From<redb::DatabaseError> for DatabaseError {
    fn from(e: redb::DatabaseError) -> Self {
        DatabaseError::RedbDatabase(Box::new(e))
    }
}

impl From<redb::Error> for DatabaseError {
    fn from(e: redb::Error) -> Self {
        DatabaseError::Redb(Box::new(e))
    }
}

impl From<redb::StorageError> for DatabaseError {
    fn from(e: redb::StorageError) -> Self {
        DatabaseError::Storage(Box::new(e))
    }
}

impl From<redb::TableError> for DatabaseError {
    fn from(e: redb::TableError) -> Self {
        DatabaseError::Table(Box::new(e))
    }
}

impl From<redb::TransactionError> for DatabaseError {
    fn from(e: redb::TransactionError) -> Self {
        DatabaseError::Transaction(Box::new(e))
    }
}

pub struct Database {
    db: Arc<RedbDatabase>,
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

/// Statistics from a purge operation
#[derive(Debug, Default)]
pub struct PurgeStats {
    pub books: u64,
    pub picks: u64,
    pub topics: u64,
    pub keywords: u64,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("bookpicks.redb");
        let db = Arc::new(RedbDatabase::create(db_path)?);

        // Initialize application tables
        let write_txn = db.begin_write()?;
        {
            let _ = WriteView::open(&write_txn)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Begin a read transaction
    pub fn begin_read(&self) -> Result<ReadTransaction, DatabaseError> {
        Ok(self.db.begin_read()?)
    }

    /// Begin a write transaction. redb admits a single writer at a time, so
    /// every closure passed to [`Database::write`] runs serialized.
    pub fn begin_write(&self) -> Result<WriteTransaction, DatabaseError> {
        Ok(self.db.begin_write()?)
    }

    /// Run `f` against a consistent snapshot of every table.
    pub fn read<T, E>(&self, f: impl FnOnce(&ReadView) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DatabaseError>,
    {
        let read_txn = self.begin_read()?;
        let view = ReadView::open(&read_txn)?;
        f(&view)
    }

    /// Run `f` inside one write transaction. The transaction commits only when
    /// `f` returns `Ok`; any error drops it uncommitted, which aborts every write.
    pub fn write<T, E>(&self, f: impl FnOnce(&mut WriteView<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DatabaseError>,
    {
        let write_txn = self.begin_write()?;
        let value = {
            let mut view = WriteView::open(&write_txn)?;
            f(&mut view)?
        };
        write_txn.commit().map_err(DatabaseError::from)?;
        Ok(value)
    }

    // ========================================================================
    // Admin operations
    // ========================================================================

    /// Purge all data - for testing only
    pub fn purge_all(&self) -> Result<PurgeStats, DatabaseError> {
        let write_txn = self.begin_write()?;
        let stats = {
            let view = WriteView::open(&write_txn)?;
            PurgeStats {
                books: view.books.len()?,
                picks: view.picks.len()?,
                topics: view.topics.len()?,
                keywords: view.keywords.len()?,
            }
        };

        write_txn.delete_table(BOOKS)?;
        write_txn.delete_table(BOOK_GUIDS)?;
        write_txn.delete_table(USER_BOOKS)?;
        write_txn.delete_table(PICKS)?;
        write_txn.delete_table(PICK_GUIDS)?;
        write_txn.delete_table(BOOK_PICKS)?;
        write_txn.delete_table(TOPICS)?;
        write_txn.delete_table(TOPIC_LABELS)?;
        write_txn.delete_table(BOOK_TOPICS)?;
        write_txn.delete_table(TOPIC_BOOKS)?;
        write_txn.delete_table(PICK_KEYWORDS)?;
        write_txn.delete_table(KEYWORD_INDEX)?;
        write_txn.delete_table(ENRICHMENT_OUTBOX)?;
        write_txn.delete_table(SEQUENCES)?;

        // Recreate the empty tables
        {
            let _ = WriteView::open(&write_txn)?;
        }

        write_txn.commit()?;
        Ok(stats)
    }
}
