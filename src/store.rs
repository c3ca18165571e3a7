//! # Record Store
//!
//! Durable keyed persistence for submission records, backed by Redis.
//!
//! The store exposes a put-only contract: records are immutable once written
//! and every write uses a freshly generated id, so overwrite semantics are
//! never exercised. A change-feed event is emitted only after the backend
//! acknowledges the write (write-then-notify); a failed write emits nothing.

use std::{future::Future, time::Duration};

use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use thiserror::Error;

use crate::{
    feed::{FeedEvent, FeedWriter},
    record::SubmissionRecord,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Store write failed: {0}")]
    Backend(#[from] redis::RedisError),
}

/// Put-only persistence capability, injected as a stateless handle.
pub trait RecordStore: Send + Sync {
    fn put(&self, record: &SubmissionRecord) -> impl Future<Output = Result<(), StoreError>> + Send;
}

pub async fn init_redis(redis_url: &str) -> ConnectionManager {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url).unwrap();
    let connection_manager = client
        .get_connection_manager_with_config(config)
        .await
        .unwrap();

    connection_manager
}

pub struct RedisStore {
    connection: ConnectionManager,
    table: String,
    feed: FeedWriter,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager, table: String, feed: FeedWriter) -> Self {
        Self {
            connection,
            table,
            feed,
        }
    }
}

impl RecordStore for RedisStore {
    async fn put(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        let payload = serde_json::to_string(record)?;
        let key = format!("{}:{}", self.table, record.id);

        let mut connection = self.connection.clone();
        let _: () = connection.set(&key, payload).await?;

        self.feed.emit(FeedEvent::insert(record.clone())).await;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) struct MemoryStore {
    pub(crate) records: std::sync::Mutex<Vec<SubmissionRecord>>,
    pub(crate) feed: Option<FeedWriter>,
    pub(crate) fail_puts: bool,
}

#[cfg(test)]
impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self {
            records: std::sync::Mutex::new(Vec::new()),
            feed: None,
            fail_puts: false,
        }
    }

    pub(crate) fn with_feed(feed: FeedWriter) -> Self {
        Self {
            feed: Some(feed),
            ..Self::new()
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail_puts: true,
            ..Self::new()
        }
    }
}

#[cfg(test)]
impl RecordStore for MemoryStore {
    async fn put(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        if self.fail_puts {
            return Err(StoreError::Backend(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "record store offline",
            ))));
        }

        self.records.lock().unwrap().push(record.clone());

        if let Some(feed) = &self.feed {
            feed.emit(FeedEvent::insert(record.clone())).await;
        }

        Ok(())
    }
}
