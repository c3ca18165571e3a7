//! # Change Feed
//!
//! Append-only stream of committed record-store writes.
//!
//! The feed channel is created at process start, so the consumer only ever
//! observes events newer than startup; there is no replay of pre-existing
//! records. Every event carries a full snapshot of the record at write time.
//!
//! Delivery is at-least-once: the consumer must tolerate seeing the same
//! event more than once, and the notifier downstream does not deduplicate.
//! Ordering holds per partition key (the record `id`); since every write uses
//! a fresh id, a single ordered channel satisfies that trivially.

use tokio::sync::mpsc;
use tracing::warn;

use crate::record::SubmissionRecord;

const FEED_CAPACITY: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Insert,
    Modify,
    Remove,
}

#[derive(Clone, Debug)]
pub struct FeedEvent {
    pub kind: EventKind,
    pub record: SubmissionRecord,
}

impl FeedEvent {
    pub fn insert(record: SubmissionRecord) -> Self {
        Self {
            kind: EventKind::Insert,
            record,
        }
    }
}

pub fn channel() -> (FeedWriter, mpsc::Receiver<FeedEvent>) {
    let (tx, rx) = mpsc::channel(FEED_CAPACITY);

    (FeedWriter { tx }, rx)
}

#[derive(Clone)]
pub struct FeedWriter {
    tx: mpsc::Sender<FeedEvent>,
}

impl FeedWriter {
    /// Publishes an event for a committed write. A missing consumer only
    /// loses the notification, never the write, so this does not fail.
    pub async fn emit(&self, event: FeedEvent) {
        if self.tx.send(event).await.is_err() {
            warn!("Change feed closed, dropping event");
        }
    }
}
