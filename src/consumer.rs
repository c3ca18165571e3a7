//! # Notification Consumer
//!
//! Turns change-feed events into outbound emails.
//!
//! Each received event is a batch of one, so retry granularity is per record
//! and one poisoned record never blocks the rest of the feed. A failing send
//! is retried up to [`ConsumerSettings::attempts`] total tries; after that the
//! event is dropped with only an error-level log line. There is no dead-letter
//! path. Non-insert events and records without a usable email address are
//! filtered, not failed.

use std::time::Duration;

use tokio::{sync::mpsc, time::timeout};
use tracing::{debug, error, info, warn};

use crate::{
    email::EmailNotifier,
    feed::{EventKind, FeedEvent},
};

pub struct ConsumerSettings {
    pub attempts: u32,
    pub send_timeout: Duration,
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        Self {
            attempts: 3,
            send_timeout: Duration::from_secs(30),
        }
    }
}

pub async fn run_consumer<N: EmailNotifier>(
    mut events: mpsc::Receiver<FeedEvent>,
    notifier: N,
    settings: ConsumerSettings,
) {
    info!("Notification consumer started");

    while let Some(event) = events.recv().await {
        handle_event(&notifier, &event, &settings).await;
    }

    info!("Change feed closed, consumer stopping");
}

async fn handle_event<N: EmailNotifier>(
    notifier: &N,
    event: &FeedEvent,
    settings: &ConsumerSettings,
) {
    if event.kind != EventKind::Insert {
        debug!(kind = ?event.kind, "Ignoring non-insert feed event");
        return;
    }

    let record = &event.record;

    if record.email.trim().is_empty() {
        warn!(id = %record.id, "No email found in record, skipping");
        return;
    }

    for attempt in 1..=settings.attempts {
        match timeout(
            settings.send_timeout,
            notifier.send(&record.email, &record.name),
        )
        .await
        {
            Ok(Ok(())) => {
                info!(id = %record.id, email = %record.email, "Email sent successfully");
                return;
            }
            Ok(Err(e)) => {
                warn!(id = %record.id, attempt, error = %e, "Email send failed");
            }
            Err(_) => {
                warn!(id = %record.id, attempt, "Email send timed out");
            }
        }
    }

    error!(
        id = %record.id,
        attempts = settings.attempts,
        "Dropping notification after exhausting retries"
    );
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    };
    use std::time::Duration;

    use reqwest::StatusCode;

    use super::{ConsumerSettings, handle_event, run_consumer};
    use crate::{
        email::{EmailNotifier, NotifyError},
        feed::{EventKind, FeedEvent, channel},
        record::SubmissionRecord,
    };

    struct RecordingNotifier {
        fail_first: u32,
        calls: AtomicU32,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingNotifier {
        fn new(fail_first: u32) -> Self {
            Self {
                fail_first,
                calls: AtomicU32::new(0),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl EmailNotifier for RecordingNotifier {
        async fn send(&self, email: &str, name: &str) -> Result<(), NotifyError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

            if call <= self.fail_first {
                return Err(NotifyError::Rejected(StatusCode::INTERNAL_SERVER_ERROR));
            }

            self.sent
                .lock()
                .unwrap()
                .push((email.to_string(), name.to_string()));

            Ok(())
        }
    }

    struct StalledNotifier {
        calls: AtomicU32,
    }

    impl EmailNotifier for StalledNotifier {
        async fn send(&self, _email: &str, _name: &str) -> Result<(), NotifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(3600)).await;

            Ok(())
        }
    }

    fn insert_event() -> FeedEvent {
        FeedEvent::insert(SubmissionRecord {
            id: "abc".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        })
    }

    #[tokio::test]
    async fn test_insert_event_sends_once() {
        let notifier = RecordingNotifier::new(0);

        handle_event(&notifier, &insert_event(), &ConsumerSettings::default()).await;

        assert_eq!(notifier.calls(), 1);
        assert_eq!(
            notifier.sent(),
            vec![("ada@example.com".to_string(), "Ada".to_string())]
        );
    }

    #[tokio::test]
    async fn test_non_insert_events_are_skipped() {
        let notifier = RecordingNotifier::new(0);

        for kind in [EventKind::Modify, EventKind::Remove] {
            let mut event = insert_event();
            event.kind = kind;

            handle_event(&notifier, &event, &ConsumerSettings::default()).await;
        }

        assert_eq!(notifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_email_is_skipped() {
        let notifier = RecordingNotifier::new(0);

        for email in ["", "   "] {
            let mut event = insert_event();
            event.record.email = email.to_string();

            handle_event(&notifier, &event, &ConsumerSettings::default()).await;
        }

        assert_eq!(notifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let notifier = RecordingNotifier::new(2);

        handle_event(&notifier, &insert_event(), &ConsumerSettings::default()).await;

        // Two failed attempts, one success, no duplicate send.
        assert_eq!(notifier.calls(), 3);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_drops_after_exhausting_retries() {
        let notifier = RecordingNotifier::new(u32::MAX);

        handle_event(&notifier, &insert_event(), &ConsumerSettings::default()).await;

        assert_eq!(notifier.calls(), 3);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failed_attempt() {
        let notifier = StalledNotifier {
            calls: AtomicU32::new(0),
        };

        handle_event(&notifier, &insert_event(), &ConsumerSettings::default()).await;

        assert_eq!(notifier.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_consumer_drains_feed() {
        let (writer, events) = channel();
        let notifier = Arc::new(RecordingNotifier::new(0));

        let mut second = insert_event();
        second.record.id = "def".to_string();
        second.record.email = "bob@example.com".to_string();
        second.record.name = "Bob".to_string();

        writer.emit(insert_event()).await;
        writer.emit(second).await;
        drop(writer);

        run_consumer(events, notifier.clone(), ConsumerSettings::default()).await;

        assert_eq!(
            notifier.sent(),
            vec![
                ("ada@example.com".to_string(), "Ada".to_string()),
                ("bob@example.com".to_string(), "Bob".to_string()),
            ]
        );
    }
}
