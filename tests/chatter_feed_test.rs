//! Behavior of the chatter polling feed against an in-memory source,
//! including the poll/send race and teardown guarantees.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use crmserver::chatter::{ChatterError, ChatterFeed, ChatterMessage, ChatterSource};

struct MockSource {
    messages: Mutex<Vec<ChatterMessage>>,
    poll_calls: AtomicUsize,
    fail_polls: AtomicBool,
    /// When set, `fetch_since` ignores the watermark and returns the whole
    /// thread, simulating a poll racing a send.
    return_everything: AtomicBool,
}

impl MockSource {
    fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            poll_calls: AtomicUsize::new(0),
            fail_polls: AtomicBool::new(false),
            return_everything: AtomicBool::new(false),
        }
    }

    async fn seed(&self, lead_id: Uuid, body: &str) -> ChatterMessage {
        let message = ChatterMessage {
            id: Uuid::new_v4(),
            lead_id,
            author_id: Uuid::new_v4(),
            body: body.to_string(),
            created_at: Utc::now(),
        };
        self.messages.lock().await.push(message.clone());
        message
    }
}

#[async_trait]
impl ChatterSource for MockSource {
    async fn fetch_history(&self, lead_id: Uuid) -> Result<Vec<ChatterMessage>, ChatterError> {
        Ok(self
            .messages
            .lock()
            .await
            .iter()
            .filter(|m| m.lead_id == lead_id)
            .cloned()
            .collect())
    }

    async fn fetch_since(
        &self,
        lead_id: Uuid,
        after: DateTime<Utc>,
    ) -> Result<Vec<ChatterMessage>, ChatterError> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_polls.load(Ordering::SeqCst) {
            return Err(ChatterError::Database("connection reset".to_string()));
        }
        let everything = self.return_everything.load(Ordering::SeqCst);
        Ok(self
            .messages
            .lock()
            .await
            .iter()
            .filter(|m| m.lead_id == lead_id && (everything || m.created_at > after))
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        lead_id: Uuid,
        author_id: Uuid,
        body: &str,
    ) -> Result<ChatterMessage, ChatterError> {
        let message = ChatterMessage {
            id: Uuid::new_v4(),
            lead_id,
            author_id,
            body: body.to_string(),
            created_at: Utc::now(),
        };
        self.messages.lock().await.push(message.clone());
        Ok(message)
    }
}

const FAST_POLL: Duration = Duration::from_millis(10);

#[tokio::test]
async fn test_feed_loads_history_and_merges_new_messages() {
    let source = Arc::new(MockSource::new());
    let lead_id = Uuid::new_v4();
    source.seed(lead_id, "first").await;

    let feed = ChatterFeed::start(source.clone(), lead_id, FAST_POLL)
        .await
        .unwrap();
    assert_eq!(feed.messages().await.len(), 1);

    source.seed(lead_id, "second").await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let messages = feed.messages().await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].body, "second");
}

#[tokio::test]
async fn test_send_racing_a_poll_never_duplicates() {
    let source = Arc::new(MockSource::new());
    let lead_id = Uuid::new_v4();
    source.seed(lead_id, "first").await;
    // Worst case: every poll re-returns the entire thread.
    source.return_everything.store(true, Ordering::SeqCst);

    let feed = ChatterFeed::start(source.clone(), lead_id, FAST_POLL)
        .await
        .unwrap();
    let sent = feed.send(Uuid::new_v4(), "from me").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let messages = feed.messages().await;
    assert_eq!(messages.len(), 2, "sent message must appear exactly once");
    let occurrences = messages.iter().filter(|m| m.id == sent.id).count();
    assert_eq!(occurrences, 1);
}

#[tokio::test]
async fn test_stop_halts_polling() {
    let source = Arc::new(MockSource::new());
    let lead_id = Uuid::new_v4();
    source.seed(lead_id, "first").await;

    let feed = ChatterFeed::start(source.clone(), lead_id, FAST_POLL)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(source.poll_calls.load(Ordering::SeqCst) > 0);

    feed.stop();
    assert!(feed.is_stopped());
    tokio::time::sleep(Duration::from_millis(30)).await;
    let after_stop = source.poll_calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        source.poll_calls.load(Ordering::SeqCst),
        after_stop,
        "no polls may happen after stop"
    );
}

#[tokio::test]
async fn test_dropping_the_feed_stops_polling() {
    let source = Arc::new(MockSource::new());
    let lead_id = Uuid::new_v4();
    source.seed(lead_id, "first").await;

    let feed = ChatterFeed::start(source.clone(), lead_id, FAST_POLL)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(feed);

    tokio::time::sleep(Duration::from_millis(30)).await;
    let after_drop = source.poll_calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(source.poll_calls.load(Ordering::SeqCst), after_drop);
}

#[tokio::test]
async fn test_poll_failures_are_retried_silently() {
    let source = Arc::new(MockSource::new());
    let lead_id = Uuid::new_v4();
    source.seed(lead_id, "first").await;
    source.fail_polls.store(true, Ordering::SeqCst);

    let feed = ChatterFeed::start(source.clone(), lead_id, FAST_POLL)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(
        source.poll_calls.load(Ordering::SeqCst) > 2,
        "failed polls must keep the loop running"
    );

    // Recovery: once the source heals, new messages flow again.
    source.fail_polls.store(false, Ordering::SeqCst);
    source.seed(lead_id, "after outage").await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let messages = feed.messages().await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].body, "after outage");
}
