//! Polling feed over a lead's chatter thread.
//!
//! The feed loads the full history once, then polls the source on a fixed
//! interval for messages newer than the latest known timestamp. Merging is
//! id-deduplicated so a send racing a poll cannot produce a duplicate, and
//! a failed poll is logged and retried on the next tick without ever
//! stopping the loop. Teardown cancels the interval task and aborts any
//! in-flight poll, so no source calls happen after `stop`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

use super::error::ChatterError;
use super::types::ChatterMessage;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Where the feed reads and writes messages. The production implementation
/// is `ChatterService`; tests substitute an in-memory source.
#[async_trait]
pub trait ChatterSource: Send + Sync + 'static {
    async fn fetch_history(&self, lead_id: Uuid) -> Result<Vec<ChatterMessage>, ChatterError>;

    async fn fetch_since(
        &self,
        lead_id: Uuid,
        after: DateTime<Utc>,
    ) -> Result<Vec<ChatterMessage>, ChatterError>;

    async fn insert(
        &self,
        lead_id: Uuid,
        author_id: Uuid,
        body: &str,
    ) -> Result<ChatterMessage, ChatterError>;
}

struct FeedState {
    messages: Vec<ChatterMessage>,
    seen: HashSet<Uuid>,
    latest: Option<DateTime<Utc>>,
}

impl FeedState {
    fn new(history: Vec<ChatterMessage>) -> Self {
        let mut state = Self {
            messages: Vec::new(),
            seen: HashSet::new(),
            latest: None,
        };
        state.merge(history);
        state
    }

    /// Append messages whose id has not been seen yet, preserving the
    /// order they arrived in, and advance the poll watermark.
    fn merge(&mut self, batch: Vec<ChatterMessage>) {
        for message in batch {
            if !self.seen.insert(message.id) {
                continue;
            }
            if self.latest.map_or(true, |ts| message.created_at > ts) {
                self.latest = Some(message.created_at);
            }
            self.messages.push(message);
        }
    }
}

pub struct ChatterFeed {
    lead_id: Uuid,
    source: Arc<dyn ChatterSource>,
    state: Arc<Mutex<FeedState>>,
    cancel: CancellationToken,
}

impl ChatterFeed {
    /// Load the full history, then start polling in the background.
    pub async fn start(
        source: Arc<dyn ChatterSource>,
        lead_id: Uuid,
        poll_interval: Duration,
    ) -> Result<Self, ChatterError> {
        let history = source.fetch_history(lead_id).await?;
        let state = Arc::new(Mutex::new(FeedState::new(history)));
        let cancel = CancellationToken::new();

        tokio::spawn(poll_loop(
            Arc::clone(&source),
            lead_id,
            Arc::clone(&state),
            cancel.clone(),
            poll_interval,
        ));

        Ok(Self {
            lead_id,
            source,
            state,
            cancel,
        })
    }

    /// Insert through the source, then reflect the confirmed message in
    /// local state immediately. Marking the id seen here is what keeps a
    /// racing poll from appending it a second time.
    pub async fn send(&self, author_id: Uuid, body: &str) -> Result<ChatterMessage, ChatterError> {
        let message = self.source.insert(self.lead_id, author_id, body).await?;
        self.state.lock().await.merge(vec![message.clone()]);
        Ok(message)
    }

    pub async fn messages(&self) -> Vec<ChatterMessage> {
        self.state.lock().await.messages.clone()
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for ChatterFeed {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_loop(
    source: Arc<dyn ChatterSource>,
    lead_id: Uuid,
    state: Arc<Mutex<FeedState>>,
    cancel: CancellationToken,
    poll_interval: Duration,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick of a tokio interval completes immediately; the
    // history load already covered that window.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let after = state.lock().await.latest;
        let fetch = async {
            match after {
                Some(ts) => source.fetch_since(lead_id, ts).await,
                None => source.fetch_history(lead_id).await,
            }
        };

        let batch = tokio::select! {
            _ = cancel.cancelled() => break,
            result = fetch => result,
        };

        match batch {
            Ok(rows) => {
                if !rows.is_empty() {
                    state.lock().await.merge(rows);
                }
            }
            Err(e) => {
                warn!(lead_id = %lead_id, "chatter poll failed, retrying next tick: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(lead_id: Uuid, secs: i64) -> ChatterMessage {
        ChatterMessage {
            id: Uuid::new_v4(),
            lead_id,
            author_id: Uuid::new_v4(),
            body: "hi".to_string(),
            created_at: DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_merge_dedups_by_id() {
        let lead_id = Uuid::new_v4();
        let first = message(lead_id, 1);
        let second = message(lead_id, 2);
        let mut state = FeedState::new(vec![first.clone()]);

        state.merge(vec![first.clone(), second.clone()]);
        state.merge(vec![second.clone()]);

        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].id, first.id);
        assert_eq!(state.messages[1].id, second.id);
    }

    #[test]
    fn test_merge_advances_watermark() {
        let lead_id = Uuid::new_v4();
        let mut state = FeedState::new(vec![message(lead_id, 5)]);
        let early = message(lead_id, 1);

        state.merge(vec![early]);

        // An older message still merges (dedup is by id), but must not
        // move the watermark backwards.
        assert_eq!(state.messages.len(), 2);
        assert_eq!(
            state.latest,
            Some(DateTime::from_timestamp(1_700_000_005, 0).unwrap())
        );
    }

    #[test]
    fn test_merge_preserves_arrival_order() {
        let lead_id = Uuid::new_v4();
        let a = message(lead_id, 3);
        let b = message(lead_id, 1);
        let mut state = FeedState::new(Vec::new());

        state.merge(vec![a.clone(), b.clone()]);

        assert_eq!(state.messages[0].id, a.id);
        assert_eq!(state.messages[1].id, b.id);
    }
}
