//! Topic feed adapter.
//!
//! Consumes whole topic sets from an external feed and applies them to the
//! shared `TopicAuthorization`. One background task per listener is the only
//! writer of the snapshot.
//!
//! ```text
//!  topic discovery ──Vec<String>──→ TopicFeed ──→ [feed task] ──refresh──→ TopicAuthorization
//!                                                                              ↑ query
//!                                                                     MessageCheckHandler (N workers)
//! ```

use async_trait::async_trait;
use kite_telemetry::{metric_inc, TOPIC_COUNT, TOPIC_REFRESHES};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::TopicAuthorization;
use crate::error::CheckError;

/// A continuous source of complete topic sets.
#[async_trait]
pub trait TopicFeed: Send {
    /// Waits for the next topic set. `None` once the feed is closed.
    async fn next_topics(&mut self) -> Option<Vec<String>>;
}

#[async_trait]
impl TopicFeed for mpsc::Receiver<Vec<String>> {
    async fn next_topics(&mut self) -> Option<Vec<String>> {
        self.recv().await
    }
}

#[async_trait]
impl TopicFeed for mpsc::UnboundedReceiver<Vec<String>> {
    async fn next_topics(&mut self) -> Option<Vec<String>> {
        self.recv().await
    }
}

/// Feed backed by a `watch` channel holding the latest topic set.
///
/// The value present at construction is delivered first, then every change.
pub struct WatchTopicFeed {
    receiver: watch::Receiver<Vec<String>>,
    primed: bool,
}

impl WatchTopicFeed {
    pub fn new(receiver: watch::Receiver<Vec<String>>) -> Self {
        Self {
            receiver,
            primed: false,
        }
    }
}

#[async_trait]
impl TopicFeed for WatchTopicFeed {
    async fn next_topics(&mut self) -> Option<Vec<String>> {
        if self.primed {
            self.receiver.changed().await.ok()?;
        }
        self.primed = true;
        let topics = self.receiver.borrow_and_update().clone();
        Some(topics)
    }
}

/// Owns the background task that keeps a `TopicAuthorization` current.
///
/// Dropping the listener stops the task; the snapshot keeps its last value.
pub struct TopicFeedListener {
    topics: Arc<TopicAuthorization>,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl TopicFeedListener {
    /// Waits for the first topic set, then spawns the feed task.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// `CheckError::TopicFeedClosed` if the feed ends before its first value.
    pub async fn start<F>(mut feed: F) -> Result<Self, CheckError>
    where
        F: TopicFeed + 'static,
    {
        let initial = feed.next_topics().await.ok_or(CheckError::TopicFeedClosed)?;
        let topics = Arc::new(TopicAuthorization::new(initial));
        TOPIC_COUNT.set(topics.len() as f64);
        info!(topics = topics.len(), "Initial topic snapshot loaded");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_feed(feed, Arc::clone(&topics), shutdown_rx));

        Ok(Self {
            topics,
            shutdown_tx,
            handle,
        })
    }

    /// The snapshot this listener keeps current.
    pub fn topics(&self) -> Arc<TopicAuthorization> {
        Arc::clone(&self.topics)
    }

    /// Whether the feed task is still consuming.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops the feed task and waits for it to exit.
    pub async fn shutdown(self) {
        if self.shutdown_tx.send(true).is_err() {
            debug!("Topic feed task already stopped");
        }
        if let Err(e) = self.handle.await {
            error!(error = %e, "Topic feed task panicked");
        }
    }
}

async fn run_feed<F: TopicFeed>(
    mut feed: F,
    topics: Arc<TopicAuthorization>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.changed() => {
                info!("Topic feed task shutting down");
                break;
            }
            next = feed.next_topics() => match next {
                Some(new_topics) => {
                    topics.refresh(new_topics);
                    metric_inc!(TOPIC_REFRESHES);
                    TOPIC_COUNT.set(topics.len() as f64);
                    info!(
                        topics = topics.len(),
                        generation = topics.generation(),
                        "Topic snapshot refreshed"
                    );
                }
                None => {
                    warn!(
                        topics = topics.len(),
                        "Topic feed closed, keeping last snapshot"
                    );
                    break;
                }
            },
        }
    }
}
