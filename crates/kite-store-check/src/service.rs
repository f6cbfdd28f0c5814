//! Check stage service - wires the topic feed to the handler.
//!
//! Owns the feed listener and a shared `MessageCheckHandler` that the
//! pipeline can hand to any number of workers.

use kite_telemetry::log_event;
use std::sync::Arc;

use crate::adapters::{TopicFeed, TopicFeedListener};
use crate::config::StoreCheckConfig;
use crate::domain::TopicAuthorization;
use crate::error::CheckError;
use crate::handler::{MessageCheckHandler, STAGE};
use crate::ports::{SystemTimeSource, TimeSource};

/// Check stage service state
pub struct StoreCheckService<T: TimeSource = SystemTimeSource> {
    handler: Arc<MessageCheckHandler<T>>,
    listener: TopicFeedListener,
}

impl<T: TimeSource> StoreCheckService<T> {
    /// Validate `config`, wait for the first topic set, then build the handler.
    ///
    /// # Errors
    /// - `CheckError::Config` if the configuration is invalid
    /// - `CheckError::TopicFeedClosed` if the feed ends before its first value
    pub async fn start<F>(
        config: StoreCheckConfig,
        feed: F,
        time_source: T,
    ) -> Result<Self, CheckError>
    where
        F: TopicFeed + 'static,
    {
        config.validate()?;

        let listener = TopicFeedListener::start(feed).await?;
        let handler = Arc::new(MessageCheckHandler::from_config(
            &config,
            listener.topics(),
            time_source,
        ));

        log_event!(
            info,
            STAGE,
            "Check stage started",
            handler = %config.handler_name,
            max_deliver_limit = config.max_deliver_limit,
            max_expired_secs = config.max_expired_secs
        );

        Ok(Self { handler, listener })
    }

    /// The handler to register with the pipeline.
    pub fn handler(&self) -> Arc<MessageCheckHandler<T>> {
        Arc::clone(&self.handler)
    }

    /// The snapshot the handler checks topics against.
    pub fn topics(&self) -> Arc<TopicAuthorization> {
        self.listener.topics()
    }

    /// Whether the topic feed is still being consumed.
    pub fn is_feed_running(&self) -> bool {
        self.listener.is_running()
    }

    /// Stop consuming the topic feed.
    ///
    /// Handlers already handed out keep working against the last snapshot.
    pub async fn shutdown(self) {
        log_event!(info, STAGE, "Check stage shutting down");
        self.listener.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ChannelPipelineContext;
    use crate::domain::{
        CheckOutcome, ClientConnection, MessageEntity, MessageHeader, PersistentEvent, RejectReason,
    };
    use crate::error::ConfigError;
    use crate::ports::outbound::MockTimeSource;
    use crate::ports::{ForwardHandler, PipelineEvent};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::{sleep, timeout};

    const NOW: i64 = 1_700_000_000;

    fn topic_set(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn event(topic: &str) -> PipelineEvent {
        PersistentEvent::new(
            MessageEntity::new(MessageHeader::new(topic), vec![1, 2, 3]),
            1,
            ClientConnection::new("127.0.0.1:9000"),
        )
        .into()
    }

    #[tokio::test]
    async fn test_start_and_check() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(topic_set(&["orders"])).await.unwrap();

        let service = StoreCheckService::start(
            StoreCheckConfig::default(),
            rx,
            MockTimeSource::new(NOW),
        )
        .await
        .unwrap();
        let (ctx, mut out) = ChannelPipelineContext::channel();

        let outcome = service.handler().check(&ctx, event("orders")).unwrap();

        assert_eq!(outcome, CheckOutcome::Forwarded);
        assert!(matches!(out.recv().await, Some(PipelineEvent::Persistent(_))));
        assert_eq!(service.handler().name(), "check_message");
        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_feed() {
        let (_tx, rx) = mpsc::channel::<Vec<String>>(1);
        let config = StoreCheckConfig {
            max_deliver_limit: 0,
            ..Default::default()
        };

        let result = StoreCheckService::start(config, rx, MockTimeSource::new(NOW)).await;

        assert!(matches!(
            result,
            Err(CheckError::Config(ConfigError::InvalidDeliverLimit(0)))
        ));
    }

    #[tokio::test]
    async fn test_closed_feed_fails_start() {
        let (tx, rx) = mpsc::channel::<Vec<String>>(1);
        drop(tx);

        let result =
            StoreCheckService::start(StoreCheckConfig::default(), rx, MockTimeSource::new(NOW))
                .await;

        assert!(matches!(result, Err(CheckError::TopicFeedClosed)));
    }

    #[tokio::test]
    async fn test_refresh_reaches_handler() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(topic_set(&["orders"])).await.unwrap();
        let service = StoreCheckService::start(
            StoreCheckConfig::default(),
            rx,
            MockTimeSource::new(NOW),
        )
        .await
        .unwrap();
        let handler = service.handler();
        let (ctx, _out) = ChannelPipelineContext::channel();

        assert_eq!(
            handler.check(&ctx, event("shipping")).unwrap(),
            CheckOutcome::Rejected(RejectReason::UnsupportedTopic)
        );

        tx.send(topic_set(&["orders", "shipping"])).await.unwrap();
        let topics = service.topics();
        timeout(Duration::from_secs(1), async {
            while !topics.query("shipping") {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timeout waiting for refresh");

        assert_eq!(
            handler.check(&ctx, event("shipping")).unwrap(),
            CheckOutcome::Forwarded
        );
        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_handler_outlives_shutdown() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(topic_set(&["orders"])).await.unwrap();
        let service = StoreCheckService::start(
            StoreCheckConfig::default(),
            rx,
            MockTimeSource::new(NOW),
        )
        .await
        .unwrap();
        let handler = service.handler();
        assert!(service.is_feed_running());

        service.shutdown().await;

        let (ctx, _out) = ChannelPipelineContext::channel();
        assert_eq!(
            handler.check(&ctx, event("orders")).unwrap(),
            CheckOutcome::Forwarded
        );
    }
}
