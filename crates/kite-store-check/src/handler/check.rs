//! MessageCheckHandler: the validation chain.
//!
//! ```text
//! PersistentEvent ──→ topic accepted? ──no──→ ack "UnSupport Topic Message!"
//!                          │yes
//!                          ↓
//!                     id is 32 hex? ──no──→ ack "Invalid MessageId For UUID!"
//!                          │yes
//!                          ↓
//!                  normalize header ──expired──→ ack "Expired Message!"
//!                          │
//!                          ↓
//!                   forward to next stage
//! ```

use kite_telemetry::{
    log_message_event, metric_inc, time_histogram, CHECK_DURATION, CHECK_HEADER_CLAMPS,
    CHECK_MESSAGES, CHECK_REJECTIONS, STAGE_ERRORS,
};
use std::sync::Arc;
use tracing::debug;

use crate::config::StoreCheckConfig;
use crate::domain::{
    is_valid_message_id, CheckOutcome, HeaderChanges, HeaderPolicy, MessageEntity, RejectReason,
    Timestamp, TopicAuthorization,
};
use crate::error::CheckError;
use crate::ipc;
use crate::ports::{ForwardHandler, PipelineContext, PipelineEvent, SystemTimeSource, TimeSource};

/// Stage label used in logs and metrics.
pub(crate) const STAGE: &str = "check_message";

/// Validates inbound messages before they reach storage.
///
/// Shared by all pipeline workers; holds no per-message state.
pub struct MessageCheckHandler<T: TimeSource = SystemTimeSource> {
    name: String,
    topics: Arc<TopicAuthorization>,
    policy: HeaderPolicy,
    time_source: T,
}

impl<T: TimeSource> MessageCheckHandler<T> {
    pub fn new(
        name: impl Into<String>,
        topics: Arc<TopicAuthorization>,
        policy: HeaderPolicy,
        time_source: T,
    ) -> Self {
        Self {
            name: name.into(),
            topics,
            policy,
            time_source,
        }
    }

    /// Builds a handler named and bounded by `config`.
    pub fn from_config(
        config: &StoreCheckConfig,
        topics: Arc<TopicAuthorization>,
        time_source: T,
    ) -> Self {
        Self::new(
            config.handler_name.clone(),
            topics,
            config.header_policy(),
            time_source,
        )
    }

    pub fn topics(&self) -> &Arc<TopicAuthorization> {
        &self.topics
    }

    pub fn policy(&self) -> HeaderPolicy {
        self.policy
    }

    pub fn time_source(&self) -> &T {
        &self.time_source
    }

    /// Runs `event` through the chain.
    ///
    /// Rejections send one negative ack through `ctx` and drop the event.
    /// Accepted events are forwarded through `ctx` with their header
    /// normalized. Events without a payload are ignored.
    ///
    /// # Errors
    /// `CheckError::InvalidEventType` for anything but a persistent event.
    pub fn check(
        &self,
        ctx: &dyn PipelineContext,
        event: PipelineEvent,
    ) -> Result<CheckOutcome, CheckError> {
        let mut event = match event {
            PipelineEvent::Persistent(event) => event,
            other => {
                metric_inc!(STAGE_ERRORS, &[STAGE, "invalid_event_type"]);
                return Err(CheckError::InvalidEventType {
                    handler: self.name.clone(),
                    found: other.kind(),
                });
            }
        };

        let _timer = time_histogram!(CHECK_DURATION);

        let Some(entity) = event.entity.as_mut() else {
            debug!(opaque = event.opaque, "Empty persistent event, skipping");
            return Ok(record(CheckOutcome::Skipped));
        };

        let outcome = match self.validate(entity, self.time_source.now()) {
            Ok(changes) => {
                record_clamps(changes);
                log_message_event!(
                    debug,
                    STAGE,
                    "Message checked, forwarding",
                    entity.topic(),
                    entity.message_id(),
                    opaque = event.opaque,
                    changes = ?changes
                );
                ctx.send_forward(PipelineEvent::Persistent(event));
                CheckOutcome::Forwarded
            }
            Err(reason) => {
                log_message_event!(
                    warn,
                    STAGE,
                    "Message rejected",
                    entity.topic(),
                    entity.message_id(),
                    reason = %reason,
                    remote = %event.remote_client.remote_addr()
                );
                let ack = ipc::reject(
                    event.opaque,
                    entity.message_id(),
                    reason,
                    &event.remote_client,
                );
                ctx.send_forward(PipelineEvent::Remoting(ack));
                CheckOutcome::Rejected(reason)
            }
        };

        Ok(record(outcome))
    }

    /// Topic, then id, then header bounds. Stops at the first failure.
    fn validate(
        &self,
        entity: &mut MessageEntity,
        now: Timestamp,
    ) -> Result<HeaderChanges, RejectReason> {
        if !self.topics.query(entity.topic()) {
            return Err(RejectReason::UnsupportedTopic);
        }
        if !is_valid_message_id(entity.message_id()) {
            return Err(RejectReason::InvalidMessageId);
        }
        self.policy.normalize(entity, now)
    }
}

impl<T: TimeSource> ForwardHandler for MessageCheckHandler<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_assert(&self, event: &PipelineEvent) -> bool {
        matches!(event, PipelineEvent::Persistent(_))
    }

    fn process(&self, ctx: &dyn PipelineContext, event: PipelineEvent) -> Result<(), CheckError> {
        self.check(ctx, event).map(|_| ())
    }
}

fn record(outcome: CheckOutcome) -> CheckOutcome {
    metric_inc!(CHECK_MESSAGES, &[outcome.label()]);
    if let CheckOutcome::Rejected(reason) = outcome {
        metric_inc!(CHECK_REJECTIONS, &[reason.label()]);
    }
    outcome
}

fn record_clamps(changes: HeaderChanges) {
    if changes.create_time {
        metric_inc!(CHECK_HEADER_CLAMPS, &["create_time"]);
    }
    if changes.deliver_limit {
        metric_inc!(CHECK_HEADER_CLAMPS, &["deliver_limit"]);
    }
    if changes.expired_time {
        metric_inc!(CHECK_HEADER_CLAMPS, &["expired_time"]);
    }
}
