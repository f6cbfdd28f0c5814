//! # Handler Tests

use super::check::MessageCheckHandler;
use crate::config::StoreCheckConfig;
use crate::domain::{
    CheckOutcome, ClientConnection, HeaderPolicy, MessageEntity, MessageHeader, PersistentEvent,
    RejectReason, Timestamp, TopicAuthorization,
};
use crate::error::CheckError;
use crate::ipc::{cmd, RemotingEvent};
use crate::ports::outbound::MockTimeSource;
use crate::ports::{ForwardHandler, PipelineContext, PipelineEvent};
use parking_lot::Mutex;
use std::sync::Arc;

const NOW: Timestamp = 1_700_000_000;
const DAY: i64 = 24 * 3600;
const VALID_ID: &str = "9f3b2c1d4e5f60718293a4b5c6d7e8f9";
const CLIENT_ADDR: &str = "10.1.2.3:40123";

// =============================================================================
// TEST HELPERS
// =============================================================================

#[derive(Default)]
struct RecordingContext {
    sent: Mutex<Vec<PipelineEvent>>,
}

impl RecordingContext {
    fn sent(&self) -> Vec<PipelineEvent> {
        self.sent.lock().clone()
    }

    fn only_ack(&self) -> RemotingEvent {
        let sent = self.sent();
        assert_eq!(sent.len(), 1, "expected exactly one event, got {sent:?}");
        match sent.into_iter().next() {
            Some(PipelineEvent::Remoting(ack)) => ack,
            other => panic!("expected ack, got {other:?}"),
        }
    }

    fn only_forwarded(&self) -> MessageEntity {
        let sent = self.sent();
        assert_eq!(sent.len(), 1, "expected exactly one event, got {sent:?}");
        match sent.into_iter().next() {
            Some(PipelineEvent::Persistent(PersistentEvent {
                entity: Some(entity),
                ..
            })) => entity,
            other => panic!("expected forwarded message, got {other:?}"),
        }
    }
}

impl PipelineContext for RecordingContext {
    fn send_forward(&self, event: PipelineEvent) {
        self.sent.lock().push(event);
    }
}

fn make_handler(topics: &[&str]) -> MessageCheckHandler<MockTimeSource> {
    MessageCheckHandler::new(
        "check_message",
        Arc::new(TopicAuthorization::new(topics.iter().copied())),
        HeaderPolicy::default(),
        MockTimeSource::new(NOW),
    )
}

fn make_event(header: MessageHeader) -> PipelineEvent {
    PipelineEvent::Persistent(PersistentEvent::new(
        MessageEntity::new(header, b"hello".to_vec()),
        77,
        ClientConnection::new(CLIENT_ADDR),
    ))
}

fn compliant_header(topic: &str) -> MessageHeader {
    MessageHeader::new(topic)
        .with_message_id(VALID_ID)
        .with_create_time(NOW - 5)
        .with_deliver_limit(10)
        .with_expired_time(NOW + DAY)
}

fn run(
    handler: &MessageCheckHandler<MockTimeSource>,
    header: MessageHeader,
) -> (CheckOutcome, RecordingContext) {
    let ctx = RecordingContext::default();
    let outcome = handler.check(&ctx, make_event(header)).unwrap();
    (outcome, ctx)
}

// =============================================================================
// REJECTION SCENARIOS
// =============================================================================

#[test]
fn test_unsupported_topic_rejected() {
    let handler = make_handler(&["orders", "payments"]);
    let (outcome, ctx) = run(&handler, compliant_header("shipping"));

    assert_eq!(outcome, CheckOutcome::Rejected(RejectReason::UnsupportedTopic));
    let ack = ctx.only_ack();
    assert_eq!(ack.targets, vec![CLIENT_ADDR.to_string()]);
    assert_eq!(ack.packet.opaque, 77);
    assert_eq!(ack.packet.cmd_type, cmd::MESSAGE_STORE_ACK);
    assert_eq!(ack.packet.ack.message_id, VALID_ID);
    assert!(!ack.packet.ack.status);
    assert_eq!(ack.packet.ack.feedback, "UnSupport Topic Message!");
}

#[test]
fn test_invalid_message_id_rejected() {
    let handler = make_handler(&["orders"]);
    let header = compliant_header("orders").with_message_id("not-a-uuid");
    let (outcome, ctx) = run(&handler, header);

    assert_eq!(outcome, CheckOutcome::Rejected(RejectReason::InvalidMessageId));
    let ack = ctx.only_ack();
    assert_eq!(ack.packet.ack.message_id, "not-a-uuid");
    assert_eq!(ack.packet.ack.feedback, "Invalid MessageId For UUID!");
}

#[test]
fn test_expired_at_now_rejected() {
    let handler = make_handler(&["orders"]);
    let header = compliant_header("orders").with_expired_time(NOW);
    let (outcome, ctx) = run(&handler, header);

    assert_eq!(outcome, CheckOutcome::Rejected(RejectReason::Expired));
    assert_eq!(ctx.only_ack().packet.ack.feedback, "Expired Message!");
}

#[test]
fn test_expired_in_past_rejected() {
    let handler = make_handler(&["orders"]);
    let header = compliant_header("orders").with_expired_time(NOW - 1);
    let (outcome, ctx) = run(&handler, header);

    assert_eq!(outcome, CheckOutcome::Rejected(RejectReason::Expired));
    assert_eq!(ctx.only_ack().packet.ack.feedback, "Expired Message!");
}

#[test]
fn test_topic_checked_before_message_id() {
    let handler = make_handler(&["orders"]);
    let header = compliant_header("shipping").with_message_id("bad");
    let (outcome, ctx) = run(&handler, header);

    assert_eq!(outcome, CheckOutcome::Rejected(RejectReason::UnsupportedTopic));
    assert_eq!(ctx.sent().len(), 1);
}

#[test]
fn test_message_id_checked_before_expiry() {
    let handler = make_handler(&["orders"]);
    let header = compliant_header("orders")
        .with_message_id("bad")
        .with_expired_time(NOW - 100);
    let (outcome, _) = run(&handler, header);

    assert_eq!(outcome, CheckOutcome::Rejected(RejectReason::InvalidMessageId));
}

// =============================================================================
// FORWARDING
// =============================================================================

#[test]
fn test_defaulted_header_forwarded_normalized() {
    let handler = make_handler(&["orders"]);
    let header = MessageHeader::new("orders")
        .with_message_id(VALID_ID)
        .with_create_time(0)
        .with_deliver_limit(0)
        .with_expired_time(0);
    let (outcome, ctx) = run(&handler, header);

    assert_eq!(outcome, CheckOutcome::Forwarded);
    let entity = ctx.only_forwarded();
    assert_eq!(entity.header.create_time, Some(NOW));
    assert_eq!(entity.header.deliver_limit, Some(100));
    assert_eq!(entity.header.expired_time, Some(NOW + 7 * DAY));
    assert_eq!(entity.deliver_limit, 100);
    assert_eq!(entity.expired_time, NOW + 7 * DAY);
    assert_eq!(entity.body, b"hello".to_vec());
}

#[test]
fn test_unset_header_forwarded_normalized() {
    let handler = make_handler(&["orders"]);
    let (outcome, ctx) = run(&handler, MessageHeader::new("orders"));

    assert_eq!(outcome, CheckOutcome::Forwarded);
    let entity = ctx.only_forwarded();
    assert_eq!(entity.header.create_time, Some(NOW));
    assert_eq!(entity.header.deliver_limit, Some(100));
    assert_eq!(entity.header.expired_time, Some(NOW + 7 * DAY));
}

#[test]
fn test_far_future_expiry_clamped() {
    let handler = make_handler(&["orders"]);
    let header = compliant_header("orders").with_expired_time(NOW + 8 * DAY);
    let (outcome, ctx) = run(&handler, header);

    assert_eq!(outcome, CheckOutcome::Forwarded);
    assert_eq!(
        ctx.only_forwarded().header.expired_time,
        Some(NOW + 7 * DAY)
    );
}

#[test]
fn test_deliver_limit_above_cap_clamped() {
    let handler = make_handler(&["orders"]);
    let header = compliant_header("orders").with_deliver_limit(101);
    let (_, ctx) = run(&handler, header);

    let entity = ctx.only_forwarded();
    assert_eq!(entity.header.deliver_limit, Some(100));
    assert_eq!(entity.deliver_limit, 100);
}

#[test]
fn test_compliant_message_forwarded_unchanged() {
    let handler = make_handler(&["orders"]);
    let header = compliant_header("orders");
    let expected = MessageEntity::new(header.clone(), b"hello".to_vec());
    let (outcome, ctx) = run(&handler, header);

    assert_eq!(outcome, CheckOutcome::Forwarded);
    assert_eq!(ctx.only_forwarded(), expected);
}

#[test]
fn test_forwarded_event_keeps_identity() {
    let handler = make_handler(&["orders"]);
    let ctx = RecordingContext::default();
    handler
        .check(&ctx, make_event(compliant_header("orders")))
        .unwrap();

    match ctx.sent().pop() {
        Some(PipelineEvent::Persistent(event)) => {
            assert_eq!(event.opaque, 77);
            assert_eq!(event.remote_client.remote_addr(), CLIENT_ADDR);
        }
        other => panic!("expected forwarded message, got {other:?}"),
    }
}

#[test]
fn test_second_pass_is_noop() {
    let handler = make_handler(&["orders"]);
    let (_, ctx) = run(&handler, MessageHeader::new("orders").with_message_id(VALID_ID));
    let once = ctx.only_forwarded();

    let (outcome, ctx) = run(&handler, once.header.clone());
    assert_eq!(outcome, CheckOutcome::Forwarded);
    assert_eq!(ctx.only_forwarded().header, once.header);
}

#[test]
fn test_time_advance_expires_message() {
    let handler = make_handler(&["orders"]);
    let header = compliant_header("orders").with_expired_time(NOW + 30);

    let (outcome, _) = run(&handler, header.clone());
    assert_eq!(outcome, CheckOutcome::Forwarded);

    handler.time_source().advance(30);
    let (outcome, _) = run(&handler, header);
    assert_eq!(outcome, CheckOutcome::Rejected(RejectReason::Expired));
}

// =============================================================================
// TOPIC REFRESH
// =============================================================================

#[test]
fn test_refresh_visible_to_handler() {
    let handler = make_handler(&["orders"]);
    let (outcome, _) = run(&handler, compliant_header("shipping"));
    assert_eq!(outcome, CheckOutcome::Rejected(RejectReason::UnsupportedTopic));

    handler.topics().refresh(["orders", "shipping"]);
    let (outcome, _) = run(&handler, compliant_header("shipping"));
    assert_eq!(outcome, CheckOutcome::Forwarded);

    handler.topics().refresh(["shipping"]);
    let (outcome, _) = run(&handler, compliant_header("orders"));
    assert_eq!(outcome, CheckOutcome::Rejected(RejectReason::UnsupportedTopic));
}

// =============================================================================
// EVENT TYPES
// =============================================================================

#[test]
fn test_empty_event_skipped() {
    let handler = make_handler(&["orders"]);
    let ctx = RecordingContext::default();
    let event = PersistentEvent::empty(5, ClientConnection::new(CLIENT_ADDR));

    let outcome = handler.check(&ctx, event.into()).unwrap();

    assert_eq!(outcome, CheckOutcome::Skipped);
    assert!(ctx.sent().is_empty());
}

#[test]
fn test_remoting_event_is_type_mismatch() {
    let handler = make_handler(&["orders"]);
    let ctx = RecordingContext::default();
    let ack = crate::ipc::reject(
        1,
        VALID_ID,
        RejectReason::Expired,
        &ClientConnection::new(CLIENT_ADDR),
    );

    let result = handler.check(&ctx, ack.into());

    assert!(matches!(
        result,
        Err(CheckError::InvalidEventType { found: "remoting", .. })
    ));
    assert!(ctx.sent().is_empty());
}

#[test]
fn test_type_assert() {
    let handler = make_handler(&["orders"]);
    let persistent = make_event(compliant_header("orders"));
    let remoting: PipelineEvent = crate::ipc::reject(
        1,
        VALID_ID,
        RejectReason::Expired,
        &ClientConnection::new(CLIENT_ADDR),
    )
    .into();

    assert!(handler.type_assert(&persistent));
    assert!(!handler.type_assert(&remoting));
}

#[test]
fn test_process_absorbs_rejections() {
    let handler = make_handler(&["orders"]);
    let ctx = RecordingContext::default();

    let result = handler.process(&ctx, make_event(compliant_header("shipping")));

    assert!(result.is_ok());
    assert_eq!(ctx.only_ack().packet.ack.feedback, "UnSupport Topic Message!");
}

#[test]
fn test_process_through_trait_object() {
    let handler: Box<dyn ForwardHandler> = Box::new(make_handler(&["orders"]));
    let ctx = RecordingContext::default();

    handler
        .process(&ctx, make_event(compliant_header("orders")))
        .unwrap();

    assert_eq!(handler.name(), "check_message");
    assert_eq!(ctx.only_forwarded().header.topic, "orders");
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[test]
fn test_from_config_applies_name_and_bounds() {
    let config = StoreCheckConfig {
        handler_name: "check".to_string(),
        max_deliver_limit: 3,
        max_expired_secs: 60,
    };
    let handler = MessageCheckHandler::from_config(
        &config,
        Arc::new(TopicAuthorization::new(["orders"])),
        MockTimeSource::new(NOW),
    );
    let ctx = RecordingContext::default();

    handler
        .check(&ctx, make_event(MessageHeader::new("orders")))
        .unwrap();

    assert_eq!(handler.name(), "check");
    let entity = ctx.only_forwarded();
    assert_eq!(entity.header.deliver_limit, Some(3));
    assert_eq!(entity.header.expired_time, Some(NOW + 60));
}
