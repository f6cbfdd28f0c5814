//! # Store Check Stage
//!
//! First stage of the Kite broker's persistence pipeline. Every inbound
//! message is checked here before it is written to storage.
//!
//! ## Purpose
//!
//! Rejects messages on topics the broker does not serve, messages whose id is
//! not 32 hex characters, and messages that have already expired. Accepted
//! messages get their header brought within broker limits and move on to the
//! next stage. Each rejected message is answered with exactly one negative
//! `MessageStoreAck` addressed to the connection it arrived on.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Topic, then id, then expiry; first failure wins | `handler/check.rs` - `validate()` |
//! | One ack per rejection, none per acceptance | `handler/check.rs` - `check()` |
//! | Readers never see a half-replaced topic set | `domain/topics.rs` - `refresh()` |
//! | Normalizing a normalized header changes nothing | `domain/policy.rs` - `normalize()` |
//! | Entity limits always mirror clamped header limits | `domain/policy.rs` - `normalize()` |
//!
//! ## Header Normalization
//!
//! | Field | Unset / `<= 0` | Out of range | Otherwise |
//! |-------|----------------|--------------|-----------|
//! | `create_time` | now | - | kept |
//! | `deliver_limit` | 100 | `> 100`: 100 | kept |
//! | `expired_time` | now + 7d | `> now + 7d`: now + 7d; `<= now`: rejected | kept |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/topic_feed.rs - TopicFeed impls, TopicFeedListener    │
//! │  adapters/pipeline.rs   - ChannelPipelineContext                │
//! │  service.rs             - StoreCheckService wiring              │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - ForwardHandler trait, PipelineEvent        │
//! │  ports/outbound.rs - PipelineContext, TimeSource traits         │
//! │  handler/check.rs  - MessageCheckHandler                        │
//! │  ipc/              - MessageStoreAck packets, ack builder       │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/entities.rs     - MessageHeader, MessageEntity          │
//! │  domain/topics.rs       - TopicAuthorization snapshot           │
//! │  domain/policy.rs       - message id rule, HeaderPolicy         │
//! │  domain/value_objects.rs - RejectReason, CheckOutcome           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kite_store_check::{ChannelPipelineContext, StoreCheckConfig, StoreCheckService};
//!
//! let (topics_tx, topics_rx) = tokio::sync::mpsc::channel(16);
//! topics_tx.send(vec!["orders".to_string()]).await?;
//!
//! let service =
//!     StoreCheckService::start(StoreCheckConfig::from_env()?, topics_rx, SystemTimeSource).await?;
//! let (ctx, next_stage) = ChannelPipelineContext::channel();
//! service.handler().process(&ctx, event)?;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod handler;
pub mod ipc;
pub mod ports;
pub mod service;

pub use adapters::{ChannelPipelineContext, TopicFeed, TopicFeedListener, WatchTopicFeed};
pub use config::{StoreCheckConfig, DEFAULT_HANDLER_NAME};
pub use domain::*;
pub use error::{CheckError, ConfigError};
pub use handler::MessageCheckHandler;
pub use ipc::{MessageStoreAck, RemotingEvent, RespPacket};
pub use ports::{ForwardHandler, PipelineContext, PipelineEvent, SystemTimeSource, TimeSource};
pub use service::StoreCheckService;
