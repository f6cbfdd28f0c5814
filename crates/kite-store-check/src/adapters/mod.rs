//! # Adapters
//!
//! - `topic_feed`: TopicFeed implementations and the TopicFeedListener task
//! - `pipeline`: ChannelPipelineContext, an mpsc-backed PipelineContext

pub mod pipeline;
pub mod topic_feed;

pub use pipeline::ChannelPipelineContext;
pub use topic_feed::{TopicFeed, TopicFeedListener, WatchTopicFeed};
