//! Channel-backed pipeline context.
//!
//! Forwards every event onto an unbounded channel read by the next stage
//! (or by a transport writer, for remoting events).

use tokio::sync::mpsc;
use tracing::warn;

use crate::ports::{PipelineContext, PipelineEvent};

/// `PipelineContext` that pushes events onto an mpsc channel.
#[derive(Clone, Debug)]
pub struct ChannelPipelineContext {
    sender: mpsc::UnboundedSender<PipelineEvent>,
}

impl ChannelPipelineContext {
    pub fn new(sender: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        Self { sender }
    }

    /// Creates a context together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl PipelineContext for ChannelPipelineContext {
    fn send_forward(&self, event: PipelineEvent) {
        if let Err(e) = self.sender.send(event) {
            warn!(kind = e.0.kind(), "Next stage gone, event dropped");
        }
    }
}
