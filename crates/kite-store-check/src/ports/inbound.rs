//! Inbound (Driving) ports for the check stage.
//!
//! The pipeline framework drives handlers through `ForwardHandler`; the
//! events it moves between them are `PipelineEvent`s.

use crate::domain::PersistentEvent;
use crate::error::CheckError;
use crate::ipc::RemotingEvent;
use crate::ports::outbound::PipelineContext;

/// Events moved between pipeline handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PipelineEvent {
    /// An inbound message awaiting persistence.
    Persistent(PersistentEvent),
    /// A response packet addressed to client connections.
    Remoting(RemotingEvent),
}

impl PipelineEvent {
    /// Short name of the variant, for logs and errors.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Persistent(_) => "persistent",
            Self::Remoting(_) => "remoting",
        }
    }
}

impl From<PersistentEvent> for PipelineEvent {
    fn from(event: PersistentEvent) -> Self {
        Self::Persistent(event)
    }
}

impl From<RemotingEvent> for PipelineEvent {
    fn from(event: RemotingEvent) -> Self {
        Self::Remoting(event)
    }
}

/// A pipeline stage that handles one event and forwards what it produces.
pub trait ForwardHandler: Send + Sync {
    /// Name the stage was registered under.
    fn name(&self) -> &str;

    /// Whether this stage accepts `event`.
    fn type_assert(&self, event: &PipelineEvent) -> bool;

    /// Handles `event`, forwarding results through `ctx`.
    ///
    /// # Errors
    /// Only when the event cannot be handled by this stage at all; business
    /// outcomes are reported through `ctx`.
    fn process(&self, ctx: &dyn PipelineContext, event: PipelineEvent) -> Result<(), CheckError>;
}
