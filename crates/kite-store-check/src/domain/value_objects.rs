//! Outcomes of the check stage.

use std::fmt;

/// Why a message was refused before persistence.
///
/// The feedback strings are part of the client protocol and must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Topic is not in the current authorization snapshot.
    UnsupportedTopic,
    /// Message id is not a 32 character hex string.
    InvalidMessageId,
    /// Expiration time is at or before now.
    Expired,
}

impl RejectReason {
    /// Feedback text carried in the negative store ack.
    pub const fn feedback(&self) -> &'static str {
        match self {
            Self::UnsupportedTopic => "UnSupport Topic Message!",
            Self::InvalidMessageId => "Invalid MessageId For UUID!",
            Self::Expired => "Expired Message!",
        }
    }

    /// Short label for metrics.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::UnsupportedTopic => "unsupported_topic",
            Self::InvalidMessageId => "invalid_message_id",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.feedback())
    }
}

/// Result of running one event through the check stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The event had no payload. Nothing was sent.
    Skipped,
    /// A negative store ack was sent to the client; the event was dropped.
    Rejected(RejectReason),
    /// The event, with its header normalized, went to the next stage.
    Forwarded,
}

impl CheckOutcome {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Rejected(_) => "rejected",
            Self::Forwarded => "forwarded",
        }
    }
}
