//! Message entities flowing through the persistence pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

/// Mutable message header.
///
/// `None` means the producer left the field unset. The check stage fills in
/// or clamps `create_time`, `deliver_limit` and `expired_time` in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    /// Topic the message is published on.
    pub topic: String,
    /// Message identifier: 32 hex characters.
    pub message_id: String,
    /// Creation time (seconds).
    pub create_time: Option<Timestamp>,
    /// Maximum redelivery attempts.
    pub deliver_limit: Option<i32>,
    /// Expiration time (seconds).
    pub expired_time: Option<Timestamp>,
}

impl MessageHeader {
    /// Creates a header with a freshly generated message id and no limits set.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            message_id: new_message_id(),
            ..Default::default()
        }
    }

    /// Builder-style method to set the message id.
    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = message_id.into();
        self
    }

    /// Builder-style method to set the creation time.
    pub fn with_create_time(mut self, create_time: Timestamp) -> Self {
        self.create_time = Some(create_time);
        self
    }

    /// Builder-style method to set the deliver limit.
    pub fn with_deliver_limit(mut self, deliver_limit: i32) -> Self {
        self.deliver_limit = Some(deliver_limit);
        self
    }

    /// Builder-style method to set the expiration time.
    pub fn with_expired_time(mut self, expired_time: Timestamp) -> Self {
        self.expired_time = Some(expired_time);
        self
    }
}

/// A message as received from a producer.
///
/// `deliver_limit` and `expired_time` duplicate the header values for the
/// storage layer, which indexes on them. Whenever the header value is clamped
/// the entity value is set to match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    pub header: MessageHeader,
    pub deliver_limit: i32,
    pub expired_time: Timestamp,
    pub body: Vec<u8>,
}

impl MessageEntity {
    /// Wraps a header and body, copying the header's limits onto the entity.
    pub fn new(header: MessageHeader, body: Vec<u8>) -> Self {
        Self {
            deliver_limit: header.deliver_limit.unwrap_or_default(),
            expired_time: header.expired_time.unwrap_or_default(),
            header,
            body,
        }
    }

    pub fn topic(&self) -> &str {
        &self.header.topic
    }

    pub fn message_id(&self) -> &str {
        &self.header.message_id
    }
}

/// The client connection a message arrived on.
///
/// Only the remote address is needed: it is where a rejection ack is sent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientConnection {
    remote_addr: String,
}

impl ClientConnection {
    pub fn new(remote_addr: impl Into<String>) -> Self {
        Self {
            remote_addr: remote_addr.into(),
        }
    }

    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }
}

/// An inbound message awaiting persistence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistentEvent {
    /// The message. `None` when an earlier stage already consumed it.
    pub entity: Option<MessageEntity>,
    /// Correlation token echoed back in the response packet.
    pub opaque: u32,
    /// Originating connection.
    pub remote_client: ClientConnection,
}

impl PersistentEvent {
    pub fn new(entity: MessageEntity, opaque: u32, remote_client: ClientConnection) -> Self {
        Self {
            entity: Some(entity),
            opaque,
            remote_client,
        }
    }

    /// An event whose payload has already been taken.
    pub fn empty(opaque: u32, remote_client: ClientConnection) -> Self {
        Self {
            entity: None,
            opaque,
            remote_client,
        }
    }
}

/// Generates a message id in the broker's format (simple-form UUID v4).
pub fn new_message_id() -> String {
    Uuid::new_v4().simple().to_string()
}
