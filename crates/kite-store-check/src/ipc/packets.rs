//! Response packets sent back to clients.
//!
//! Encoding is the transport's job; these types only derive `serde` so any
//! codec can carry them.

use serde::{Deserialize, Serialize};

/// Command codes of the broker protocol used by this stage.
pub mod cmd {
    /// Answer to a message store request.
    pub const MESSAGE_STORE_ACK: u8 = 0x04;
}

/// Acknowledgment for a message store request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStoreAck {
    pub message_id: String,
    pub status: bool,
    pub feedback: String,
}

/// A response packet, matched to its request by `opaque`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespPacket {
    pub opaque: u32,
    pub cmd_type: u8,
    pub ack: MessageStoreAck,
}

/// A packet addressed to one or more client connections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotingEvent {
    pub packet: RespPacket,
    /// Remote addresses of the target connections.
    pub targets: Vec<String>,
}
